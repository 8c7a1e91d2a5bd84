//! # sf_structure
//!
//! Secondary structure representations for the sparsefold package: bracket
//! strings, pair tables and the folding restriction tables that constrain
//! which positions of a sequence may pair, must pair, or must stay unpaired.

mod error;
mod pair_table;
mod restriction;

pub use error::*;
pub use pair_table::*;
pub use restriction::*;
