//! # sparsefold
//!
//! The command line entry point of the sparsefold package. Folding itself
//! lives in the workspace crates, re-exported here; this crate adds the
//! two-plane pseudoknot driver and the input plumbing for the binary.
//!
//! This crate re-exports the main functionality from its submodules.

/// Exposing sparsefold::structure. Pair tables and folding restrictions.
pub mod structure {
    pub use ::sf_structure::*;
}

/// Exposing sparsefold::energy. Sequences and the free energy oracle.
pub mod energy {
    pub use ::sf_energy::*;
}

/// Exposing sparsefold::fold. The sparsified MFE folding engine.
pub mod fold {
    pub use ::sf_fold::*;
}

/// The two-plane pseudoknot overlay.
pub mod pseudoknot;

use std::io;
use std::io::BufRead;

use anyhow::Context;
use anyhow::Result;

/// The sequence to fold: the positional argument when given, otherwise one
/// line read from standard input.
pub fn read_sequence_input(positional: Option<String>) -> Result<String> {
    match positional {
        Some(seq) => Ok(seq),
        None => {
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("reading sequence from stdin")?;
            Ok(line.trim().to_string())
        }
    }
}
