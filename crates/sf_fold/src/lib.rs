//! # sf_fold
//!
//! Space-efficient sparse variant of an RNA (loop-based) free energy
//! minimization algorithm (folding equivalent to the Zuker algorithm).
//!
//! Since many matrix entries cannot be efficiently recomputed during trace
//! back, trace arrows are stored to such entries. To save space, trace
//! arrows are garbage collected, and arrows to candidates are omitted and
//! reconstructed from the candidate lists during trace back.
//!
//! The recursions, over a sequence of length `n` with minimum hairpin size
//! `TURN` and maximum interior loop span `MAXLOOP`:
//!
//! ```text
//! W(i,j)   = min { W(i,j-1);  min_{i<=k<j} W(i,k-1) + V(k,j) + ext;  0 }
//! V(i,j)   = min { Hairpin(i,j);
//!                  min_{k,l} V(k,l) + ILoop(i,j,k,l);
//!                  WM2(i+1,j-1) + MLstem(j,i) + MLclosing }
//! WM(i,j)  = min { WM(i,j-1) + MLbase;
//!                  min_k (k-i)*MLbase + V(k,j) + MLstem;
//!                  min_k WM(i,k-1) + V(k,j) + MLstem }
//! WM2(i,j) = min { WM2(i,j-1) + MLbase;  min_k WM(i,k-1) + V(k,j) + MLstem }
//! ```
//!
//! `(i,j)` becomes a candidate iff its `V`-contribution strictly improves
//! the `W` split or the `WM` split at column `j` (or the pair is forced by
//! the restriction); split scans only ever visit candidates.

mod candidates;
mod engine;
mod recompute;
mod trace_arrows;
mod traceback;

pub use candidates::*;
pub use engine::*;
pub use trace_arrows::*;

pub use sf_energy::{esum, Energy, INF};

/// Minimum number of unpaired bases enclosed by a hairpin; pairs `(i,j)`
/// with `j - i <= TURN` are forbidden.
pub const TURN: usize = 3;

/// Maximum number of unpaired bases in an interior loop.
pub const MAXLOOP: usize = 30;

/// We use u16 (0 to 65k), which is plenty for indexing positions on a
/// nucleic acid. Candidate entries and trace arrows store positions at this
/// width, which is where the sparse tables earn their size.
pub type Idx = u16;
