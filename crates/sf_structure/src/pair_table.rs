use std::convert::TryFrom;
use std::ops::{Deref, DerefMut};

use crate::StructureError;

/// A 0-based pair table: `table[i] = Some(j)` iff positions `i` and `j` pair.
///
/// Parsing accepts the three bracket families the traceback and the
/// pseudoknot overlay emit. Each family is matched against its own stack, so
/// overlaid (crossing) bracket strings parse into a valid table as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTable(pub Vec<Option<usize>>);

impl PairTable {
    /// Check that no two pairs cross, i.e. the table describes a plain
    /// (pseudoknot-free) secondary structure.
    pub fn crossing_free(&self) -> bool {
        let pairs: Vec<(usize, usize)> = self
            .iter()
            .enumerate()
            .filter_map(|(i, &j)| j.filter(|&j| j > i).map(|j| (i, j)))
            .collect();
        for (a, &(i, j)) in pairs.iter().enumerate() {
            for &(k, l) in &pairs[a + 1..] {
                if i < k && k < j && j < l {
                    return false;
                }
            }
        }
        true
    }

    /// Number of paired positions divided by two.
    pub fn num_pairs(&self) -> usize {
        self.iter().filter(|p| p.is_some()).count() / 2
    }
}

impl Deref for PairTable {
    type Target = [Option<usize>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PairTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut table = vec![None; s.len()];
        let mut round = Vec::new();
        let mut square = Vec::new();
        let mut curly = Vec::new();

        for (i, c) in s.chars().enumerate() {
            let stack = match c {
                '(' | ')' => &mut round,
                '[' | ']' => &mut square,
                '{' | '}' => &mut curly,
                '.' => continue,
                _ => return Err(StructureError::InvalidToken(c, i)),
            };
            match c {
                '(' | '[' | '{' => stack.push(i),
                _ => {
                    let j = stack.pop().ok_or(StructureError::UnmatchedClose(i))?;
                    table[i] = Some(j);
                    table[j] = Some(i);
                }
            }
        }

        for stack in [round, square, curly] {
            if let Some(&i) = stack.last() {
                return Err(StructureError::UnmatchedOpen(i));
            }
        }
        Ok(PairTable(table))
    }
}
