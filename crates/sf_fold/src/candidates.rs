use crate::Energy;
use crate::Idx;

/// Per-column candidate lists for the splits in `W` and `WM`.
///
/// The outer DP loop visits `i` in decreasing order, so pushes into a column
/// arrive with strictly decreasing `i` and each column is sorted descending
/// by construction; it is never re-sorted. A single shared list serves both
/// split cases, which works because the recursions are formulated so that
/// both split cases recurse to `V`-entries.
#[derive(Debug, Default)]
pub struct CandidateList {
    cols: Vec<Vec<(Idx, Energy)>>,
}

impl CandidateList {
    pub fn new(n: usize) -> Self {
        CandidateList { cols: vec![Vec::new(); n + 1] }
    }

    pub fn reset(&mut self) {
        for col in &mut self.cols {
            col.clear();
            col.shrink_to_fit();
        }
    }

    /// Register the candidate `(i, j)` with energy `e = V(i,j)`.
    pub fn register(&mut self, i: usize, j: usize, e: Energy) {
        debug_assert!(
            self.cols[j].last().is_none_or(|&(k, _)| (i as Idx) < k),
            "candidates in column {} must arrive with decreasing i",
            j
        );
        self.cols[j].push((i as Idx, e));
    }

    /// Whether `(i, j)` is a candidate, by binary search with the
    /// descending-key comparator.
    pub fn is_candidate(&self, i: usize, j: usize) -> bool {
        let i = i as Idx;
        self.cols[j]
            .binary_search_by(|&(k, _)| k.cmp(&i).reverse())
            .is_ok()
    }

    /// The candidate energy `V(i,j)`, if `(i,j)` is a candidate.
    pub fn get(&self, i: usize, j: usize) -> Option<Energy> {
        let i = i as Idx;
        self.cols[j]
            .binary_search_by(|&(k, _)| k.cmp(&i).reverse())
            .ok()
            .map(|at| self.cols[j][at].1)
    }

    /// The candidates of column `j`, descending in `i`.
    pub fn column(&self, j: usize) -> &[(Idx, Energy)] {
        &self.cols[j]
    }

    /// Reallocate columns whose capacity has grown past 1.5x their size.
    pub fn shrink(&mut self) {
        for col in &mut self.cols {
            if col.capacity() > 3 * col.len() / 2 {
                col.shrink_to_fit();
            }
        }
    }

    /// Total number of candidates over all columns.
    pub fn num_candidates(&self) -> usize {
        self.cols.iter().map(|col| col.len()).sum()
    }

    /// Total allocated entries over all columns.
    pub fn capacity(&self) -> usize {
        self.cols.iter().map(|col| col.capacity()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_search() {
        let mut cl = CandidateList::new(30);
        cl.register(20, 25, -100);
        cl.register(12, 25, -310);
        cl.register(3, 25, -200);
        assert!(cl.is_candidate(12, 25));
        assert!(cl.is_candidate(3, 25));
        assert!(cl.is_candidate(20, 25));
        assert!(!cl.is_candidate(13, 25));
        assert!(!cl.is_candidate(12, 24));
        assert_eq!(cl.num_candidates(), 3);
    }

    #[test]
    fn test_column_is_descending() {
        let mut cl = CandidateList::new(30);
        cl.register(20, 25, -100);
        cl.register(12, 25, -310);
        cl.register(3, 25, -200);
        let keys: Vec<Idx> = cl.column(25).iter().map(|&(k, _)| k).collect();
        assert_eq!(keys, vec![20, 12, 3]);
    }

    #[test]
    fn test_shrink_and_reset() {
        let mut cl = CandidateList::new(10);
        for i in (2..9).rev() {
            cl.register(i, 9, -10 * i as Energy);
        }
        cl.shrink();
        assert!(cl.capacity() >= cl.num_candidates());
        cl.reset();
        assert_eq!(cl.num_candidates(), 0);
        assert!(cl.column(9).is_empty());
    }
}
