use nohash_hasher::IntMap;

use crate::Energy;
use crate::Idx;

/// A trace arrow `(i,j) -> (k,l)`: the interior loop decomposition that
/// realized `V(i,j)`, kept only while the target is not reconstructible
/// from the candidate lists. The source `(i,j)` is implicit in the arena
/// position; `energy` is `V(k,l)` at registration time.
#[derive(Debug, Clone, Copy)]
pub struct TraceArrow {
    k: Idx,
    l: Idx,
    energy: Energy,
    ref_count: u32,
}

impl TraceArrow {
    pub fn k(&self) -> usize {
        self.k as usize
    }

    pub fn l(&self) -> usize {
        self.l as usize
    }

    pub fn target_energy(&self) -> Energy {
        self.energy
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }
}

/// The trace arrow arena: one integer-keyed map per source row, plus the
/// counters the verbose report prints. References into the arena are `(i,j)`
/// keys, never pointers, so row-wise garbage collection only ever touches
/// integer keys.
///
/// An arrow stays alive while it is referenced: by its source being a
/// candidate (`inc_source_ref`), or by another live arrow pointing at its
/// cell (maintained by `register`/`gc_row`).
#[derive(Debug, Default)]
pub struct TraceArrows {
    rows: Vec<IntMap<Idx, TraceArrow>>,
    count: usize,
    max_count: usize,
    avoided: usize,
    erased: usize,
}

impl TraceArrows {
    pub fn new(n: usize) -> Self {
        TraceArrows {
            rows: vec![IntMap::default(); n + 1],
            count: 0,
            max_count: 0,
            avoided: 0,
            erased: 0,
        }
    }

    /// Drop all arrows but keep the row count and the statistics counters.
    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        self.count = 0;
    }

    /// Register the arrow `(i,j) -> (k,l)` with target energy `e`. The new
    /// arrow starts unreferenced; an arrow sitting at the target cell gains
    /// a reference so that chains stay alive transitively.
    pub fn register(&mut self, i: usize, j: usize, k: usize, l: usize, e: Energy) {
        if let Some(target) = self.rows[k].get_mut(&(l as Idx)) {
            target.ref_count += 1;
        }
        let prev = self.rows[i].insert(
            j as Idx,
            TraceArrow { k: k as Idx, l: l as Idx, energy: e, ref_count: 0 },
        );
        debug_assert!(prev.is_none(), "duplicate arrow at ({},{})", i, j);
        self.count += 1;
        self.max_count = self.max_count.max(self.count);
    }

    /// An arrow was not needed because its target is a candidate.
    pub fn avoid(&mut self) {
        self.avoided += 1;
    }

    /// Pin the arrow at `(i,j)` while its source remains a candidate.
    pub fn inc_source_ref(&mut self, i: usize, j: usize) {
        if let Some(arrow) = self.rows[i].get_mut(&(j as Idx)) {
            arrow.ref_count += 1;
        }
    }

    pub fn exists(&self, i: usize, j: usize) -> bool {
        self.rows[i].contains_key(&(j as Idx))
    }

    pub fn get(&self, i: usize, j: usize) -> Option<TraceArrow> {
        self.rows[i].get(&(j as Idx)).copied()
    }

    /// Garbage collect row `r`: drop every arrow on the row whose
    /// `ref_count` is zero and release its reference on the target cell.
    /// Arrows point from a row to a higher row, and rows are collected in
    /// decreasing order, so a release can zero out an arrow in a row whose
    /// own pass already ran; those cascade immediately through the work
    /// list. Afterwards no collected row holds an unreferenced arrow.
    pub fn gc_row(&mut self, r: usize) {
        let mut work: Vec<(usize, Idx)> = self.rows[r]
            .iter()
            .filter(|(_, arrow)| arrow.ref_count == 0)
            .map(|(&j, _)| (r, j))
            .collect();

        while let Some((i, j)) = work.pop() {
            let Some(arrow) = self.rows[i].remove(&j) else {
                continue;
            };
            self.count -= 1;
            self.erased += 1;
            let (k, l) = (arrow.k as usize, arrow.l);
            if let Some(target) = self.rows[k].get_mut(&l) {
                target.ref_count -= 1;
                if target.ref_count == 0 {
                    work.push((k, l));
                }
            }
        }
    }

    /// Reclaim allocation slack left behind by garbage collection.
    pub fn compactify(&mut self) {
        for row in &mut self.rows {
            if row.capacity() > 3 * row.len() / 2 {
                row.shrink_to_fit();
            }
        }
    }

    /// Number of live arrows.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Peak number of simultaneously live arrows.
    pub fn max_len(&self) -> usize {
        self.max_count
    }

    pub fn num_avoided(&self) -> usize {
        self.avoided
    }

    pub fn num_erased(&self) -> usize {
        self.erased
    }

    /// Total allocated arrow slots across all rows.
    pub fn capacity(&self) -> usize {
        self.rows.iter().map(|row| row.capacity()).sum()
    }

    /// All live arrows as `(i, j, ref_count)`, for the arena invariants in
    /// the test suite.
    pub fn live_arrows(&self) -> Vec<(usize, usize, u32)> {
        let mut arrows = Vec::with_capacity(self.count);
        for (i, row) in self.rows.iter().enumerate() {
            for (&j, arrow) in row {
                arrows.push((i, j as usize, arrow.ref_count));
            }
        }
        arrows
    }
}
