//! Trace back through the sparse matrices.
//!
//! The walk starts at `W[n]` and reconstructs the optimal structure by
//! energy-equality matching against the candidate lists, following arena
//! arrows for interior loop targets that are not candidates, and rebuilding
//! `WM`/`WM2` rows whenever a multiloop descent moves the anchor. `W` stays
//! anchored at 1 for the whole walk and is never rebuilt.

use sf_energy::esum;
use sf_energy::Energy;
use sf_energy::INF;

use crate::SparseFold;
use crate::TURN;

impl SparseFold<'_> {
    /// Trace the folded matrices into a bracket string of length `n`.
    /// Candidate pairs are emitted as `{}` instead of `()` when
    /// `mark_candidates` is set.
    ///
    /// Call after [`fold`](Self::fold); the traceback freely overwrites the
    /// `WM`/`WM2` rows while it runs.
    pub fn trace_back(&mut self, mark_candidates: bool) -> String {
        let mut structure = vec![b'.'; self.n + 1];
        self.trace_w(&mut structure, mark_candidates, 1, self.n);
        structure[1..].iter().map(|&b| b as char).collect()
    }

    /// pre: `W` holds row `i` over `i..=j`.
    fn trace_w(&mut self, structure: &mut [u8], mark: bool, i: usize, j: usize) {
        if i + TURN + 1 >= j {
            return;
        }

        // case j unpaired
        if self.restriction.may_be_unpaired(j) && self.w[j] == self.w[j - 1] {
            self.trace_w(structure, mark, i, j - 1);
            return;
        }

        let mut hit = None;
        for &(k16, vkj) in self.cl.column(j) {
            let k = k16 as usize;
            if k < i {
                break;
            }
            let w_kj = esum(self.w[k - 1], self.ext_stem_energy(vkj, k, j));
            if w_kj < INF && self.w[j] == w_kj {
                hit = Some((k, vkj));
                break;
            }
        }
        let (k, vkj) = hit.expect("trace W: no matching split");

        // same anchor, no recomputation
        self.trace_w(structure, mark, i, k - 1);
        self.trace_v(structure, mark, k, j, vkj);
    }

    /// pre: `e == V(i,j)`.
    fn trace_v(&mut self, structure: &mut [u8], mark: bool, i: usize, j: usize, e: Energy) {
        debug_assert!(i + TURN + 1 <= j);
        debug_assert!(e < INF);

        if mark && self.cl.is_candidate(i, j) {
            structure[i] = b'{';
            structure[j] = b'}';
        } else {
            structure[i] = b'(';
            structure[j] = b')';
        }

        // interior loop to a non-candidate: the arrow knows the target
        if let Some(arrow) = self.ta.get(i, j) {
            self.trace_v(structure, mark, arrow.k(), arrow.l(), arrow.target_energy());
            return;
        }

        // (still) interior loop, to a candidate
        let mut hit = None;
        'columns: for l in (i + 1)..j {
            for &(k16, vkl) in self.cl.column(l) {
                let k = k16 as usize;
                if k <= i {
                    break;
                }
                let cand = esum(vkl, self.iloop_energy(i, j, k, l));
                if cand < INF && e == cand {
                    hit = Some((k, l, vkl));
                    break 'columns;
                }
            }
        }
        if let Some((k, l, vkl)) = hit {
            self.trace_v(structure, mark, k, l, vkl);
            return;
        }

        if e == self.hairpin_energy(i, j) {
            return;
        }

        // multiloop; the anchor moves to i+1, so the rows are rebuilt
        self.wm = self.recompute_wm(i + 1, j - 1);
        self.wm2 = self.recompute_wm2(&self.wm, i + 1, j - 1);
        self.trace_wm2(structure, mark, i + 1, j - 1);
    }

    /// pre: `WM` holds row `i`; `e == WM(i,j)`.
    fn trace_wm(&mut self, structure: &mut [u8], mark: bool, i: usize, j: usize, e: Energy) {
        if i + TURN + 1 > j {
            return;
        }

        if self.restriction.may_be_unpaired(j) {
            let skip = esum(self.wm[j - 1], self.params.ml_base());
            if skip < INF && e == skip {
                let prev = self.wm[j - 1];
                self.trace_wm(structure, mark, i, j - 1, prev);
                return;
            }
        }

        let mut hit = None;
        for &(k16, vkj) in self.cl.column(j) {
            let k = k16 as usize;
            if k < i {
                break;
            }
            let v_kj = self.ml_stem_energy(vkj, k, j);
            let split = esum(self.wm[k - 1], v_kj);
            if split < INF && e == split {
                hit = Some((k, vkj, true));
                break;
            }
            let prefix = esum(((k - i) as Energy) * self.params.ml_base(), v_kj);
            if self.restriction.span_free(i, k - 1) && prefix < INF && e == prefix {
                hit = Some((k, vkj, false));
                break;
            }
        }
        let (k, vkj, with_wm) = hit.expect("trace WM: no matching split");

        if with_wm {
            // same anchor, no recomputation
            let prev = self.wm[k - 1];
            self.trace_wm(structure, mark, i, k - 1, prev);
        }
        self.trace_v(structure, mark, k, j, vkj);
    }

    /// pre: `WM` and `WM2` hold row `i`.
    fn trace_wm2(&mut self, structure: &mut [u8], mark: bool, i: usize, j: usize) {
        if i + 2 * TURN + 3 > j {
            return;
        }
        let e = self.wm2[j];

        // case j unpaired
        if self.restriction.may_be_unpaired(j) {
            let skip = esum(self.wm2[j - 1], self.params.ml_base());
            if skip < INF && e == skip {
                self.trace_wm2(structure, mark, i, j - 1);
                return;
            }
        }

        let mut hit = None;
        for &(k16, vkj) in self.cl.column(j) {
            let k = k16 as usize;
            if k < i + TURN + 1 {
                break;
            }
            let v_kj = self.ml_stem_energy(vkj, k, j);
            let split = esum(self.wm[k - 1], v_kj);
            if split < INF && e == split {
                hit = Some((k, vkj));
                break;
            }
        }
        let (k, vkj) = hit.expect("trace WM2: no matching split");

        let prev = self.wm[k - 1];
        self.trace_wm(structure, mark, i, k - 1, prev);
        self.trace_v(structure, mark, k, j, vkj);
    }
}
