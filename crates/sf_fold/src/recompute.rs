//! Row reconstruction for the traceback.
//!
//! Whole rows of `W`, `WM` and `WM2` keyed by a new anchor are rebuilt from
//! the candidate lists alone; the arena and the `V` window are never
//! consulted. Each helper mirrors the fill of its row exactly, so the
//! traceback's energy-equality matching sees the same values the fill saw.

use sf_energy::esum;
use sf_energy::Energy;
use sf_energy::INF;

use crate::SparseFold;
use crate::TURN;

impl SparseFold<'_> {
    /// Rebuild the `W` row for anchor `i` over columns up to `max_j`.
    pub fn recompute_w(&self, i: usize, max_j: usize) -> Vec<Energy> {
        let mut temp = self.w.clone();
        for jj in (i - 1)..=(i + TURN).min(max_j) {
            temp[jj] = 0;
        }
        for jj in (i + TURN + 1)..=max_j {
            let mut w = INF;
            // covers the case W(i,j) = V(i,j) + ext, which is in the
            // candidate list whenever it matters
            for &(k16, vkj) in self.cl.column(jj) {
                let k = k16 as usize;
                if k < i {
                    break;
                }
                let v_kj = self.ext_stem_energy(vkj, k, jj);
                if self.restriction.forced_pair(k, jj) {
                    w = esum(temp[k - 1], v_kj);
                    break;
                }
                w = w.min(esum(temp[k - 1], v_kj));
            }
            if self.restriction.may_be_unpaired(jj) {
                w = w.min(temp[jj - 1]);
            }
            temp[jj] = w;
        }
        temp
    }

    /// Rebuild the `WM` row for anchor `i` over columns up to `max_j`.
    pub fn recompute_wm(&self, i: usize, max_j: usize) -> Vec<Energy> {
        let mut temp = self.wm.clone();
        for jj in (i - 1)..=(i + TURN).min(max_j) {
            temp[jj] = INF;
        }
        for jj in (i + TURN + 1)..=max_j {
            let (mut wm_split, _, km1) = self.split_cases(&temp, i, jj, i + 1);
            if self.restriction.may_be_unpaired(jj) {
                wm_split = wm_split.min(esum(temp[jj - 1], self.params.ml_base()));
            }
            if km1 != self.n && !self.restriction.evaluate(i, km1, true) {
                wm_split = INF;
            }
            // the V(i,jj) contribution the fill merged in
            let mut wm = wm_split;
            if let Some(vijj) = self.cl.get(i, jj) {
                wm = wm.min(self.ml_stem_energy(vijj, i, jj));
            }
            temp[jj] = wm;
        }
        temp
    }

    /// Rebuild the `WM2` row for anchor `i` over columns up to `max_j`,
    /// from an already rebuilt `WM` row for the same anchor.
    pub fn recompute_wm2(&self, wm: &[Energy], i: usize, max_j: usize) -> Vec<Energy> {
        let mut temp = self.wm2.clone();
        for jj in (i - 1)..=(i + 2 * TURN + 2).min(max_j) {
            temp[jj] = INF;
        }
        for jj in (i + 2 * TURN + 3)..=max_j {
            let (_, mut wm2_split, km1) = self.split_cases(wm, i, jj, i + 1);
            if self.restriction.may_be_unpaired(jj) {
                wm2_split = wm2_split.min(esum(temp[jj - 1], self.params.ml_base()));
            }
            if km1 != self.n && !self.restriction.evaluate(i, km1, true) {
                wm2_split = INF;
            }
            temp[jj] = wm2_split;
        }
        temp
    }
}
