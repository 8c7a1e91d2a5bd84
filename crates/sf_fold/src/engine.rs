use log::debug;

use sf_energy::esum;
use sf_energy::pair_type;
use sf_energy::Dangles;
use sf_energy::Energy;
use sf_energy::EnergyParams;
use sf_energy::NucleotideVec;
use sf_energy::PairTypeRNA;
use sf_energy::INF;
use sf_structure::Restriction;
use sf_structure::StructureError;

use crate::CandidateList;
use crate::TraceArrows;
use crate::MAXLOOP;
use crate::TURN;

/// Arena and candidate list counters, for the verbose report and the
/// invariants in the test suite.
#[derive(Debug, Clone, Copy)]
pub struct Statistics {
    pub candidates: usize,
    pub candidates_capacity: usize,
    pub arrows: usize,
    pub arrows_max: usize,
    pub arrows_avoided: usize,
    pub arrows_erased: usize,
    pub arrows_capacity: usize,
}

/// Space-efficient sparsified Zuker-type RNA folding with trace back.
///
/// One instance owns the DP state for one sequence: the circular `V` window
/// of `MAXLOOP+1` rows, the 1-D rows of `W`, `WM` and `WM2`, the `WM2`
/// snapshots of the previous two outer iterations, the candidate lists and
/// the trace arrow arena. Run [`fold`](SparseFold::fold), then
/// [`trace_back`](SparseFold::trace_back); call
/// [`reset`](SparseFold::reset) before folding the same instance again.
pub struct SparseFold<'a> {
    pub(crate) seq: &'a NucleotideVec,
    pub(crate) n: usize,
    pub(crate) params: &'a EnergyParams,
    pub(crate) restriction: Restriction,
    pub(crate) dangles: Dangles,
    pub(crate) garbage_collect: bool,

    /// V[i mod (MAXLOOP+1)][1..=n]; rows i..=i+MAXLOOP are live at row i.
    pub(crate) v: Vec<Vec<Energy>>,
    pub(crate) w: Vec<Energy>,
    pub(crate) wm: Vec<Energy>,
    pub(crate) wm2: Vec<Energy>,
    /// WM2 row from one outer iteration ago.
    pub(crate) dmli1: Vec<Energy>,
    /// WM2 row from two outer iterations ago.
    pub(crate) dmli2: Vec<Energy>,

    pub(crate) cl: CandidateList,
    pub(crate) ta: TraceArrows,
}

impl<'a> SparseFold<'a> {
    pub fn new(
        seq: &'a NucleotideVec,
        params: &'a EnergyParams,
        restriction: Restriction,
        dangles: Dangles,
        garbage_collect: bool,
    ) -> Result<Self, StructureError> {
        let n = seq.len();
        if restriction.len() != n {
            return Err(StructureError::LengthMismatch {
                sequence: n,
                structure: restriction.len(),
            });
        }
        Ok(SparseFold {
            seq,
            n,
            params,
            restriction,
            dangles,
            garbage_collect,
            v: vec![vec![INF; n + 1]; MAXLOOP + 1],
            w: vec![0; n + 1],
            wm: vec![INF; n + 1],
            wm2: vec![INF; n + 1],
            dmli1: vec![INF; n + 1],
            dmli2: vec![INF; n + 1],
            cl: CandidateList::new(n),
            ta: TraceArrows::new(n),
        })
    }

    /// Clear all DP state (matrices, candidate lists, arena) while keeping
    /// the sequence, parameters and restriction, so the instance can fold
    /// again.
    pub fn reset(&mut self) {
        for row in &mut self.v {
            row.fill(INF);
        }
        self.w.fill(0);
        self.wm.fill(INF);
        self.wm2.fill(INF);
        self.dmli1.fill(INF);
        self.dmli2.fill(INF);
        self.cl.reset();
        self.ta.reset();
    }

    /// Swap in a different restriction of the same length.
    pub fn set_restriction(&mut self, restriction: Restriction) -> Result<(), StructureError> {
        if restriction.len() != self.n {
            return Err(StructureError::LengthMismatch {
                sequence: self.n,
                structure: restriction.len(),
            });
        }
        self.restriction = restriction;
        Ok(())
    }

    pub fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    pub fn trace_arrows(&self) -> &TraceArrows {
        &self.ta
    }

    pub fn candidate_list(&self) -> &CandidateList {
        &self.cl
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            candidates: self.cl.num_candidates(),
            candidates_capacity: self.cl.capacity(),
            arrows: self.ta.len(),
            arrows_max: self.ta.max_len(),
            arrows_avoided: self.ta.num_avoided(),
            arrows_erased: self.ta.num_erased(),
            arrows_capacity: self.ta.capacity(),
        }
    }

    pub(crate) fn pt(&self, a: usize, b: usize) -> PairTypeRNA {
        pair_type(self.seq[a], self.seq[b])
    }

    /// `V(k,j) + ext_stem` with restriction gating: the pair must be free on
    /// both sides or forced to each other. Under D2 both neighboring bases
    /// dangle (none past the sequence ends), under D1 none do.
    pub(crate) fn ext_stem_energy(&self, vkj: Energy, k: usize, j: usize) -> Energy {
        let r = &self.restriction;
        if !(r.both_free(k, j) || r.forced_pair(k, j)) {
            return INF;
        }
        let (mm5, mm3) = match self.dangles {
            Dangles::D2 => (
                (k > 1).then(|| self.seq[k - 1]),
                (j < self.n).then(|| self.seq[j + 1]),
            ),
            Dangles::D1 => (None, None),
        };
        esum(vkj, self.params.ext_stem(self.pt(k, j), mm5, mm3))
    }

    /// `V(k,j) + ml_stem`, gated like [`ext_stem_energy`](Self::ext_stem_energy).
    pub(crate) fn ml_stem_energy(&self, vkj: Energy, k: usize, j: usize) -> Energy {
        let r = &self.restriction;
        if !(r.both_free(k, j) || r.forced_pair(k, j)) {
            return INF;
        }
        let (mm5, mm3) = match self.dangles {
            Dangles::D2 => (
                (k > 1).then(|| self.seq[k - 1]),
                (j < self.n).then(|| self.seq[j + 1]),
            ),
            Dangles::D1 => (None, None),
        };
        esum(vkj, self.params.ml_stem(self.pt(k, j), mm5, mm3))
    }

    /// Hairpin energy of `(i,j)`, `INF` when the restriction forces a pair
    /// into or out of the loop.
    pub(crate) fn hairpin_energy(&self, i: usize, j: usize) -> Energy {
        let r = &self.restriction;
        if r.forced_partner(i).is_some_and(|p| p != j)
            || r.forced_partner(j).is_some_and(|p| p != i)
            || !r.span_free(i + 1, j - 1)
        {
            return INF;
        }
        self.params.hairpin(self.seq, i, j)
    }

    /// Interior loop energy of `(i,j)` with inner pair `(k,l)`, `INF` when
    /// the loop is oversized or incompatible with the restriction. The `V`
    /// part of the decomposition is the caller's.
    pub(crate) fn iloop_energy(&self, i: usize, j: usize, k: usize, l: usize) -> Energy {
        if (k - i) + (j - l) - 2 > MAXLOOP {
            return INF;
        }
        let r = &self.restriction;
        if !r.span_free(i + 1, k - 1) || !r.span_free(l + 1, j - 1) {
            return INF;
        }
        if r.forced_partner(i).is_some_and(|p| p != j)
            || r.forced_partner(j).is_some_and(|p| p != i)
            || r.forced_partner(k).is_some_and(|p| p != l)
            || r.forced_partner(l).is_some_and(|p| p != k)
        {
            return INF;
        }
        self.params.internal_loop(self.seq, i, j, k, l)
    }

    /// Multiloop closing contribution of the pair `(i,j)`, from the `WM2`
    /// snapshots of the previous iterations. D2 reads `dmli1[j-1]` plus the
    /// double-dangle closing stem; D1 takes the minimum over the four
    /// dangle sub-cases, each gated on the skipped endpoint being free.
    pub(crate) fn e_mb_loop(&self, i: usize, j: usize) -> Energy {
        let r = &self.restriction;
        if !(r.both_free(i, j) || r.forced_pair(i, j)) {
            return INF;
        }
        let tt = self.pt(j, i);
        let p = self.params;
        match self.dangles {
            Dangles::D2 => esum(
                self.dmli1[j - 1],
                p.ml_stem(tt, Some(self.seq[j - 1]), Some(self.seq[i + 1])) + p.ml_closing(),
            ),
            Dangles::D1 => {
                let mut e = esum(self.dmli1[j - 1], p.ml_stem(tt, None, None) + p.ml_closing());
                if r.is_free(i + 1) {
                    e = e.min(esum(
                        self.dmli2[j - 1],
                        p.ml_stem(tt, None, Some(self.seq[i + 1])) + p.ml_closing() + p.ml_base(),
                    ));
                }
                if r.is_free(j - 1) {
                    e = e.min(esum(
                        self.dmli1[j - 2],
                        p.ml_stem(tt, Some(self.seq[j - 1]), None) + p.ml_closing() + p.ml_base(),
                    ));
                }
                if r.is_free(i + 1) && r.is_free(j - 1) {
                    e = e.min(esum(
                        self.dmli2[j - 2],
                        p.ml_stem(tt, Some(self.seq[j - 1]), Some(self.seq[i + 1]))
                            + p.ml_closing()
                            + 2 * p.ml_base(),
                    ));
                }
                e
            }
        }
    }

    /// The `WM` and `WM2` split minima over the candidates of column `j`
    /// with anchor `i`, scanning keys `>= lo`, plus the argmin `k-1` of the
    /// `WM2` split. A forced pair commits and ends the scan.
    pub(crate) fn split_cases(
        &self,
        wm: &[Energy],
        i: usize,
        j: usize,
        lo: usize,
    ) -> (Energy, Energy, usize) {
        let mut wm_split = INF;
        let mut wm2_split = INF;
        let mut km1 = self.n;
        for &(k16, vkj) in self.cl.column(j) {
            let k = k16 as usize;
            if k < lo {
                break;
            }
            let paired = self.restriction.forced_pair(k, j);
            let v_kj = self.ml_stem_energy(vkj, k, j);
            // all of [i..k-1] unpaired in place of a WM prefix
            if self.restriction.span_free(i, k - 1) {
                wm_split =
                    wm_split.min(esum(((k - i) as Energy) * self.params.ml_base(), v_kj));
            }
            let with_prefix = esum(wm[k - 1], v_kj);
            wm_split = wm_split.min(with_prefix);
            wm2_split = wm2_split.min(with_prefix);
            if with_prefix < INF && wm2_split == with_prefix {
                km1 = k - 1;
            }
            if paired {
                break;
            }
        }
        (wm_split, wm2_split, km1)
    }

    /// Fill the matrices over decreasing `i` and increasing `j` and return
    /// the MFE `W[n]`. Trace arrows and candidates are registered on the
    /// way; rows leaving the `V` window are garbage collected unless GC is
    /// disabled.
    pub fn fold(&mut self) -> Energy {
        let n = self.n;
        for i in (1..=n).rev() {
            for j in (i + TURN + 1)..=n {
                let evaluate = self.restriction.evaluate(i, j, false);

                // W: split case
                let mut w_split = INF;
                let mut paired_kj = false;
                for &(k16, vkj) in self.cl.column(j) {
                    let k = k16 as usize;
                    if k < i {
                        break;
                    }
                    let v_kj = self.ext_stem_energy(vkj, k, j);
                    if self.restriction.forced_pair(k, j) {
                        // a forced pair is the only legal decomposition
                        w_split = esum(self.w[k - 1], v_kj);
                        paired_kj = true;
                        break;
                    }
                    w_split = w_split.min(esum(self.w[k - 1], v_kj));
                }
                if self.restriction.may_be_unpaired(j) {
                    w_split = w_split.min(self.w[j - 1]);
                }

                // WM and WM2: split cases
                let (mut wm_split, mut wm2_split, km1) = self.split_cases(&self.wm, i, j, i);
                if self.restriction.may_be_unpaired(j) {
                    wm2_split = wm2_split.min(esum(self.wm2[j - 1], self.params.ml_base()));
                    wm_split = wm_split.min(esum(self.wm[j - 1], self.params.ml_base()));
                }
                if km1 != n && !self.restriction.evaluate(i, km1, true) {
                    wm_split = INF;
                    wm2_split = INF;
                }

                let mut w = w_split;
                let mut wm = wm_split;

                let i_mod = i % (MAXLOOP + 1);
                let blocked =
                    self.restriction.forced_unpaired(i) || self.restriction.forced_unpaired(j);

                if self.pt(i, j).can_pair() && !blocked && evaluate {
                    let v_h = self.hairpin_energy(i, j);

                    // best interior loop decomposition; k stays within the
                    // live rows of the circular V window
                    let mut v_iloop = INF;
                    let (mut best_k, mut best_l, mut best_e) = (0usize, 0usize, INF);
                    let max_k = (j - TURN - 2).min(i + MAXLOOP);
                    for k in (i + 1)..=max_k {
                        let k_mod = k % (MAXLOOP + 1);
                        let min_l = (k + TURN + 1 + MAXLOOP + 2).max(k + j - i) - MAXLOOP - 2;
                        for l in min_l..j {
                            let v_kl = self.v[k_mod][l];
                            let cand = esum(v_kl, self.iloop_energy(i, j, k, l));
                            if cand < v_iloop {
                                v_iloop = cand;
                                best_k = k;
                                best_l = l;
                                best_e = v_kl;
                            }
                        }
                    }

                    let v_split = self.e_mb_loop(i, j);
                    let v = v_h.min(v_iloop).min(v_split);

                    let w_v = self.ext_stem_energy(v, i, j);
                    let wm_v = self.ml_stem_energy(v, i, j);
                    let forced_ij = self.restriction.forced_pair(i, j);

                    if forced_ij {
                        w = w_v;
                        wm = wm_v;
                    } else if paired_kj {
                        w = w_split;
                        wm = wm_split;
                    } else {
                        w = w_v.min(w_split);
                        wm = wm_v.min(wm_split);
                    }

                    // register required trace arrows from (i,j)
                    if v_iloop < v_h.min(v_split) {
                        if self.cl.is_candidate(best_k, best_l) {
                            self.ta.avoid();
                        } else {
                            self.ta.register(i, j, best_k, best_l, best_e);
                        }
                    }
                    // check whether (i,j) is a candidate; then register
                    if w_v < w_split || wm_v < wm_split || forced_ij {
                        self.cl.register(i, j, v);
                        // always keep arrows starting from candidates
                        self.ta.inc_source_ref(i, j);
                    }
                    self.v[i_mod][j] = v;
                } else {
                    self.v[i_mod][j] = INF;
                }
                self.w[j] = w;
                self.wm[j] = wm;
                self.wm2[j] = wm2_split;
            }

            // snapshot WM2 for the multiloop closings of the next rows
            self.dmli2.copy_from_slice(&self.dmli1);
            self.dmli1.copy_from_slice(&self.wm2);

            if self.garbage_collect {
                if i + MAXLOOP + 1 <= n {
                    self.ta.gc_row(i + MAXLOOP + 1);
                }
                self.cl.shrink();
                self.ta.compactify();
            }
        }

        debug!(
            "fold n={} mfe={} candidates={} arrows={} (max {}, avoided {}, erased {})",
            n,
            self.w[n],
            self.cl.num_candidates(),
            self.ta.len(),
            self.ta.max_len(),
            self.ta.num_avoided(),
            self.ta.num_erased(),
        );
        self.w[n]
    }

    /// The folded MFE, `W[n]`.
    pub fn mfe(&self) -> Energy {
        self.w[self.n]
    }
}
