use crate::Energy;
use crate::INF;
use crate::Base;
use crate::EnergyParams;
use crate::NucleotideVec;
use crate::pair_type;
use crate::PairTypeRNA;

/// The loop energy oracle. All functions are pure table reads; `INF` marks
/// contributions that do not exist (non-canonical closing pairs, undersized
/// loops) and propagates through the DP as an ordinary value.
impl EnergyParams {
    /// Energy of the hairpin loop closed by `(i,j)`, 1-indexed.
    pub fn hairpin(&self, seq: &NucleotideVec, i: usize, j: usize) -> Energy {
        debug_assert!(1 <= i && i < j && j <= seq.len());
        let pt = pair_type(seq[i], seq[j]);
        if !pt.can_pair() {
            return INF;
        }
        let size = j - i - 1;
        if size < 3 {
            return INF;
        }

        let mut e = Self::size_init(&self.hairpin_init, size, self.lxc);
        if size == 3 {
            if pt.is_ru() {
                e += self.terminal_ru;
            }
        } else {
            e += self.mismatch_hairpin[pt as usize][seq[i + 1] as usize][seq[j - 1] as usize];
        }
        e
    }

    /// Energy of the interior loop closed by `(i,j)` with inner pair `(k,l)`,
    /// `i < k < l < j`. Covers stacks (size 0) and bulges as special cases.
    pub fn internal_loop(
        &self,
        seq: &NucleotideVec,
        i: usize,
        j: usize,
        k: usize,
        l: usize,
    ) -> Energy {
        debug_assert!(1 <= i && i < k && k < l && l < j && j <= seq.len());
        let pt = pair_type(seq[i], seq[j]);
        // enclosed pair type 'turned around' for the table lookup
        let pt_inner = pair_type(seq[l], seq[k]);
        if !pt.can_pair() || !pt_inner.can_pair() {
            return INF;
        }

        let n1 = k - i - 1;
        let n2 = j - l - 1;

        match (n1, n2) {
            (0, 0) => self.stack[pt as usize][pt_inner as usize],
            (0, 1) | (1, 0) => {
                self.bulge_init[1] + self.stack[pt as usize][pt_inner as usize]
            }
            (0, n) | (n, 0) => {
                let mut e = Self::size_init(&self.bulge_init, n, self.lxc);
                if pt.is_ru() {
                    e += self.terminal_ru;
                }
                if pt_inner.is_ru() {
                    e += self.terminal_ru;
                }
                e
            }
            _ => {
                let asym = (n1 as Energy - n2 as Energy).abs() * self.ninio;
                Self::size_init(&self.interior_init, n1 + n2, self.lxc)
                    + asym.min(self.max_ninio)
                    + self.mismatch_interior[pt as usize][seq[i + 1] as usize][seq[j - 1] as usize]
                    + self.mismatch_interior[pt_inner as usize][seq[l + 1] as usize]
                        [seq[k - 1] as usize]
            }
        }
    }

    /// Exterior loop contribution of a stem with pair type `pt` and the
    /// optional 5'/3' neighboring bases (`None` when absent).
    pub fn ext_stem(&self, pt: PairTypeRNA, mm5: Option<Base>, mm3: Option<Base>) -> Energy {
        let mut e = match (mm5, mm3) {
            (Some(b5), Some(b3)) => {
                self.mismatch_exterior[pt as usize][b5 as usize][b3 as usize]
            }
            (Some(b5), None) => self.dangle5[pt as usize][b5 as usize],
            (None, Some(b3)) => self.dangle3[pt as usize][b3 as usize],
            (None, None) => 0,
        };
        if pt.is_ru() {
            e += self.terminal_ru;
        }
        e
    }

    /// Multiloop contribution of a component stem, including the per-stem
    /// constant.
    pub fn ml_stem(&self, pt: PairTypeRNA, mm5: Option<Base>, mm3: Option<Base>) -> Energy {
        let mut e = self.ml_intern
            + match (mm5, mm3) {
                (Some(b5), Some(b3)) => {
                    self.mismatch_multi[pt as usize][b5 as usize][b3 as usize]
                }
                (Some(b5), None) => self.dangle5[pt as usize][b5 as usize],
                (None, Some(b3)) => self.dangle3[pt as usize][b3 as usize],
                (None, None) => 0,
            };
        if pt.is_ru() {
            e += self.terminal_ru;
        }
        e
    }

    /// Multiloop cost per unpaired base.
    pub fn ml_base(&self) -> Energy {
        self.ml_base
    }

    /// Multiloop closing cost.
    pub fn ml_closing(&self) -> Energy {
        self.ml_closing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Base::*;

    fn seq(s: &str) -> NucleotideVec {
        NucleotideVec::try_from(s).expect("valid sequence")
    }

    #[test]
    fn test_hairpin_energies() {
        let p = EnergyParams::turner2004();
        // size-3 loops: initiation, plus RU penalty on RU closings
        assert_eq!(p.hairpin(&seq("GAAAC"), 1, 5), 540);
        assert_eq!(p.hairpin(&seq("CAAAG"), 1, 5), 540);
        assert_eq!(p.hairpin(&seq("AAAAU"), 1, 5), 590);
        assert_eq!(p.hairpin(&seq("UAAAG"), 1, 5), 590);
        // size-4 loop: initiation plus terminal mismatch
        assert_eq!(p.hairpin(&seq("CAAAAG"), 1, 6), 560 - 160);
        // non-canonical closing pair
        assert_eq!(p.hairpin(&seq("AAAAC"), 1, 5), INF);
        // undersized
        assert_eq!(p.hairpin(&seq("GAAC"), 1, 4), INF);
    }

    #[test]
    fn test_stacking() {
        let p = EnergyParams::turner2004();
        assert_eq!(p.internal_loop(&seq("CGCG"), 1, 4, 2, 3), -240);
        assert_eq!(p.internal_loop(&seq("CCGG"), 1, 4, 2, 3), -330);
        assert_eq!(p.internal_loop(&seq("ACGU"), 1, 4, 2, 3), -220);
        assert_eq!(p.internal_loop(&seq("GUAC"), 1, 4, 2, 3), -220);
    }

    #[test]
    fn test_bulges() {
        let p = EnergyParams::turner2004();
        // size-1 bulge keeps the adjacent stack
        assert_eq!(p.internal_loop(&seq("CAGCG"), 1, 5, 3, 4), 380 - 240);
        // size-2 bulge: initiation plus RU penalties (none for CG/CG)
        assert_eq!(p.internal_loop(&seq("CAAGCG"), 1, 6, 4, 5), 280);
        // size-2 bulge closed by AU on the outside
        assert_eq!(p.internal_loop(&seq("AAAGCU"), 1, 6, 4, 5), 280 + 50);
    }

    #[test]
    fn test_interior_loops() {
        let p = EnergyParams::turner2004();
        // 1x1 loop, CG closing both sides, A-A mismatches
        assert_eq!(p.internal_loop(&seq("CAGCAG"), 1, 6, 3, 4), 150);
        // 2x1 loop: size 3 initiation plus one asymmetry unit
        assert_eq!(p.internal_loop(&seq("CAAGCAG"), 1, 7, 4, 5), 160 + 60);
        // G-A bonus on the closing side, A-G bonus on the enclosed side
        assert_eq!(p.internal_loop(&seq("CGGCAG"), 1, 6, 3, 4), 150 - 110 - 50);
    }

    #[test]
    fn test_ext_stem() {
        let p = EnergyParams::turner2004();
        assert_eq!(p.ext_stem(PairTypeRNA::GC, None, None), 0);
        assert_eq!(p.ext_stem(PairTypeRNA::AU, None, None), 50);
        assert_eq!(p.ext_stem(PairTypeRNA::CG, Some(A), None), -50);
        assert_eq!(p.ext_stem(PairTypeRNA::CG, None, Some(A)), -110);
        assert_eq!(p.ext_stem(PairTypeRNA::CG, Some(A), Some(A)), -160);
    }

    #[test]
    fn test_ml_stem() {
        let p = EnergyParams::turner2004();
        assert_eq!(p.ml_stem(PairTypeRNA::CG, None, None), -90);
        assert_eq!(p.ml_stem(PairTypeRNA::AU, Some(U), Some(A)), -90 - 90 + 50);
        assert_eq!(p.ml_base(), 0);
        assert_eq!(p.ml_closing(), 930);
    }
}
