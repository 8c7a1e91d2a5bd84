//! The sparse engine against a dense reference.
//!
//! The reference keeps every DP cell (full `V`, 2-D `W`/`WM`/`WM2`), does no
//! candidate filtering and no trace arrows, and uses the same oracle with
//! the same conventions (window-bounded interior loops, no dangles past the
//! sequence ends). Any candidate or arrow the sparse engine drops must be
//! reconstructible, so the two MFEs have to agree exactly.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use sf_energy::energy_of_structure;
use sf_energy::esum;
use sf_energy::pair_type;
use sf_energy::Dangles;
use sf_energy::Energy;
use sf_energy::EnergyParams;
use sf_energy::NucleotideVec;
use sf_energy::INF;
use sf_fold::SparseFold;
use sf_fold::MAXLOOP;
use sf_fold::TURN;
use sf_structure::PairTable;
use sf_structure::Restriction;

struct DenseFold<'a> {
    seq: &'a NucleotideVec,
    n: usize,
    params: &'a EnergyParams,
    dangles: Dangles,
    v: Vec<Vec<Energy>>,
    wm: Vec<Vec<Energy>>,
    wm2: Vec<Vec<Energy>>,
}

impl<'a> DenseFold<'a> {
    fn new(seq: &'a NucleotideVec, params: &'a EnergyParams, dangles: Dangles) -> Self {
        let n = seq.len();
        DenseFold {
            seq,
            n,
            params,
            dangles,
            v: vec![vec![INF; n + 2]; n + 3],
            wm: vec![vec![INF; n + 2]; n + 3],
            wm2: vec![vec![INF; n + 2]; n + 3],
        }
    }

    fn mismatches(&self, k: usize, j: usize) -> (Option<sf_energy::Base>, Option<sf_energy::Base>) {
        match self.dangles {
            Dangles::D2 => (
                (k > 1).then(|| self.seq[k - 1]),
                (j < self.n).then(|| self.seq[j + 1]),
            ),
            Dangles::D1 => (None, None),
        }
    }

    fn ext(&self, k: usize, j: usize) -> Energy {
        let (mm5, mm3) = self.mismatches(k, j);
        esum(
            self.v[k][j],
            self.params.ext_stem(pair_type(self.seq[k], self.seq[j]), mm5, mm3),
        )
    }

    fn ml(&self, k: usize, j: usize) -> Energy {
        let (mm5, mm3) = self.mismatches(k, j);
        esum(
            self.v[k][j],
            self.params.ml_stem(pair_type(self.seq[k], self.seq[j]), mm5, mm3),
        )
    }

    fn v_multiloop(&self, i: usize, j: usize) -> Energy {
        let p = self.params;
        let tt = pair_type(self.seq[j], self.seq[i]);
        match self.dangles {
            Dangles::D2 => esum(
                self.wm2[i + 1][j - 1],
                p.ml_stem(tt, Some(self.seq[j - 1]), Some(self.seq[i + 1])) + p.ml_closing(),
            ),
            Dangles::D1 => {
                let mut e = esum(
                    self.wm2[i + 1][j - 1],
                    p.ml_stem(tt, None, None) + p.ml_closing(),
                );
                e = e.min(esum(
                    self.wm2[i + 2][j - 1],
                    p.ml_stem(tt, None, Some(self.seq[i + 1])) + p.ml_closing() + p.ml_base(),
                ));
                e = e.min(esum(
                    self.wm2[i + 1][j - 2],
                    p.ml_stem(tt, Some(self.seq[j - 1]), None) + p.ml_closing() + p.ml_base(),
                ));
                e = e.min(esum(
                    self.wm2[i + 2][j - 2],
                    p.ml_stem(tt, Some(self.seq[j - 1]), Some(self.seq[i + 1]))
                        + p.ml_closing()
                        + 2 * p.ml_base(),
                ));
                e
            }
        }
    }

    fn fold(&mut self) -> Energy {
        let n = self.n;
        let p = self.params;
        for i in (1..=n).rev() {
            for j in (i + TURN + 1)..=n {
                // V
                let mut v = INF;
                if pair_type(self.seq[i], self.seq[j]).can_pair() {
                    let v_h = p.hairpin(self.seq, i, j);

                    let mut v_iloop = INF;
                    let max_k = (j - TURN - 2).min(i + MAXLOOP);
                    for k in (i + 1)..=max_k {
                        let min_l = (k + TURN + 1 + MAXLOOP + 2).max(k + j - i) - MAXLOOP - 2;
                        for l in min_l..j {
                            v_iloop = v_iloop.min(esum(
                                self.v[k][l],
                                p.internal_loop(self.seq, i, j, k, l),
                            ));
                        }
                    }

                    v = v_h.min(v_iloop).min(self.v_multiloop(i, j));
                }
                self.v[i][j] = v;

                // WM
                let mut wm = esum(self.wm[i][j - 1], p.ml_base());
                for k in i..=(j - TURN - 1) {
                    let stem = self.ml(k, j);
                    wm = wm.min(esum(((k - i) as Energy) * p.ml_base(), stem));
                    if k > i {
                        wm = wm.min(esum(self.wm[i][k - 1], stem));
                    }
                }
                self.wm[i][j] = wm;

                // WM2
                let mut wm2 = esum(self.wm2[i][j - 1], p.ml_base());
                for k in (i + 1)..=(j - TURN - 1) {
                    wm2 = wm2.min(esum(self.wm[i][k - 1], self.ml(k, j)));
                }
                self.wm2[i][j] = wm2;
            }
        }

        // W over the exterior loop, anchored at 1
        let mut w = vec![0; n + 1];
        for j in 1..=n {
            let mut best = w[j - 1];
            if j > TURN + 1 {
                for k in 1..=(j - TURN - 1) {
                    best = best.min(esum(w[k - 1], self.ext(k, j)));
                }
            }
            w[j] = best;
        }
        w[n]
    }
}

fn random_sequence(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| ['A', 'C', 'G', 'U'][rng.random_range(0..4)])
        .collect()
}

fn sparse_mfe_and_structure(seq: &NucleotideVec, dangles: Dangles) -> (Energy, String) {
    let params = EnergyParams::turner2004();
    let mut folder = SparseFold::new(
        seq,
        &params,
        Restriction::unrestricted(seq.len()),
        dangles,
        true,
    )
    .unwrap();
    let mfe = folder.fold();
    let structure = folder.trace_back(false);
    (mfe, structure)
}

#[test]
fn dense_reference_sanity() {
    let seq = NucleotideVec::try_from("GGGAAAUCCC").unwrap();
    let params = EnergyParams::turner2004();
    let mut dense = DenseFold::new(&seq, &params, Dangles::D2);
    assert_eq!(dense.fold(), -240);
}

#[test]
fn sparse_equals_dense_double_dangles() {
    let mut rng = StdRng::seed_from_u64(42);
    let params = EnergyParams::turner2004();
    for len in [20, 40, 55, 70] {
        for _ in 0..4 {
            let s = random_sequence(&mut rng, len);
            let seq = NucleotideVec::try_from(s.as_str()).unwrap();

            let dense_mfe = DenseFold::new(&seq, &params, Dangles::D2).fold();
            let (sparse_mfe, structure) = sparse_mfe_and_structure(&seq, Dangles::D2);
            assert_eq!(sparse_mfe, dense_mfe, "MFE mismatch for {}", s);

            // the traced structure realizes the reported MFE
            let pt = PairTable::try_from(structure.as_str()).unwrap();
            assert!(pt.crossing_free());
            assert_eq!(
                energy_of_structure(&params, &seq, &pt),
                sparse_mfe,
                "trace inconsistent for {}",
                s
            );
        }
    }
}

#[test]
fn sparse_equals_dense_single_dangles() {
    let mut rng = StdRng::seed_from_u64(1234);
    let params = EnergyParams::turner2004();
    for len in [30, 50, 65] {
        for _ in 0..3 {
            let s = random_sequence(&mut rng, len);
            let seq = NucleotideVec::try_from(s.as_str()).unwrap();

            let dense_mfe = DenseFold::new(&seq, &params, Dangles::D1).fold();
            let (sparse_mfe, structure) = sparse_mfe_and_structure(&seq, Dangles::D1);
            assert_eq!(sparse_mfe, dense_mfe, "MFE mismatch (d1) for {}", s);
            assert_eq!(structure.len(), len);
        }
    }
}

#[test]
fn sparse_equals_dense_on_fixed_sequences() {
    let params = EnergyParams::turner2004();
    for s in [
        "GGGAAAUCCC",
        "GCGCUUAAGGCGC",
        "AAGGGGAAAACCCCAAGGGGAAAACCCCAA",
        "GGCGCAAAGCGAAGGCAAGCCAAGCGCC",
    ] {
        let seq = NucleotideVec::try_from(s).unwrap();
        let dense_mfe = DenseFold::new(&seq, &params, Dangles::D2).fold();
        let (sparse_mfe, _) = sparse_mfe_and_structure(&seq, Dangles::D2);
        assert_eq!(sparse_mfe, dense_mfe, "MFE mismatch for {}", s);
    }
}
