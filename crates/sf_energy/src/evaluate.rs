use sf_structure::PairTable;

use crate::Energy;
use crate::EnergyParams;
use crate::NucleotideVec;
use crate::pair_type;

/// Loop-based free energy of a complete (pseudoknot-free) structure under
/// the double-dangle convention: every stem scores both neighboring bases as
/// a terminal mismatch, exactly like the DP recursions do. The pair table is
/// 0-based, the sequence 1-based.
pub fn energy_of_structure(
    params: &EnergyParams,
    seq: &NucleotideVec,
    structure: &PairTable,
) -> Energy {
    let n = structure.len();
    debug_assert_eq!(n, seq.len());

    let mut e = 0;
    let mut p = 0;
    while p < n {
        match structure[p] {
            Some(q) if q > p => {
                let (i, j) = (p + 1, q + 1);
                e += params.ext_stem(
                    pair_type(seq[i], seq[j]),
                    (i > 1).then(|| seq[i - 1]),
                    (j < n).then(|| seq[j + 1]),
                );
                e += closed_energy(params, seq, structure, i, j);
                p = q + 1;
            }
            _ => p += 1,
        }
    }
    e
}

/// Energy of the structure enclosed by the pair `(i,j)`, 1-based, including
/// the loop closed by it.
fn closed_energy(
    params: &EnergyParams,
    seq: &NucleotideVec,
    structure: &PairTable,
    i: usize,
    j: usize,
) -> Energy {
    let mut children: Vec<(usize, usize)> = Vec::new();
    let mut unpaired: Energy = 0;

    // scan the loop interior, 0-based i..=j-2 is 1-based i+1..=j-1
    let mut q = i;
    while q + 2 <= j {
        match structure[q] {
            Some(r) => {
                debug_assert!(r > q, "ill-nested structure at {}", q);
                children.push((q + 1, r + 1));
                q = r + 1;
            }
            None => {
                unpaired += 1;
                q += 1;
            }
        }
    }

    match children.len() {
        0 => params.hairpin(seq, i, j),
        1 => {
            let (k, l) = children[0];
            params.internal_loop(seq, i, j, k, l) + closed_energy(params, seq, structure, k, l)
        }
        _ => {
            let mut e = params.ml_closing()
                + params.ml_stem(
                    pair_type(seq[j], seq[i]),
                    Some(seq[j - 1]),
                    Some(seq[i + 1]),
                )
                + unpaired * params.ml_base();
            for &(k, l) in &children {
                e += params.ml_stem(
                    pair_type(seq[k], seq[l]),
                    Some(seq[k - 1]),
                    Some(seq[l + 1]),
                );
                e += closed_energy(params, seq, structure, k, l);
            }
            e
        }
    }
}
