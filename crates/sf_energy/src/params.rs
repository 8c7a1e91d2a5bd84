use crate::Energy;
use crate::INF;
use crate::Base;
use crate::PairTypeRNA;
use crate::{BCOUNT, PCOUNT};

/// Dangling end model: `D1` scores at most one dangle per helix end through
/// the multiloop closing sub-cases, `D2` always scores both neighboring
/// bases of a stem as a terminal mismatch (the RNAfold `-d2` convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dangles {
    D1,
    #[default]
    D2,
}

impl TryFrom<u8> for Dangles {
    type Error = u8;

    fn try_from(d: u8) -> Result<Self, u8> {
        match d {
            1 => Ok(Dangles::D1),
            2 => Ok(Dangles::D2),
            other => Err(other),
        }
    }
}

// Tables are indexed by PairTypeRNA (AU, UA, CG, GC, GU, UG, NN) and Base
// (A, C, G, U, N). NN rows/columns are neutral fillers; lookups are gated on
// can_pair() before they reach a table.

const STACK: [[Energy; PCOUNT]; PCOUNT] = [
    [-110,  -90, -210, -220, -140,  -60, 0], // AU
    [ -90, -130, -210, -240, -130, -100, 0], // UA
    [-210, -210, -240, -330, -210, -140, 0], // CG
    [-220, -240, -330, -340, -250, -150, 0], // GC
    [-140, -130, -210, -250,  130,  -50, 0], // GU
    [ -60, -100, -140, -150,  -50,   30, 0], // UG
    [   0,    0,    0,    0,    0,    0, 0], // NN
];

const HAIRPIN_INIT: [Energy; 31] = [
    INF, INF, INF, 540, 560, 570, 540, 600, 550, 640, 650, 660, 670, 678,
    686, 694, 701, 707, 713, 719, 725, 730, 735, 740, 744, 749, 753, 757,
    761, 765, 769,
];

const BULGE_INIT: [Energy; 31] = [
    INF, 380, 280, 320, 360, 400, 440, 459, 470, 480, 490, 500, 510, 519,
    527, 534, 541, 548, 554, 560, 565, 571, 576, 580, 585, 589, 594, 598,
    602, 605, 609,
];

const INTERIOR_INIT: [Energy; 31] = [
    INF, INF, 150, 160, 160, 180, 200, 220, 230, 240, 250, 260, 270, 278,
    286, 294, 301, 307, 313, 319, 325, 330, 335, 340, 345, 349, 353, 357,
    361, 365, 369,
];

const DANGLE5: [[Energy; BCOUNT]; PCOUNT] = [
    [-30, -30, -40, -20, 0], // AU
    [-30, -10, -20, -20, 0], // UA
    [-50, -30, -20, -10, 0], // CG
    [-20, -30,   0,   0, 0], // GC
    [-30, -30, -40, -20, 0], // GU
    [-30, -10, -20, -20, 0], // UG
    [  0,   0,   0,   0, 0], // NN
];

const DANGLE3: [[Energy; BCOUNT]; PCOUNT] = [
    [ -70, -10,  -70,  -10, 0], // AU
    [ -80, -50,  -80,  -60, 0], // UA
    [-110, -40, -130,  -60, 0], // CG
    [-170, -80, -170, -120, 0], // GC
    [ -70, -10,  -70,  -10, 0], // GU
    [ -80, -50,  -80,  -60, 0], // UG
    [   0,   0,    0,    0, 0], // NN
];

type MismatchTable = [[[Energy; BCOUNT]; BCOUNT]; PCOUNT];

/// Terminal mismatches as the sum of both dangle contributions.
fn dangle_sum_mismatch() -> MismatchTable {
    let mut table = [[[0; BCOUNT]; BCOUNT]; PCOUNT];
    for (pt, row) in table.iter_mut().enumerate() {
        for (m5, col) in row.iter_mut().enumerate() {
            for (m3, e) in col.iter_mut().enumerate() {
                *e = DANGLE5[pt][m5] + DANGLE3[pt][m3];
            }
        }
    }
    table
}

/// Interior loop mismatches: first-mismatch bonuses for AG, GA and UU, and
/// the RU closure penalty folded into the table.
fn interior_mismatch() -> MismatchTable {
    let pairs = [
        PairTypeRNA::AU, PairTypeRNA::UA, PairTypeRNA::CG, PairTypeRNA::GC,
        PairTypeRNA::GU, PairTypeRNA::UG, PairTypeRNA::NN,
    ];
    let mut table = [[[0; BCOUNT]; BCOUNT]; PCOUNT];
    for (pt, row) in table.iter_mut().enumerate() {
        let closure = if pairs[pt].is_ru() { 70 } else { 0 };
        for (m5, col) in row.iter_mut().enumerate() {
            for (m3, e) in col.iter_mut().enumerate() {
                let bonus = match (m5, m3) {
                    (a, g) if a == Base::A as usize && g == Base::G as usize => -50,
                    (g, a) if g == Base::G as usize && a == Base::A as usize => -110,
                    (u1, u2) if u1 == Base::U as usize && u2 == Base::U as usize => -70,
                    _ => 0,
                };
                *e = closure + bonus;
            }
        }
    }
    table
}

/// The compiled-in Turner-style nearest neighbor parameter set at 37 °C.
///
/// Stacking, initiation and dangle tables carry the standard published
/// values; terminal mismatch tables are derived from the dangle tables, and
/// the tabulated small-loop specials (1x1, 2x1, 2x2, tetraloops) go through
/// the generic loop formulas instead.
#[derive(Debug)]
pub struct EnergyParams {
    pub(crate) stack: [[Energy; PCOUNT]; PCOUNT],
    pub(crate) hairpin_init: [Energy; 31],
    pub(crate) bulge_init: [Energy; 31],
    pub(crate) interior_init: [Energy; 31],
    pub(crate) dangle5: [[Energy; BCOUNT]; PCOUNT],
    pub(crate) dangle3: [[Energy; BCOUNT]; PCOUNT],
    pub(crate) mismatch_hairpin: MismatchTable,
    pub(crate) mismatch_interior: MismatchTable,
    pub(crate) mismatch_multi: MismatchTable,
    pub(crate) mismatch_exterior: MismatchTable,

    pub(crate) ninio: Energy,
    pub(crate) max_ninio: Energy,
    pub(crate) terminal_ru: Energy,

    // ML params section -- hardcoded.
    pub(crate) ml_base: Energy,
    pub(crate) ml_closing: Energy,
    pub(crate) ml_intern: Energy,

    /// Logarithmic loop energy extrapolation beyond tabulated sizes.
    pub(crate) lxc: f64,
}

impl Default for EnergyParams {
    fn default() -> Self {
        EnergyParams::turner2004()
    }
}

impl EnergyParams {
    pub fn turner2004() -> Self {
        let mismatch = dangle_sum_mismatch();
        EnergyParams {
            stack: STACK,
            hairpin_init: HAIRPIN_INIT,
            bulge_init: BULGE_INIT,
            interior_init: INTERIOR_INIT,
            dangle5: DANGLE5,
            dangle3: DANGLE3,
            mismatch_hairpin: mismatch,
            mismatch_interior: interior_mismatch(),
            mismatch_multi: mismatch,
            mismatch_exterior: mismatch,

            // NINIO params section -- hardcoded.
            ninio: 60,
            max_ninio: 300,

            // Misc params section -- hardcoded.
            terminal_ru: 50,

            // ML params section -- hardcoded.
            ml_base: 0,
            ml_closing: 930,
            ml_intern: -90,

            lxc: 107.856,
        }
    }

    /// Size-dependent initiation with logarithmic extrapolation past 30.
    pub(crate) fn size_init(table: &[Energy; 31], size: usize, lxc: f64) -> Energy {
        if size <= 30 {
            table[size]
        } else {
            table[30] + (lxc * (size as f64 / 30.0).ln()) as Energy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_symmetry() {
        for a in 0..PCOUNT {
            for b in 0..PCOUNT {
                assert_eq!(STACK[a][b], STACK[b][a], "stack[{}][{}]", a, b);
            }
        }
    }

    #[test]
    fn test_derived_mismatch() {
        let p = EnergyParams::turner2004();
        let cg = PairTypeRNA::CG as usize;
        let a = Base::A as usize;
        assert_eq!(p.mismatch_hairpin[cg][a][a], -50 + -110);
        assert_eq!(p.mismatch_exterior[cg][a][a], -160);
        // interior mismatches carry first-mismatch bonuses only
        let g = Base::G as usize;
        assert_eq!(p.mismatch_interior[cg][a][g], -50);
        assert_eq!(p.mismatch_interior[cg][g][a], -110);
        assert_eq!(p.mismatch_interior[cg][a][a], 0);
        let au = PairTypeRNA::AU as usize;
        assert_eq!(p.mismatch_interior[au][a][a], 70);
    }

    #[test]
    fn test_size_extrapolation() {
        let p = EnergyParams::turner2004();
        assert_eq!(EnergyParams::size_init(&p.hairpin_init, 3, p.lxc), 540);
        assert_eq!(EnergyParams::size_init(&p.hairpin_init, 30, p.lxc), 769);
        let e40 = EnergyParams::size_init(&p.hairpin_init, 40, p.lxc);
        assert!(e40 > 769 && e40 < 900, "got {}", e40);
    }

    #[test]
    fn test_dangles_from_flag() {
        assert_eq!(Dangles::try_from(1).unwrap(), Dangles::D1);
        assert_eq!(Dangles::try_from(2).unwrap(), Dangles::D2);
        assert!(Dangles::try_from(3).is_err());
        assert_eq!(Dangles::default(), Dangles::D2);
    }
}
