use crate::StructureError;

/// Folding restriction tables derived from a restriction string.
///
/// The restriction alphabet: `.` leaves a position free, `x`/`X` forces it
/// unpaired, and matched brackets of any shape (`()`, `[]`, `{}`, `<>`)
/// force the two positions to pair with each other.
///
/// All tables are 1-indexed over `1..=n`; index 0 is a neutral slot.
/// `p_table[i]` holds the forced partner `j > 0`, `-1` for forced unpaired,
/// or `-2` for free. `last_j[i]` is the nearest enclosing forced closing
/// index at or after `i` (the sequence length when there is none), and
/// `depth[i]` is the nesting depth of forced pairs at `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    p_table: Vec<i32>,
    last_j: Vec<usize>,
    depth: Vec<usize>,
    n: usize,
}

const OPENERS: &str = "([{<";
const CLOSERS: &str = ")]}>";

impl Restriction {
    /// Parse a restriction string, scanning right-to-left: closers are
    /// pushed onto a stack and popped by the matching opener, recording the
    /// stack top and depth at every position on the way.
    pub fn parse(s: &str) -> Result<Self, StructureError> {
        let n = s.chars().count();
        let chars: Vec<char> = s.chars().collect();

        let mut p_table = vec![0i32; n + 1];
        let mut last_j = vec![0usize; n + 1];
        let mut depth = vec![0usize; n + 1];
        let mut stack = vec![n];
        let mut count = 0usize;

        for i in (1..=n).rev() {
            let c = chars[i - 1];
            match c {
                'x' | 'X' => p_table[i] = -1,
                '.' => p_table[i] = -2,
                _ if OPENERS.contains(c) || CLOSERS.contains(c) => {}
                _ => return Err(StructureError::InvalidToken(c, i - 1)),
            }
            if CLOSERS.contains(c) {
                stack.push(i);
                count += 1;
            }
            last_j[i] = *stack.last().expect("sentinel never popped");
            depth[i] = count;
            if OPENERS.contains(c) {
                if stack.len() == 1 {
                    return Err(StructureError::UnmatchedOpen(i - 1));
                }
                let j = stack.pop().expect("checked above");
                p_table[i] = j as i32;
                p_table[j] = i as i32;
                count -= 1;
            }
        }

        if stack.len() > 1 {
            let i = *stack.last().expect("nonempty");
            return Err(StructureError::UnmatchedClose(i - 1));
        }

        Ok(Restriction { p_table, last_j, depth, n })
    }

    /// A restriction that leaves every one of `n` positions free.
    pub fn unrestricted(n: usize) -> Self {
        let mut p_table = vec![-2i32; n + 1];
        p_table[0] = 0;
        Restriction {
            p_table,
            last_j: (0..=n).map(|i| if i == 0 { 0 } else { n }).collect(),
            depth: vec![0; n + 1],
            n,
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// The forced pairing partner of `i`, if any.
    pub fn forced_partner(&self, i: usize) -> Option<usize> {
        (self.p_table[i] > 0).then(|| self.p_table[i] as usize)
    }

    /// Position `i` is forced unpaired (`x`/`X`).
    pub fn forced_unpaired(&self, i: usize) -> bool {
        self.p_table[i] == -1
    }

    /// Position `i` is free (`.`).
    pub fn is_free(&self, i: usize) -> bool {
        self.p_table[i] == -2
    }

    /// Position `i` may stay unpaired (free or forced unpaired).
    pub fn may_be_unpaired(&self, i: usize) -> bool {
        self.p_table[i] < 0
    }

    pub fn both_free(&self, i: usize, j: usize) -> bool {
        self.is_free(i) && self.is_free(j)
    }

    /// `(i,j)` is a forced pair of the restriction.
    pub fn forced_pair(&self, i: usize, j: usize) -> bool {
        self.p_table[i] == j as i32 && self.p_table[j] == i as i32
    }

    /// No position in `a..=b` is forced to pair.
    pub fn span_free(&self, a: usize, b: usize) -> bool {
        (a..=b.min(self.n)).all(|m| self.p_table[m] <= 0)
    }

    /// Whether a decomposition over `[i..j]` is admissible: `i` and `j` must
    /// not straddle restricted regions (unequal forced-pair depth, or equal
    /// depth with `j` beyond the enclosing closer of `i`). In multiloop mode
    /// the check is relaxed when the span fully contains the forced pair
    /// incident to `i` or `j`.
    pub fn evaluate(&self, i: usize, j: usize, multiloop: bool) -> bool {
        let mut ok = self.depth[i] == self.depth[j] && j <= self.last_j[i];
        if multiloop && !ok {
            let pj = self.p_table[j];
            if pj > 0 && i < pj as usize && j > pj as usize {
                ok = true;
            }
            let pi = self.p_table[i];
            if pi > 0 && j > pi as usize && i < pi as usize {
                ok = true;
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unrestricted() {
        let r = Restriction::parse("....").unwrap();
        assert_eq!(r.len(), 4);
        for i in 1..=4 {
            assert!(r.is_free(i));
            assert!(r.may_be_unpaired(i));
            assert_eq!(r.forced_partner(i), None);
        }
        assert_eq!(r, Restriction::unrestricted(4));
    }

    #[test]
    fn test_parse_forced_pair_and_unpaired() {
        let r = Restriction::parse("(..x..)").unwrap();
        assert_eq!(r.forced_partner(1), Some(7));
        assert_eq!(r.forced_partner(7), Some(1));
        assert!(r.forced_pair(1, 7));
        assert!(!r.forced_pair(1, 6));
        assert!(r.forced_unpaired(4));
        assert!(!r.is_free(4));
        assert!(r.may_be_unpaired(4));
        assert!(r.is_free(2));
        assert!(!r.span_free(1, 7));
        assert!(r.span_free(2, 6));
    }

    #[test]
    fn test_bracket_shapes_are_equivalent() {
        for s in ["(...)", "[...]", "{...}", "<...>"] {
            let r = Restriction::parse(s).unwrap();
            assert!(r.forced_pair(1, 5), "shape {}", s);
        }
    }

    #[test]
    fn test_unbalanced() {
        assert!(matches!(
            Restriction::parse("((.)").unwrap_err(),
            StructureError::UnmatchedOpen(0)
        ));
        assert!(matches!(
            Restriction::parse(".))").unwrap_err(),
            StructureError::UnmatchedClose(_)
        ));
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(
            Restriction::parse("..*..").unwrap_err(),
            StructureError::InvalidToken('*', 2)
        ));
    }

    #[test]
    fn test_evaluate_straddling() {
        let r = Restriction::parse(".(...).(...).").unwrap();
        // inside one forced pair
        assert!(r.evaluate(3, 5, false));
        // straddles the two forced pairs at equal depth
        assert!(!r.evaluate(3, 8, false));
        // unequal depth
        assert!(!r.evaluate(1, 4, false));
        // outside both
        assert!(r.evaluate(1, 7, false));
    }

    #[test]
    fn test_evaluate_multiloop_relaxation() {
        let r = Restriction::parse(".(...).(...).").unwrap();
        // span [1..6] fully contains the forced pair (2,6)
        assert!(!r.evaluate(1, 6, false));
        assert!(r.evaluate(1, 6, true));
        // span [2..9] fully contains the forced pair (2,6)
        assert!(!r.evaluate(2, 9, false));
        assert!(r.evaluate(2, 9, true));
    }
}
