//! Two-plane pseudoknot prediction.
//!
//! The sequence is folded twice under complementary restrictions: once with
//! every free position disallowed (keeping only the user's forced pairs in
//! play), and once with the forced-pair positions disallowed. Overlaying
//! the two bracket strings yields a visually pseudoknotted structure whose
//! energy is the sum of the two folds. This is post-processing only; it has
//! no interaction with the correctness of either fold.

/// Derive the two complementary restrictions from the user restriction:
/// `alt1` turns every `.` into `x`, `alt2` turns every `(`/`)` into `x`.
pub fn alt_restrictions(restricted: &str) -> (String, String) {
    let alt1: String = restricted
        .chars()
        .map(|c| if c == '.' { 'x' } else { c })
        .collect();
    let alt2: String = restricted
        .chars()
        .map(|c| if c == '(' || c == ')' { 'x' } else { c })
        .collect();
    (alt1, alt2)
}

/// Overlay the second plane onto the user restriction: the second fold's
/// `()` become `[]`, except that positions paired in the restriction keep
/// their `()` brackets.
pub fn overlay(second: &str, restricted: &str) -> String {
    second
        .chars()
        .zip(restricted.chars())
        .map(|(s, r)| match r {
            '(' | ')' => r,
            _ => match s {
                '(' => '[',
                ')' => ']',
                other => other,
            },
        })
        .collect()
}
