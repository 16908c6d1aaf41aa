/// Upper bound of a risk score.
pub const MAX_SCORE: u32 = 100;

/// Sum the points of every triggered rule, then clamp to 0-100.
pub fn compute_score(points: impl IntoIterator<Item = u32>) -> u8 {
    let total = points
        .into_iter()
        .fold(0u32, |acc, p| acc.saturating_add(p));
    total.min(MAX_SCORE) as u8
}
