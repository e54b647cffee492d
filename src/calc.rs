use crate::models::Assignment;

/// Weighted average grade: `Σ(grade × weight) / Σ(weight)`.
///
/// Every assignment contributes its own weight, so two assignments with equal
/// weights count twice. An empty input or a zero total weight yields `0`.
pub fn weighted_average<'a, I>(assignments: I) -> f64
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let mut weighted_sum: f64 = 0.0;
    let mut total_weight: f64 = 0.0;

    for a in assignments {
        weighted_sum += a.grade * a.weight;
        total_weight += a.weight;
    }

    if total_weight == 0.0 {
        0.0
    } else {
        weighted_sum / total_weight
    }
}
