//! Title rating aggregation.
//!
//! A title's rating is the mean of its review scores rounded to one decimal
//! place. It is recomputed on every read from `SUM(score)` and `COUNT(*)`;
//! a title without reviews has no rating at all (not `0.0`).

/// Compute the rating from a score sum and a review count.
///
/// Returns `None` when `review_count` is zero (or negative, which the store
/// never produces).
pub fn compute_rating(score_sum: i64, review_count: i64) -> Option<f64> {
    if review_count <= 0 {
        return None;
    }
    let mean = score_sum as f64 / review_count as f64;
    Some(round_to_tenth(mean))
}

/// Mean of an in-memory set of scores, same contract as [`compute_rating`].
pub fn mean_score(scores: &[i16]) -> Option<f64> {
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    compute_rating(sum, scores.len() as i64)
}

/// Round to one decimal place, halves to even (6.25 -> 6.2, 6.75 -> 6.8).
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reviews_means_no_rating() {
        assert_eq!(compute_rating(0, 0), None);
        assert_eq!(mean_score(&[]), None);
    }

    #[test]
    fn single_review_is_its_own_rating() {
        assert_eq!(mean_score(&[7]), Some(7.0));
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        // 10 / 3 = 3.333...
        assert_eq!(mean_score(&[1, 4, 5]), Some(3.3));
        // 20 / 3 = 6.666...
        assert_eq!(mean_score(&[6, 7, 7]), Some(6.7));
    }

    #[test]
    fn exact_means_are_unchanged() {
        assert_eq!(mean_score(&[4, 6]), Some(5.0));
        assert_eq!(mean_score(&[1, 10]), Some(5.5));
    }

    #[test]
    fn halves_round_to_even() {
        // 25 / 4 = 6.25
        assert_eq!(mean_score(&[6, 6, 7, 6]), Some(6.2));
        // 33 / 4 = 8.25
        assert_eq!(mean_score(&[8, 8, 8, 9]), Some(8.2));
        // 27 / 4 = 6.75
        assert_eq!(mean_score(&[6, 7, 7, 7]), Some(6.8));
        // 5 / 4 = 1.25
        assert_eq!(mean_score(&[1, 1, 1, 2]), Some(1.2));
    }

    #[test]
    fn sum_and_count_agree_with_slice() {
        let scores = [10, 9, 3, 8, 8, 2];
        let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
        assert_eq!(compute_rating(sum, scores.len() as i64), mean_score(&scores));
    }
}
