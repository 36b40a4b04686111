//! Smoothing and trend checks for metric histories
//!
//! Evaluation metrics recorded during training are noisy episode to episode.
//! These helpers compare them over a trailing window instead.

/// Trailing mean over every full `window` of `values`.
///
/// The result has `values.len() - window + 1` entries, or none when the
/// window is zero or longer than the input.
///
/// # Examples
///
/// ```
/// use tabular_q::analysis::trend::moving_average;
///
/// assert_eq!(moving_average(&[1.0, 3.0, 5.0, 7.0], 2), vec![2.0, 4.0, 6.0]);
/// ```
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }
    let mut sum: f64 = values[..window].iter().sum();
    let mut averages = Vec::with_capacity(values.len() - window + 1);
    averages.push(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        averages.push(sum / window as f64);
    }
    averages
}

/// Last smoothed value minus the first, `None` without a full window.
pub fn smoothed_change(values: &[f64], window: usize) -> Option<f64> {
    let smoothed = moving_average(values, window);
    Some(smoothed.last()? - smoothed.first()?)
}

/// Whether the smoothed series never rises by more than `tolerance` between
/// consecutive windows.
///
/// Histories too short for one full window count as non-increasing.
pub fn is_non_increasing_trend(values: &[f64], window: usize, tolerance: f64) -> bool {
    moving_average(values, window)
        .windows(2)
        .all(|pair| pair[1] <= pair[0] + tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_degenerate_windows() {
        assert!(moving_average(&[1.0, 2.0], 0).is_empty());
        assert!(moving_average(&[1.0, 2.0], 3).is_empty());
        assert_eq!(moving_average(&[4.0, 2.0], 2), vec![3.0]);
    }

    #[test]
    fn test_noisy_decline_is_non_increasing_when_smoothed() {
        let values = [1.0, 0.8, 0.9, 0.6, 0.7, 0.4, 0.5, 0.2];
        assert!(!is_non_increasing_trend(&values, 1, 0.0));
        assert!(is_non_increasing_trend(&values, 2, 0.0));
        assert!(smoothed_change(&values, 2).unwrap() < 0.0);
    }

    #[test]
    fn test_tolerance_absorbs_small_rises() {
        let values = [0.5, 0.51, 0.4];
        assert!(!is_non_increasing_trend(&values, 1, 0.0));
        assert!(is_non_increasing_trend(&values, 1, 0.02));
    }

    #[test]
    fn test_short_history() {
        assert!(is_non_increasing_trend(&[0.3], 5, 0.0));
        assert_eq!(smoothed_change(&[0.3], 5), None);
    }
}
