//! Quantile class breaks, linear and in log space.

use crate::models::SampleValue;

/// Finite numeric values, sorted ascending. Everything else is dropped.
pub fn numeric_sorted(values: &[SampleValue]) -> Vec<f64> {
    let mut nums: Vec<f64> = values.iter().filter_map(SampleValue::as_number).collect();
    nums.sort_by(f64::total_cmp);
    nums
}

/// Quantile by linear interpolation between order statistics.
///
/// `sorted` must be ascending; `q` is clamped to [0, 1].
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let base = pos.floor() as usize;
    let rest = pos - base as f64;

    match sorted.get(base + 1) {
        Some(next) => Some(sorted[base] + rest * (next - sorted[base])),
        None => Some(sorted[base]),
    }
}

pub fn median(sorted: &[f64]) -> Option<f64> {
    quantile(sorted, 0.5)
}

/// Heavy right skew: positive median and max/median above `ratio`
pub fn is_right_skewed(sorted: &[f64], ratio: f64) -> bool {
    match (median(sorted), sorted.last()) {
        (Some(median), Some(&max)) => median > 0.0 && max / median > ratio,
        _ => false,
    }
}

/// `classes + 1` breakpoints at quantiles i/classes
pub fn quantile_breaks(sorted: &[f64], classes: usize) -> Vec<f64> {
    if sorted.is_empty() || classes == 0 {
        return Vec::new();
    }
    (0..=classes)
        .filter_map(|i| quantile(sorted, i as f64 / classes as f64))
        .collect()
}

/// Quantile breaks computed on `ln(v + offset)` and mapped back with `exp(x) - offset`.
///
/// Returns `None` when a value is not above `-offset`, where the transform is undefined.
pub fn log_quantile_breaks(sorted: &[f64], classes: usize, offset: f64) -> Option<Vec<f64>> {
    if sorted.first().is_some_and(|&min| min + offset <= 0.0) {
        return None;
    }
    // ln is monotonic, so the transformed values stay sorted
    let logs: Vec<f64> = sorted.iter().map(|v| (v + offset).ln()).collect();
    Some(
        quantile_breaks(&logs, classes)
            .into_iter()
            .map(|x| x.exp() - offset)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_numeric_sorted_filters() {
        let values = vec![
            SampleValue::from(3.0),
            SampleValue::Null,
            SampleValue::from("1"),
            SampleValue::from("abc"),
            SampleValue::from(f64::INFINITY),
            SampleValue::from(2.0),
        ];
        assert_eq!(numeric_sorted(&values), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert!(approx(quantile(&sorted, 0.5).unwrap(), 2.5));
        assert!(approx(quantile(&sorted, 0.25).unwrap(), 1.75));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.3), Some(7.0));
    }

    #[test]
    fn test_median_even_count() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        assert!(approx(median(&sorted).unwrap(), 5.5));
    }

    #[test]
    fn test_skew_detection() {
        let skewed = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        assert!(is_right_skewed(&skewed, 10.0));

        let flat = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(!is_right_skewed(&flat, 10.0));

        let non_positive_median = [-5.0, 0.0, 0.0, 50.0];
        assert!(!is_right_skewed(&non_positive_median, 10.0));

        assert!(!is_right_skewed(&[], 10.0));
    }

    #[test]
    fn test_quantile_breaks() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        let breaks = quantile_breaks(&sorted, 4);
        assert_eq!(breaks, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert!(quantile_breaks(&[], 5).is_empty());
    }

    #[test]
    fn test_log_breaks_keep_extremes() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let breaks = log_quantile_breaks(&sorted, 5, 1.0).unwrap();
        assert_eq!(breaks.len(), 6);
        assert!(approx(breaks[0], 1.0));
        assert!(approx(breaks[5], 100.0));
        assert!(breaks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_log_breaks_undefined_below_offset() {
        assert!(log_quantile_breaks(&[-3.0, 1.0, 50.0], 3, 1.0).is_none());
        assert!(log_quantile_breaks(&[-1.0, 1.0, 50.0], 3, 1.0).is_none());
    }
}
