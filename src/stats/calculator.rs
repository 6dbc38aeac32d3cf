//! Statistics Calculator Module
//! Descriptive statistics over plain `f64` samples. Missing values are NaN and
//! are skipped the same way pandas skips them.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Box-plot summary of one group's values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
}

impl Default for BoxSummary {
    fn default() -> Self {
        Self {
            count: 0,
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            std: f64::NAN,
            whisker_low: f64::NAN,
            whisker_high: f64::NAN,
        }
    }
}

/// Stateless statistics helpers.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Mean of the non-NaN values; NaN when there are none.
    pub fn nan_mean<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        let (sum, n) = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        if n == 0 {
            f64::NAN
        } else {
            sum / n as f64
        }
    }

    /// Sum of the non-NaN values; zero when there are none.
    pub fn nan_sum<I>(values: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().filter(|v| !v.is_nan()).sum()
    }

    /// Non-NaN values sorted ascending.
    pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        sorted
    }

    /// Percentile of an ascending slice using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        let lo = sorted_values[lower];
        let hi = sorted_values[upper];
        if lower == upper || lo == hi {
            lo
        } else {
            lo + (hi - lo) * frac
        }
    }

    /// Box-plot summary with 1.5 × IQR whiskers. NaN values are dropped first.
    pub fn box_summary(values: &[f64]) -> BoxSummary {
        let sorted = Self::sorted_finite(values);
        let n = sorted.len();
        if n == 0 {
            return BoxSummary::default();
        }

        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);

        BoxSummary {
            count: n,
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[n - 1],
            mean: sorted.iter().mean(),
            std: sorted.iter().std_dev(),
            whisker_low,
            whisker_high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_mean_skips_missing() {
        assert_eq!(StatsCalculator::nan_mean([1.0, f64::NAN, 3.0]), 2.0);
        assert!(StatsCalculator::nan_mean([f64::NAN]).is_nan());
        assert!(StatsCalculator::nan_mean(Vec::new()).is_nan());
    }

    #[test]
    fn test_nan_sum_of_nothing_is_zero() {
        assert_eq!(StatsCalculator::nan_sum([f64::NAN]), 0.0);
        assert_eq!(StatsCalculator::nan_sum([1.5, -0.5]), 1.0);
    }

    #[test]
    fn test_percentile_matches_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 0.0), 1.0);
        assert_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_eq!(StatsCalculator::percentile(&sorted, 100.0), 4.0);
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_percentile_between_equal_values_is_exact() {
        let sorted = [0.1, 0.1, 0.1, 0.7];
        assert_eq!(StatsCalculator::percentile(&sorted, 30.0), 0.1);
    }

    #[test]
    fn test_box_summary() {
        let summary = StatsCalculator::box_summary(&[1.0, 2.0, 3.0, 4.0, 100.0, f64::NAN]);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.mean, 22.0);
        assert_eq!(summary.whisker_high, 4.0);
        assert_eq!(summary.whisker_low, 1.0);
    }

    #[test]
    fn test_box_summary_of_empty_is_undefined() {
        let summary = StatsCalculator::box_summary(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.median.is_nan());
        assert!(summary.mean.is_nan());
    }
}
