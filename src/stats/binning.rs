//! Equal-frequency (quantile) binning.

use super::calculator::StatsCalculator;
use serde::Serialize;

/// One quantile interval. All intervals are right-closed; the first one also
/// includes its lower edge so the minimum value is covered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileBin {
    pub lower: f64,
    pub upper: f64,
    pub include_lower: bool,
}

impl QuantileBin {
    pub fn contains(&self, value: f64) -> bool {
        let above = if self.include_lower {
            value >= self.lower
        } else {
            value > self.lower
        };
        above && value <= self.upper
    }

    pub fn label(&self) -> String {
        let open = if self.include_lower { '[' } else { '(' };
        format!("{}{:.2}, {:.2}]", open, self.lower, self.upper)
    }
}

/// Split `values` into at most `bins` equal-frequency intervals.
///
/// Edges are the linear-interpolation quantiles at `k / bins`. Repeated edges
/// are dropped, so heavily tied data yields fewer intervals; if every value is
/// the same a single degenerate interval is returned. NaN values are ignored.
pub fn quantile_bins(values: &[f64], bins: usize) -> Vec<QuantileBin> {
    let sorted = StatsCalculator::sorted_finite(values);
    if sorted.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut edges: Vec<f64> = (0..=bins)
        .map(|k| StatsCalculator::percentile(&sorted, 100.0 * k as f64 / bins as f64))
        .collect();
    edges.dedup();

    if edges.len() == 1 {
        return vec![QuantileBin {
            lower: edges[0],
            upper: edges[0],
            include_lower: true,
        }];
    }

    edges
        .windows(2)
        .enumerate()
        .map(|(i, pair)| QuantileBin {
            lower: pair[0],
            upper: pair[1],
            include_lower: i == 0,
        })
        .collect()
}

/// Index of the interval holding `value`, if any.
pub fn assign_bin(bins: &[QuantileBin], value: f64) -> Option<usize> {
    if value.is_nan() {
        return None;
    }
    bins.iter().position(|bin| bin.contains(value))
}
