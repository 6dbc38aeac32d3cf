//! Stats module - Descriptive statistics and quantile binning

mod binning;
mod calculator;

pub use binning::{assign_bin, quantile_bins, QuantileBin};
pub use calculator::{BoxSummary, StatsCalculator};
