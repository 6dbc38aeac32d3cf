//! Command-line configuration for the dashboard binary.

use crate::data::{ClusterId, DataSnapshot, FilterSelection};
use crate::pipeline::ViewOptions;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_TRADES_PATH: &str = "final_merged_dataset.csv";
pub const DEFAULT_PROFILES_PATH: &str = "trader_clusters.csv";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--top-n must be at least 1")]
    ZeroTopN,
    #[error("--size-bins must be at least 1")]
    ZeroSizeBins,
}

/// Trader performance & market sentiment dashboard.
#[derive(Debug, Clone, Parser)]
#[command(name = "trader-dashboard", version, about)]
pub struct DashboardConfig {
    /// Merged trades CSV (trades joined with sentiment labels)
    #[arg(
        long = "trades",
        value_name = "PATH",
        env = "DASHBOARD_TRADES_PATH",
        default_value = DEFAULT_TRADES_PATH
    )]
    pub trades_path: PathBuf,

    /// Per-trader cluster statistics CSV
    #[arg(
        long = "profiles",
        value_name = "PATH",
        env = "DASHBOARD_PROFILES_PATH",
        default_value = DEFAULT_PROFILES_PATH
    )]
    pub profiles_path: PathBuf,

    /// Sentiment label to include (repeatable; default: all)
    #[arg(long = "sentiment", value_name = "LABEL")]
    pub sentiments: Vec<String>,

    /// Cluster id to include (repeatable; default: all)
    #[arg(long = "cluster", value_name = "ID")]
    pub clusters: Vec<String>,

    /// Traders listed per cluster in the top-traders table
    #[arg(long, default_value_t = 5)]
    pub top_n: usize,

    /// Number of equal-frequency trade-size bins
    #[arg(long, default_value_t = 4)]
    pub size_bins: usize,

    /// Rows shown in the dataset overview
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,

    /// Write every view as JSON to this file
    #[arg(long = "json", value_name = "PATH")]
    pub json_out: Option<PathBuf>,

    /// Render PNG charts into this directory
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Print the available sentiment and cluster options and exit
    #[arg(long)]
    pub list_options: bool,
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        if self.size_bins == 0 {
            return Err(ConfigError::ZeroSizeBins);
        }
        Ok(())
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            top_n: self.top_n,
            size_bins: self.size_bins,
            preview_rows: self.preview_rows,
        }
    }

    /// Resolve the flags against the loaded data. An empty list selects every
    /// option of its axis, including rows where the value is missing.
    pub fn selection(&self, snapshot: &DataSnapshot) -> FilterSelection {
        let sentiment_options = snapshot.sentiment_options();
        let cluster_options = snapshot.cluster_options();

        let sentiments = if self.sentiments.is_empty() {
            sentiment_options
        } else {
            for label in &self.sentiments {
                if !sentiment_options.contains(label) {
                    warn!(sentiment = %label, "unknown sentiment label selected");
                }
            }
            self.sentiments.clone()
        };

        let clusters = if self.clusters.is_empty() {
            cluster_options
        } else {
            let selected: Vec<ClusterId> = self
                .clusters
                .iter()
                .map(|c| ClusterId::new(c.as_str()))
                .collect();
            for cluster in &selected {
                if !cluster_options.contains(cluster) {
                    warn!(cluster = %cluster, "unknown cluster selected");
                }
            }
            selected
        };

        FilterSelection {
            include_unlabelled: self.sentiments.is_empty() && snapshot.has_unlabelled_trades(),
            include_unclustered: self.clusters.is_empty() && snapshot.has_unclustered_profiles(),
            ..FilterSelection::new(sentiments, clusters)
        }
    }
}
