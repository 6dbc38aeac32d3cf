//! Pipeline module - Derived dashboard views
//!
//! Every view is a pure function of the snapshot and the filter selection.
//! Trade-level views honour only the sentiment selection; profile-level views
//! honour only the cluster selection; the top-trader table and the heatmap
//! always use the unfiltered tables.

mod clusters;
mod trades;

pub use clusters::{
    cluster_distribution, cluster_pnl_distribution, cluster_summary,
    cluster_win_rate_distribution, top_traders_per_cluster, win_rate_heatmap, ClusterSummary,
    ClusterSummaryRow, WinRateHeatmap,
};
pub use trades::{
    compute_kpis, pnl_by_sentiment, scatter_points, size_bin_win_rates, win_rate,
    win_rate_by, win_rate_by_sentiment, win_rate_by_side, Distribution, GroupWinRate, Kpis,
    ScatterPoint, SizeBinWinRate,
};

use crate::data::{
    ClusterId, DataProcessor, DataSnapshot, FilterSelection, TradeRecord, TraderProfile,
};
use serde::Serialize;
use tracing::debug;

/// Tunables of the view computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub top_n: usize,
    pub size_bins: usize,
    pub preview_rows: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            size_bins: 4,
            preview_rows: 10,
        }
    }
}

/// All views for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardViews<'a> {
    #[serde(skip)]
    pub filtered_trades: Vec<&'a TradeRecord>,
    #[serde(skip)]
    pub filtered_profiles: Vec<&'a TraderProfile>,
    pub kpis: Kpis,
    pub trade_preview: Vec<&'a TradeRecord>,
    pub profile_preview: Vec<&'a TraderProfile>,
    pub win_rate_by_sentiment: Vec<GroupWinRate>,
    pub win_rate_by_side: Vec<GroupWinRate>,
    pub win_rate_by_size: Vec<SizeBinWinRate>,
    pub pnl_by_sentiment: Vec<Distribution<String>>,
    pub cluster_win_rate: Vec<Distribution<ClusterId>>,
    pub cluster_total_pnl: Vec<Distribution<ClusterId>>,
    pub cluster_summary: ClusterSummary,
    pub top_traders: Vec<&'a TraderProfile>,
    pub heatmap: WinRateHeatmap,
    pub scatter: Vec<ScatterPoint<'a>>,
}

impl<'a> DashboardViews<'a> {
    pub fn compute(
        snapshot: &'a DataSnapshot,
        selection: &FilterSelection,
        options: &ViewOptions,
    ) -> Self {
        let filtered_trades = DataProcessor::filter_trades(snapshot.trades(), selection);
        let filtered_profiles = DataProcessor::filter_profiles(snapshot.profiles(), selection);
        debug!(
            trades = filtered_trades.len(),
            profiles = filtered_profiles.len(),
            sentiments = selection.sentiments.len(),
            clusters = selection.clusters.len(),
            "filters applied"
        );

        let kpis = compute_kpis(&filtered_trades);
        let win_rate_by_size = size_bin_win_rates(&filtered_trades, options.size_bins);
        debug!(bins = win_rate_by_size.len(), "size bins computed");

        let heatmap = win_rate_heatmap(snapshot.trades());
        debug!(
            clusters = heatmap.clusters.len(),
            sentiments = heatmap.sentiments.len(),
            "heatmap computed"
        );

        Self {
            kpis,
            trade_preview: filtered_trades.iter().copied().take(options.preview_rows).collect(),
            profile_preview: filtered_profiles
                .iter()
                .copied()
                .take(options.preview_rows)
                .collect(),
            win_rate_by_sentiment: win_rate_by_sentiment(&filtered_trades),
            win_rate_by_side: win_rate_by_side(&filtered_trades),
            win_rate_by_size,
            pnl_by_sentiment: pnl_by_sentiment(&filtered_trades),
            cluster_win_rate: cluster_win_rate_distribution(&filtered_profiles),
            cluster_total_pnl: cluster_pnl_distribution(&filtered_profiles),
            cluster_summary: cluster_summary(
                &filtered_profiles,
                &snapshot.profiles().feature_columns,
            ),
            top_traders: top_traders_per_cluster(snapshot.profiles(), options.top_n),
            heatmap,
            scatter: scatter_points(&filtered_trades),
            filtered_trades,
            filtered_profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProfileTable;

    fn snapshot() -> DataSnapshot {
        DataSnapshot::new(
            vec![
                TradeRecord::new("A", "buy", 50.0, 100.0, Some(true), Some("Fear")),
                TradeRecord::new("B", "sell", 80.0, -20.0, Some(false), Some("Greed")),
            ],
            ProfileTable::new(vec![
                TraderProfile::new("A", Some(ClusterId::from(0)), 10.0, 60.0, 500.0),
                TraderProfile::new("B", Some(ClusterId::from(1)), 5.0, 30.0, -200.0),
            ]),
        )
    }

    #[test]
    fn test_fear_only_selection() {
        let snapshot = snapshot();
        let selection = FilterSelection::new(["Fear"], snapshot.cluster_options());
        let views = DashboardViews::compute(&snapshot, &selection, &ViewOptions::default());

        assert_eq!(views.filtered_trades.len(), 1);
        assert_eq!(views.filtered_trades[0].account, "A");
        assert_eq!(views.kpis.total_trades, 1);
        assert_eq!(views.kpis.total_pnl, 100.0);
        assert_eq!(views.kpis.overall_win_rate, 100.0);
        assert_eq!(views.win_rate_by_sentiment.len(), 1);
    }

    #[test]
    fn test_cluster_zero_selection() {
        let snapshot = snapshot();
        let selection = FilterSelection::new(snapshot.sentiment_options(), [ClusterId::from(0)]);
        let views = DashboardViews::compute(&snapshot, &selection, &ViewOptions::default());

        assert_eq!(views.filtered_profiles.len(), 1);
        assert_eq!(views.filtered_profiles[0].account, "A");
        assert_eq!(
            views.cluster_summary.mean(&ClusterId::from(0), "total_pnl"),
            Some(500.0)
        );
        // cluster filter does not reach trade-level views or the unfiltered tables
        assert_eq!(views.kpis.total_trades, 2);
        assert_eq!(views.top_traders.len(), 2);
        assert_eq!(views.heatmap.clusters.len(), 2);
    }

    #[test]
    fn test_empty_selection_degrades_without_errors() {
        let snapshot = snapshot();
        let views = DashboardViews::compute(
            &snapshot,
            &FilterSelection::default(),
            &ViewOptions::default(),
        );

        assert_eq!(views.kpis.total_trades, 0);
        assert!(views.kpis.overall_win_rate.is_nan());
        assert!(views.win_rate_by_size.is_empty());
        assert!(views.cluster_summary.rows.is_empty());
        assert!(views.scatter.is_empty());
        assert_eq!(views.heatmap.cell(&ClusterId::from(0), "Fear"), Some(100.0));
    }

    #[test]
    fn test_views_serialize_nan_as_null() {
        let snapshot = snapshot();
        let views = DashboardViews::compute(
            &snapshot,
            &FilterSelection::default(),
            &ViewOptions::default(),
        );
        let json = serde_json::to_value(&views).unwrap();
        assert!(json["kpis"]["overall_win_rate"].is_null());
        assert_eq!(json["top_traders"][0]["account"], "A");
        assert_eq!(json["top_traders"][0]["cluster"], "0");
        assert!(json.get("filtered_trades").is_none());
    }
}
