use std::path::PathBuf;
use std::sync::Arc;

use trader_dashboard::data::{ClusterId, DataLoader, DataSnapshot, FilterSelection};
use trader_dashboard::pipeline::{DashboardViews, ViewOptions};

fn snapshot() -> Arc<DataSnapshot> {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    DataLoader::new(fixtures.join("trades.csv"), fixtures.join("profiles.csv"))
        .load()
        .unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_full_selection_kpis() {
    let snapshot = snapshot();
    let views = DashboardViews::compute(
        &snapshot,
        &FilterSelection::all(&snapshot),
        &ViewOptions::default(),
    );

    assert_eq!(views.kpis.total_trades, 10);
    assert!(close(views.kpis.total_pnl, 149.0));
    // one trade without a win flag is left out of the average
    assert!(close(views.kpis.overall_win_rate, 600.0 / 9.0));
}

#[test]
fn test_grouped_win_rates() {
    let snapshot = snapshot();
    let views = DashboardViews::compute(
        &snapshot,
        &FilterSelection::all(&snapshot),
        &ViewOptions::default(),
    );

    let sentiments: Vec<(&str, f64)> = views
        .win_rate_by_sentiment
        .iter()
        .map(|g| (g.key.as_str(), g.win_rate))
        .collect();
    assert_eq!(sentiments.len(), 4);
    assert_eq!(sentiments[0], ("Extreme Greed", 100.0));
    assert_eq!(sentiments[1], ("Fear", 50.0));
    assert_eq!(sentiments[2].0, "Greed");
    assert!(close(sentiments[2].1, 200.0 / 3.0));
    assert_eq!(sentiments[3], ("Neutral", 100.0));

    let sides: Vec<(&str, f64)> = views
        .win_rate_by_side
        .iter()
        .map(|g| (g.key.as_str(), g.win_rate))
        .collect();
    assert_eq!(sides, vec![("BUY", 100.0), ("SELL", 25.0)]);
}

#[test]
fn test_size_bins_are_equal_frequency() {
    let snapshot = snapshot();
    let views = DashboardViews::compute(
        &snapshot,
        &FilterSelection::all(&snapshot),
        &ViewOptions::default(),
    );

    let bins = &views.win_rate_by_size;
    assert_eq!(bins.len(), 4);
    assert_eq!(bins[0].label, "[100.00, 300.00]");
    assert_eq!(bins[1].label, "(300.00, 500.00]");
    assert_eq!(
        bins.iter().map(|b| b.trades).collect::<Vec<_>>(),
        vec![3, 2, 2, 2]
    );
    assert!(close(bins[0].win_rate, 200.0 / 3.0));
    assert_eq!(bins[1].win_rate, 50.0);
    assert_eq!(bins[3].win_rate, 100.0);
}

#[test]
fn test_sentiment_filter_leaves_cluster_views_alone() {
    let snapshot = snapshot();
    let selection = FilterSelection::new(["Fear"], snapshot.cluster_options());
    let views = DashboardViews::compute(&snapshot, &selection, &ViewOptions::default());

    assert_eq!(views.kpis.total_trades, 4);
    assert_eq!(views.kpis.overall_win_rate, 50.0);
    assert_eq!(views.filtered_profiles.len(), 7);
    assert_eq!(views.cluster_summary.rows.len(), 4);
}

#[test]
fn test_cluster_filter_leaves_trade_views_alone() {
    let snapshot = snapshot();
    let selection = FilterSelection::new(
        snapshot.sentiment_options(),
        [ClusterId::from(0), ClusterId::from(10)],
    );
    let views = DashboardViews::compute(&snapshot, &selection, &ViewOptions::default());

    assert_eq!(views.kpis.total_trades, 10);
    assert_eq!(views.filtered_profiles.len(), 5);

    let summary = &views.cluster_summary;
    assert_eq!(summary.rows.len(), 2);
    let zero = ClusterId::from(0);
    let ten = ClusterId::from(10);
    assert!(close(summary.mean(&zero, "total_pnl").unwrap(), 160.0 / 3.0));
    assert!(close(summary.mean(&zero, "avg_size").unwrap(), 505.0 / 3.0));
    assert!(close(summary.mean(&ten, "win_rate").unwrap(), 60.0));
    assert_eq!(summary.mean(&ClusterId::from(1), "win_rate"), None);

    // top-N is computed on every profile regardless of the cluster filter
    let accounts: Vec<&str> = views.top_traders.iter().map(|p| p.account.as_str()).collect();
    assert_eq!(accounts, vec!["G", "A", "B", "C", "D", "E", "F"]);
}

#[test]
fn test_heatmap_over_unfiltered_trades() {
    let snapshot = snapshot();
    let selection = FilterSelection::new(["Neutral"], [ClusterId::from(2)]);
    let views = DashboardViews::compute(&snapshot, &selection, &ViewOptions::default());
    let heatmap = &views.heatmap;

    assert_eq!(
        heatmap.clusters,
        vec![
            ClusterId::from(0),
            ClusterId::from(1),
            ClusterId::from(2),
            ClusterId::from(10)
        ]
    );
    assert_eq!(
        heatmap.sentiments,
        vec!["Extreme Greed", "Fear", "Greed", "Neutral"]
    );
    assert_eq!(heatmap.cell(&ClusterId::from(0), "Fear"), Some(50.0));
    assert_eq!(heatmap.cell(&ClusterId::from(1), "Fear"), Some(0.0));
    assert_eq!(heatmap.cell(&ClusterId::from(10), "Greed"), Some(100.0));
    assert_eq!(heatmap.cell(&ClusterId::from(0), "Neutral"), None);
}

#[test]
fn test_empty_selection_yields_empty_views() {
    let snapshot = snapshot();
    let views = DashboardViews::compute(
        &snapshot,
        &FilterSelection::default(),
        &ViewOptions::default(),
    );

    assert_eq!(views.kpis.total_trades, 0);
    assert_eq!(views.kpis.total_pnl, 0.0);
    assert!(views.kpis.overall_win_rate.is_nan());
    assert!(views.win_rate_by_size.is_empty());
    assert!(views.cluster_summary.rows.is_empty());
    assert!(views.scatter.is_empty());
    assert!(!views.heatmap.is_empty());
}

#[test]
fn test_views_export_as_json() {
    let snapshot = snapshot();
    let views = DashboardViews::compute(
        &snapshot,
        &FilterSelection::all(&snapshot),
        &ViewOptions {
            top_n: 1,
            ..ViewOptions::default()
        },
    );
    let json = serde_json::to_value(&views).unwrap();

    assert_eq!(json["kpis"]["total_trades"], 10);
    assert_eq!(json["top_traders"].as_array().unwrap().len(), 4);
    assert_eq!(json["top_traders"][0]["account"], "G");
    assert_eq!(json["top_traders"][0]["cluster"], "0");
    assert_eq!(json["trade_preview"].as_array().unwrap().len(), 10);
}

fn unlabelled_snapshot() -> Arc<DataSnapshot> {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    DataLoader::new(
        fixtures.join("trades_unlabelled.csv"),
        fixtures.join("profiles_unclustered.csv"),
    )
    .load()
    .unwrap()
}

#[test]
fn test_full_selection_counts_rows_with_missing_values() {
    let snapshot = unlabelled_snapshot();
    let views = DashboardViews::compute(
        &snapshot,
        &FilterSelection::all(&snapshot),
        &ViewOptions::default(),
    );

    assert_eq!(views.kpis.total_trades, 3);
    assert!(close(views.kpis.total_pnl, 60.0));
    assert!(close(views.kpis.overall_win_rate, 200.0 / 3.0));
    assert_eq!(views.trade_preview.len(), 3);
    assert_eq!(views.scatter.len(), 3);
    assert_eq!(
        views.win_rate_by_size.iter().map(|b| b.trades).sum::<usize>(),
        3
    );

    // grouped views still drop the missing key
    let labels: Vec<&str> = views
        .win_rate_by_sentiment
        .iter()
        .map(|g| g.key.as_str())
        .collect();
    assert_eq!(labels, vec!["Fear", "Greed"]);
    let buy = &views.win_rate_by_side[0];
    assert_eq!((buy.key.as_str(), buy.trades, buy.win_rate), ("BUY", 2, 100.0));

    assert_eq!(views.filtered_profiles.len(), 3);
    assert_eq!(views.profile_preview.len(), 3);
    assert_eq!(views.cluster_summary.rows.len(), 2);
}

#[test]
fn test_explicit_labels_exclude_rows_with_missing_values() {
    let snapshot = unlabelled_snapshot();
    let selection = FilterSelection::new(snapshot.sentiment_options(), snapshot.cluster_options());
    let views = DashboardViews::compute(&snapshot, &selection, &ViewOptions::default());

    assert_eq!(views.kpis.total_trades, 2);
    assert!(close(views.kpis.total_pnl, 70.0));
    assert_eq!(views.filtered_profiles.len(), 2);
}
