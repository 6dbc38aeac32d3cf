//! Terminal rendering of the dashboard views.

use crate::data::{ClusterId, TradeRecord, TraderProfile};
use crate::pipeline::{DashboardViews, Distribution, GroupWinRate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Row, Table};
use std::fmt::Write;

/// Formatting for undefined values.
pub const MISSING: &str = "n/a";

pub fn fmt_value(value: f64) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{value:.2}")
    }
}

pub fn fmt_percent(value: f64) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{value:.2}%")
    }
}

fn new_table(header: impl Into<Row>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn win_rate_table(key_header: &str, rows: &[GroupWinRate]) -> Table {
    let mut table = new_table(vec![key_header, "Trades", "Win Rate (%)"]);
    for row in rows {
        table.add_row(vec![
            row.key.clone(),
            row.trades.to_string(),
            fmt_value(row.win_rate),
        ]);
    }
    table
}

fn distribution_table<K: ToString>(key_header: &str, rows: &[Distribution<K>]) -> Table {
    let mut table = new_table(vec![
        key_header, "Count", "Min", "Q1", "Median", "Q3", "Max", "Mean",
    ]);
    for row in rows {
        let s = &row.summary;
        table.add_row(vec![
            row.key.to_string(),
            s.count.to_string(),
            fmt_value(s.min),
            fmt_value(s.q1),
            fmt_value(s.median),
            fmt_value(s.q3),
            fmt_value(s.max),
            fmt_value(s.mean),
        ]);
    }
    table
}

fn cluster_label(cluster: Option<&ClusterId>) -> String {
    cluster.map(ToString::to_string).unwrap_or_else(|| MISSING.to_string())
}

fn trade_table(rows: &[&TradeRecord]) -> Table {
    let mut table = new_table(vec![
        "Account",
        "Side",
        "Size (USD)",
        "Closed PnL",
        "Win",
        "Sentiment",
        "Cluster",
    ]);
    for trade in rows {
        table.add_row(vec![
            trade.account.clone(),
            trade.side.clone(),
            fmt_value(trade.size_usd),
            fmt_value(trade.closed_pnl),
            trade
                .win
                .map(|w| u8::from(w).to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            trade
                .classification
                .clone()
                .unwrap_or_else(|| MISSING.to_string()),
            cluster_label(trade.cluster.as_ref()),
        ]);
    }
    table
}

fn profile_table(rows: &[&TraderProfile]) -> Table {
    let mut table = new_table(vec![
        "Account",
        "Cluster",
        "Total Trades",
        "Win Rate",
        "Total PnL",
    ]);
    for profile in rows {
        table.add_row(vec![
            profile.account.clone(),
            cluster_label(profile.cluster.as_ref()),
            fmt_value(profile.total_trades),
            fmt_value(profile.win_rate),
            fmt_value(profile.total_pnl),
        ]);
    }
    table
}

/// Render every view as a sequence of titled tables.
pub fn render_report(views: &DashboardViews<'_>) -> String {
    let mut out = String::new();
    let kpis = &views.kpis;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Trader Performance & Market Sentiment Dashboard");
    let _ = writeln!(
        out,
        "Total Trades: {}   Total PnL (USD): ${:.0}   Overall Win Rate: {}\n",
        kpis.total_trades,
        kpis.total_pnl,
        fmt_percent(kpis.overall_win_rate)
    );

    let mut section = |title: &str, table: Table| {
        let _ = writeln!(out, "== {title} ==\n{table}\n");
    };

    section("Merged Trades (preview)", trade_table(&views.trade_preview));
    section("Trader Clusters (preview)", profile_table(&views.profile_preview));
    section(
        "PnL Distribution by Market Sentiment",
        distribution_table("Sentiment", &views.pnl_by_sentiment),
    );
    section(
        "Win Rate by Market Sentiment",
        win_rate_table("Sentiment", &views.win_rate_by_sentiment),
    );
    section(
        "Trade Side Performance",
        win_rate_table("Side", &views.win_rate_by_side),
    );

    let mut size_table = new_table(vec!["Trade Size Bin", "Trades", "Win Rate (%)"]);
    for bin in &views.win_rate_by_size {
        size_table.add_row(vec![
            bin.label.clone(),
            bin.trades.to_string(),
            fmt_value(bin.win_rate),
        ]);
    }
    section("Trade Size vs Win Rate", size_table);

    section(
        "Win Rate Distribution by Cluster",
        distribution_table("Cluster", &views.cluster_win_rate),
    );
    section(
        "Total PnL Distribution by Cluster",
        distribution_table("Cluster", &views.cluster_total_pnl),
    );

    let summary = &views.cluster_summary;
    let mut header = vec!["Cluster".to_string(), "Traders".to_string()];
    header.extend(summary.columns.iter().cloned());
    let mut summary_table = new_table(header);
    for row in &summary.rows {
        let mut cells = vec![row.cluster.to_string(), row.traders.to_string()];
        cells.extend(row.means.iter().map(|m| fmt_value(*m)));
        summary_table.add_row(cells);
    }
    section("Cluster Summary Metrics", summary_table);

    section(
        "Top Profitable Traders per Cluster",
        profile_table(&views.top_traders),
    );

    let heatmap = &views.heatmap;
    let mut header = vec!["Cluster".to_string()];
    header.extend(heatmap.sentiments.iter().cloned());
    let mut heatmap_table = new_table(header);
    for (cluster, cells) in heatmap.clusters.iter().zip(&heatmap.cells) {
        let mut row = vec![cluster.to_string()];
        row.extend(cells.iter().map(|cell| match cell {
            Some(v) => format!("{v:.1}"),
            None => MISSING.to_string(),
        }));
        heatmap_table.add_row(row);
    }
    section("Win Rate Heatmap: Cluster vs Sentiment (%)", heatmap_table);

    let _ = writeln!(
        out,
        "Trade Size vs PnL: {} plottable trades",
        views.scatter.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataSnapshot, FilterSelection, ProfileTable};
    use crate::pipeline::ViewOptions;

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
    fn test_formatting() {
        assert_eq!(fmt_value(f64::NAN), "n/a");
        assert_eq!(fmt_value(1.234), "1.23");
        assert_eq!(fmt_percent(50.0), "50.00%");
    }

    #[test]
    fn test_report_lists_every_section() {
        let snapshot = snapshot();
        let views = DashboardViews::compute(
            &snapshot,
            &FilterSelection::all(&snapshot),
            &ViewOptions::default(),
        );
        let report = render_report(&views);
        assert!(report.contains("Total Trades: 2"));
        assert!(report.contains("Overall Win Rate: 50.00%"));
        assert!(report.contains("Cluster Summary Metrics"));
        assert!(report.contains("Top Profitable Traders per Cluster"));
        assert!(report.contains("Greed"));
        assert!(report.contains("Trade Size vs PnL: 2 plottable trades"));
    }

    #[test]
    fn test_report_of_empty_selection_shows_undefined_win_rate() {
        let snapshot = snapshot();
        let views = DashboardViews::compute(
            &snapshot,
            &FilterSelection::default(),
            &ViewOptions::default(),
        );
        let report = render_report(&views);
        assert!(report.contains("Overall Win Rate: n/a"));
    }
}
