//! Trade-level views: KPIs, grouped win rates, size bins, PnL spread, scatter.

use crate::data::{ClusterId, TradeRecord};
use crate::stats::{assign_bin, quantile_bins, BoxSummary, QuantileBin, StatsCalculator};
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline numbers for the filtered trades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_trades: usize,
    pub total_pnl: f64,
    /// Percentage; NaN when no trade is selected.
    pub overall_win_rate: f64,
}

/// Win rate of one group of trades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupWinRate {
    pub key: String,
    pub trades: usize,
    pub win_rate: f64,
}

/// Win rate of one trade-size quantile bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeBinWinRate {
    pub label: String,
    pub bin: QuantileBin,
    pub trades: usize,
    pub win_rate: f64,
}

/// Raw values of one group plus their box-plot summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution<K> {
    pub key: K,
    pub values: Vec<f64>,
    pub summary: BoxSummary,
}

impl<K> Distribution<K> {
    pub fn new(key: K, values: Vec<f64>) -> Self {
        let summary = StatsCalculator::box_summary(&values);
        Self {
            key,
            values,
            summary,
        }
    }
}

/// One trade in the size-vs-PnL scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint<'a> {
    pub account: &'a str,
    pub side: &'a str,
    pub size_usd: f64,
    pub closed_pnl: f64,
    pub cluster: Option<&'a ClusterId>,
    pub win: Option<bool>,
}

/// Mean of `win` × 100 over the trades that have a win flag.
pub fn win_rate(trades: &[&TradeRecord]) -> f64 {
    StatsCalculator::nan_mean(trades.iter().filter_map(|t| t.win_value())) * 100.0
}

pub fn compute_kpis(trades: &[&TradeRecord]) -> Kpis {
    Kpis {
        total_trades: trades.len(),
        total_pnl: StatsCalculator::nan_sum(trades.iter().map(|t| t.closed_pnl)),
        overall_win_rate: win_rate(trades),
    }
}

/// Group by `key` (sorted, missing keys dropped) and take the win rate of each group.
pub fn win_rate_by<'a, F>(trades: &[&'a TradeRecord], key: F) -> Vec<GroupWinRate>
where
    F: Fn(&'a TradeRecord) -> Option<&'a str>,
{
    let mut groups: BTreeMap<&str, Vec<&TradeRecord>> = BTreeMap::new();
    for &trade in trades {
        if let Some(k) = key(trade) {
            groups.entry(k).or_default().push(trade);
        }
    }

    groups
        .into_iter()
        .map(|(k, members)| GroupWinRate {
            key: k.to_string(),
            trades: members.len(),
            win_rate: win_rate(&members),
        })
        .collect()
}

pub fn win_rate_by_sentiment(trades: &[&TradeRecord]) -> Vec<GroupWinRate> {
    win_rate_by(trades, |t| t.classification.as_deref())
}

pub fn win_rate_by_side(trades: &[&TradeRecord]) -> Vec<GroupWinRate> {
    win_rate_by(trades, |t| Some(t.side.as_str()).filter(|s| !s.is_empty()))
}

/// Bucket trades into equal-frequency `size_usd` bins and take each bin's win rate.
pub fn size_bin_win_rates(trades: &[&TradeRecord], bins: usize) -> Vec<SizeBinWinRate> {
    let sizes: Vec<f64> = trades.iter().map(|t| t.size_usd).collect();
    let edges = quantile_bins(&sizes, bins);

    let mut members: Vec<Vec<&TradeRecord>> = vec![Vec::new(); edges.len()];
    for &trade in trades {
        if let Some(idx) = assign_bin(&edges, trade.size_usd) {
            members[idx].push(trade);
        }
    }

    edges
        .into_iter()
        .zip(members)
        .map(|(bin, members)| SizeBinWinRate {
            label: bin.label(),
            bin,
            trades: members.len(),
            win_rate: win_rate(&members),
        })
        .collect()
}

/// `closed_pnl` values per sentiment label, sorted by label.
pub fn pnl_by_sentiment(trades: &[&TradeRecord]) -> Vec<Distribution<String>> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for trade in trades {
        if let Some(label) = trade.classification.as_deref() {
            let values = groups.entry(label).or_default();
            if !trade.closed_pnl.is_nan() {
                values.push(trade.closed_pnl);
            }
        }
    }

    groups
        .into_iter()
        .map(|(label, values)| Distribution::new(label.to_string(), values))
        .collect()
}

/// Points with a finite size and PnL.
pub fn scatter_points<'a>(trades: &[&'a TradeRecord]) -> Vec<ScatterPoint<'a>> {
    trades
        .iter()
        .copied()
        .filter(|t| t.size_usd.is_finite() && t.closed_pnl.is_finite())
        .map(|t| ScatterPoint {
            account: &t.account,
            side: &t.side,
            size_usd: t.size_usd,
            closed_pnl: t.closed_pnl,
            cluster: t.cluster.as_ref(),
            win: t.win,
        })
        .collect()
}
