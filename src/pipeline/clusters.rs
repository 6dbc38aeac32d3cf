//! Cluster-level views: distributions, summary means, top traders, heatmap.

use super::trades::Distribution;
use crate::data::{ClusterId, ProfileTable, TradeTable, TraderProfile};
use crate::stats::StatsCalculator;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Mean of every numeric profile column for one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummaryRow {
    pub cluster: ClusterId,
    pub traders: usize,
    /// Aligned with [`ClusterSummary::columns`].
    pub means: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub columns: Vec<String>,
    pub rows: Vec<ClusterSummaryRow>,
}

impl ClusterSummary {
    pub fn mean(&self, cluster: &ClusterId, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|row| &row.cluster == cluster)
            .and_then(|row| row.means.get(idx).copied())
    }
}

/// Cluster × sentiment win-rate matrix. `None` marks pairs with no observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRateHeatmap {
    pub clusters: Vec<ClusterId>,
    pub sentiments: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl WinRateHeatmap {
    pub fn cell(&self, cluster: &ClusterId, sentiment: &str) -> Option<f64> {
        let row = self.clusters.iter().position(|c| c == cluster)?;
        let col = self.sentiments.iter().position(|s| s == sentiment)?;
        self.cells[row][col]
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

fn group_by_cluster<'a, I>(profiles: I) -> BTreeMap<&'a ClusterId, Vec<&'a TraderProfile>>
where
    I: IntoIterator<Item = &'a TraderProfile>,
{
    let mut groups: BTreeMap<&ClusterId, Vec<&TraderProfile>> = BTreeMap::new();
    for profile in profiles {
        if let Some(cluster) = profile.cluster.as_ref() {
            groups.entry(cluster).or_default().push(profile);
        }
    }
    groups
}

/// Per-cluster values of one profile metric, NaN dropped.
pub fn cluster_distribution<F>(
    profiles: &[&TraderProfile],
    metric: F,
) -> Vec<Distribution<ClusterId>>
where
    F: Fn(&TraderProfile) -> f64,
{
    group_by_cluster(profiles.iter().copied())
        .into_iter()
        .map(|(cluster, members)| {
            let values = members
                .iter()
                .map(|&p| metric(p))
                .filter(|v| !v.is_nan())
                .collect();
            Distribution::new(cluster.clone(), values)
        })
        .collect()
}

pub fn cluster_win_rate_distribution(profiles: &[&TraderProfile]) -> Vec<Distribution<ClusterId>> {
    cluster_distribution(profiles, |p| p.win_rate)
}

pub fn cluster_pnl_distribution(profiles: &[&TraderProfile]) -> Vec<Distribution<ClusterId>> {
    cluster_distribution(profiles, |p| p.total_pnl)
}

/// Mean of each numeric column per cluster.
pub fn cluster_summary(profiles: &[&TraderProfile], columns: &[String]) -> ClusterSummary {
    let rows = group_by_cluster(profiles.iter().copied())
        .into_iter()
        .map(|(cluster, members)| ClusterSummaryRow {
            cluster: cluster.clone(),
            traders: members.len(),
            means: (0..columns.len())
                .map(|j| {
                    StatsCalculator::nan_mean(
                        members
                            .iter()
                            .map(|p| p.features.get(j).copied().unwrap_or(f64::NAN)),
                    )
                })
                .collect(),
        })
        .collect();

    ClusterSummary {
        columns: columns.to_vec(),
        rows,
    }
}

/// The `n` most profitable traders of every cluster, over the whole profile table.
///
/// Clusters come out in sorted order, each sorted by `total_pnl` descending.
/// Equal PnL keeps file order; traders without a PnL are never picked.
pub fn top_traders_per_cluster(profiles: &ProfileTable, n: usize) -> Vec<&TraderProfile> {
    group_by_cluster(&profiles.rows)
        .into_values()
        .flat_map(|members| {
            let mut ranked: Vec<&TraderProfile> = members
                .into_iter()
                .filter(|p| !p.total_pnl.is_nan())
                .collect();
            ranked.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl));
            ranked.truncate(n);
            ranked
        })
        .collect()
}

/// Pivot the full joined trade table: rows = cluster, columns = sentiment,
/// cell = mean `win` × 100. Rows and columns without any observation are dropped.
pub fn win_rate_heatmap(trades: &TradeTable) -> WinRateHeatmap {
    let mut cells: BTreeMap<(&ClusterId, &str), (f64, usize)> = BTreeMap::new();
    for trade in &trades.rows {
        let (Some(cluster), Some(sentiment), Some(win)) = (
            trade.cluster.as_ref(),
            trade.classification.as_deref(),
            trade.win_value(),
        ) else {
            continue;
        };
        let cell = cells.entry((cluster, sentiment)).or_insert((0.0, 0));
        cell.0 += win;
        cell.1 += 1;
    }

    let clusters: BTreeSet<&ClusterId> = cells.keys().map(|(c, _)| *c).collect();
    let sentiments: BTreeSet<&str> = cells.keys().map(|(_, s)| *s).collect();

    let matrix = clusters
        .iter()
        .map(|&cluster| {
            sentiments
                .iter()
                .map(|&sentiment| {
                    cells
                        .get(&(cluster, sentiment))
                        .map(|(sum, count)| sum / *count as f64 * 100.0)
                })
                .collect()
        })
        .collect();

    WinRateHeatmap {
        clusters: clusters.into_iter().cloned().collect(),
        sentiments: sentiments.into_iter().map(str::to_string).collect(),
        cells: matrix,
    }
}
