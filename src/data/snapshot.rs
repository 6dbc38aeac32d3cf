//! Immutable, joined view of both source tables.

use super::loader::{profiles_from_frame, trades_from_frame, LoaderError};
use super::model::{ClusterId, ProfileTable, TradeRecord, TradeTable};
use polars::prelude::DataFrame;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Both tables, loaded once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DataSnapshot {
    trades: TradeTable,
    profiles: ProfileTable,
}

impl DataSnapshot {
    /// Left-join `trades` with the `account`/`cluster` pairs of `profiles`.
    pub fn new(mut trades: Vec<TradeRecord>, profiles: ProfileTable) -> Self {
        let clusters = cluster_lookup(&profiles);
        for trade in &mut trades {
            trade.cluster = clusters.get(trade.account.as_str()).cloned().flatten();
        }

        Self {
            trades: TradeTable { rows: trades },
            profiles,
        }
    }

    /// Build a snapshot from already-read frames, validating both schemas.
    pub fn from_frames(trades: &DataFrame, profiles: &DataFrame) -> Result<Self, LoaderError> {
        let trades = trades_from_frame(trades)?;
        let profiles = profiles_from_frame(profiles)?;
        Ok(Self::new(trades, profiles))
    }

    pub fn trades(&self) -> &TradeTable {
        &self.trades
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    /// Distinct sentiment labels in order of first appearance.
    pub fn sentiment_options(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.trades
            .rows
            .iter()
            .filter_map(|t| t.classification.as_ref())
            .filter(|c| seen.insert(c.as_str()))
            .cloned()
            .collect()
    }

    /// Distinct profile clusters in order of first appearance.
    pub fn cluster_options(&self) -> Vec<ClusterId> {
        let mut seen = HashSet::new();
        self.profiles
            .rows
            .iter()
            .filter_map(|p| p.cluster.as_ref())
            .filter(|c| seen.insert(*c))
            .cloned()
            .collect()
    }

    /// Whether any trade lacks a sentiment label.
    pub fn has_unlabelled_trades(&self) -> bool {
        self.trades.rows.iter().any(|t| t.classification.is_none())
    }

    /// Whether any profile lacks a cluster id.
    pub fn has_unclustered_profiles(&self) -> bool {
        self.profiles.rows.iter().any(|p| p.cluster.is_none())
    }
}

/// `account -> cluster`, first occurrence wins.
fn cluster_lookup(profiles: &ProfileTable) -> HashMap<&str, Option<ClusterId>> {
    let mut lookup = HashMap::with_capacity(profiles.len());
    let mut duplicates = 0usize;

    for profile in &profiles.rows {
        if lookup.contains_key(profile.account.as_str()) {
            duplicates += 1;
            continue;
        }
        lookup.insert(profile.account.as_str(), profile.cluster.clone());
    }

    if duplicates > 0 {
        warn!(duplicates, "duplicate profile accounts; first occurrence used for the join");
    }
    lookup
}
