//! Data Processor Module
//! Applies the user's sentiment and cluster selections to the snapshot.

use super::model::{ClusterId, ProfileTable, TradeRecord, TradeTable, TraderProfile};
use super::snapshot::DataSnapshot;
use std::collections::BTreeSet;

/// The two filter selections collected by the presentation layer.
///
/// A missing sentiment label or cluster id is an option of its own: rows
/// without one match only when `include_unlabelled` / `include_unclustered` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub sentiments: BTreeSet<String>,
    pub clusters: BTreeSet<ClusterId>,
    pub include_unlabelled: bool,
    pub include_unclustered: bool,
}

impl FilterSelection {
    /// Select the given labels and clusters; rows missing either never match.
    pub fn new<S, C>(sentiments: S, clusters: C) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator<Item = ClusterId>,
    {
        Self {
            sentiments: sentiments.into_iter().map(Into::into).collect(),
            clusters: clusters.into_iter().collect(),
            include_unlabelled: false,
            include_unclustered: false,
        }
    }

    /// Every available option selected, the dashboard's initial state.
    /// Includes the missing option whenever the data has rows without a value.
    pub fn all(snapshot: &DataSnapshot) -> Self {
        Self {
            include_unlabelled: snapshot.has_unlabelled_trades(),
            include_unclustered: snapshot.has_unclustered_profiles(),
            ..Self::new(snapshot.sentiment_options(), snapshot.cluster_options())
        }
    }

    pub fn matches_sentiment(&self, label: Option<&str>) -> bool {
        match label {
            Some(label) => self.sentiments.contains(label),
            None => self.include_unlabelled,
        }
    }

    pub fn matches_cluster(&self, cluster: Option<&ClusterId>) -> bool {
        match cluster {
            Some(cluster) => self.clusters.contains(cluster),
            None => self.include_unclustered,
        }
    }
}

/// Row filters over the source tables. Results borrow; sources are untouched.
pub struct DataProcessor;

impl DataProcessor {
    /// Trades whose classification is selected. The cluster selection is not applied.
    pub fn filter_trades<'a>(
        trades: &'a TradeTable,
        selection: &FilterSelection,
    ) -> Vec<&'a TradeRecord> {
        trades
            .rows
            .iter()
            .filter(|t| selection.matches_sentiment(t.classification.as_deref()))
            .collect()
    }

    /// Profiles whose cluster is selected.
    pub fn filter_profiles<'a>(
        profiles: &'a ProfileTable,
        selection: &FilterSelection,
    ) -> Vec<&'a TraderProfile> {
        profiles
            .rows
            .iter()
            .filter(|p| selection.matches_cluster(p.cluster.as_ref()))
            .collect()
    }
}
