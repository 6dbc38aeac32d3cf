//! Record types for the two source tables.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Cluster identifier as it appears in the profile file.
///
/// Ids that parse as numbers are ordered numerically, so `2` sorts before `10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterId(String);

impl ClusterId {
    /// Trims the id; integral float spellings such as `2.0` become `2`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = id.trim();
        match id.parse::<f64>() {
            Ok(v) if id.contains('.') && v.fract() == 0.0 && v.abs() < 1e15 => {
                Self((v as i64).to_string())
            }
            _ => Self(id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| !v.is_nan())
    }
}

impl Ord for ClusterId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a
                .partial_cmp(&b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ClusterId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for ClusterId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for ClusterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One executed trade, joined with its account's cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub account: String,
    pub side: String,
    pub size_usd: f64,
    pub closed_pnl: f64,
    pub win: Option<bool>,
    pub classification: Option<String>,
    pub cluster: Option<ClusterId>,
}

impl TradeRecord {
    /// Build an unjoined trade; `cluster` is filled in by the snapshot join.
    pub fn new(
        account: impl Into<String>,
        side: impl Into<String>,
        size_usd: f64,
        closed_pnl: f64,
        win: Option<bool>,
        classification: Option<&str>,
    ) -> Self {
        Self {
            account: account.into(),
            side: side.into(),
            size_usd,
            closed_pnl,
            win,
            classification: classification.map(str::to_string),
            cluster: None,
        }
    }

    /// `win` as 0/1, or `None` when the cell was empty.
    pub fn win_value(&self) -> Option<f64> {
        self.win.map(|w| if w { 1.0 } else { 0.0 })
    }
}

/// Per-account statistics produced by the upstream clustering job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraderProfile {
    pub account: String,
    pub cluster: Option<ClusterId>,
    pub total_trades: f64,
    pub win_rate: f64,
    pub total_pnl: f64,
    /// Every numeric column of the profile file, aligned with
    /// [`ProfileTable::feature_columns`].
    #[serde(skip)]
    pub features: Vec<f64>,
}

impl TraderProfile {
    pub fn new(
        account: impl Into<String>,
        cluster: Option<ClusterId>,
        total_trades: f64,
        win_rate: f64,
        total_pnl: f64,
    ) -> Self {
        Self {
            account: account.into(),
            cluster,
            total_trades,
            win_rate,
            total_pnl,
            features: vec![total_trades, win_rate, total_pnl],
        }
    }
}

/// Joined trade table.
#[derive(Debug, Clone, Default)]
pub struct TradeTable {
    pub rows: Vec<TradeRecord>,
}

impl TradeTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Profile table plus the names of its numeric columns.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    pub feature_columns: Vec<String>,
    pub rows: Vec<TraderProfile>,
}

impl ProfileTable {
    /// Columns of profiles built with [`TraderProfile::new`].
    pub const CORE_FEATURES: [&'static str; 3] = ["total_trades", "win_rate", "total_pnl"];

    pub fn new(rows: Vec<TraderProfile>) -> Self {
        Self {
            feature_columns: Self::CORE_FEATURES.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_ids_sort_numerically() {
        let mut ids: Vec<ClusterId> = ["10", "2", "0", "x", "1.5"]
            .iter()
            .map(|s| ClusterId::from(*s))
            .collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(|c| c.as_str()).collect();
        assert_eq!(sorted, vec!["0", "1.5", "2", "10", "x"]);
    }

    #[test]
    fn test_cluster_id_trims_whitespace() {
        assert_eq!(ClusterId::new(" 3 "), ClusterId::from(3));
    }

    #[test]
    fn test_integral_float_ids_match_integer_ids() {
        assert_eq!(ClusterId::new("2.0"), ClusterId::from(2));
        assert_eq!(ClusterId::new("0.0").as_str(), "0");
        assert_eq!(ClusterId::new("1.5").as_str(), "1.5");
        assert_eq!(ClusterId::new("x.0").as_str(), "x.0");
    }

    #[test]
    fn test_win_value() {
        let mut trade = TradeRecord::new("A", "BUY", 10.0, 5.0, Some(true), Some("Fear"));
        assert_eq!(trade.win_value(), Some(1.0));
        trade.win = Some(false);
        assert_eq!(trade.win_value(), Some(0.0));
        trade.win = None;
        assert_eq!(trade.win_value(), None);
    }
}
