//! CSV Data Loader Module
//! Reads the trade and profile tables with Polars and builds the shared snapshot.

use super::model::{ClusterId, ProfileTable, TradeRecord, TraderProfile};
use super::snapshot::DataSnapshot;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Columns the trade table must carry.
pub const TRADE_COLUMNS: [&str; 6] = [
    "account",
    "side",
    "size_usd",
    "closed_pnl",
    "win",
    "classification",
];

/// Columns the profile table must carry.
pub const PROFILE_COLUMNS: [&str; 5] =
    ["account", "cluster", "total_trades", "win_rate", "total_pnl"];

const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("data unavailable: {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },
    #[error("schema error in {table} table: {reason}")]
    Schema { table: &'static str, reason: String },
}

impl LoaderError {
    fn schema(table: &'static str, reason: impl Into<String>) -> Self {
        LoaderError::Schema {
            table,
            reason: reason.into(),
        }
    }
}

/// Loads both source tables once and hands out the cached snapshot afterwards.
pub struct DataLoader {
    trades_path: PathBuf,
    profiles_path: PathBuf,
    snapshot: Option<Arc<DataSnapshot>>,
}

impl DataLoader {
    pub fn new(trades_path: impl Into<PathBuf>, profiles_path: impl Into<PathBuf>) -> Self {
        Self {
            trades_path: trades_path.into(),
            profiles_path: profiles_path.into(),
            snapshot: None,
        }
    }

    /// Load and join both tables. Only the first successful call reads the files.
    pub fn load(&mut self) -> Result<Arc<DataSnapshot>, LoaderError> {
        if let Some(snapshot) = &self.snapshot {
            debug!("returning cached snapshot");
            return Ok(Arc::clone(snapshot));
        }

        let trades_df = read_csv(&self.trades_path)?;
        let profiles_df = read_csv(&self.profiles_path)?;
        let snapshot = Arc::new(DataSnapshot::from_frames(&trades_df, &profiles_df)?);

        info!(
            trades = snapshot.trades().len(),
            profiles = snapshot.profiles().len(),
            trades_path = %self.trades_path.display(),
            profiles_path = %self.profiles_path.display(),
            "datasets loaded"
        );

        self.snapshot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Read a CSV file; any I/O or parse failure is reported as unavailable data.
pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
    if !path.is_file() {
        return Err(LoaderError::DataUnavailable {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    LazyCsvReader::new(path)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_ignore_errors(true)
        .finish()
        .and_then(|lazy| lazy.collect())
        .map_err(|e| LoaderError::DataUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Fail with every required column the frame lacks.
pub fn require_columns(
    df: &DataFrame,
    table: &'static str,
    required: &[&str],
) -> Result<(), LoaderError> {
    let present = df.get_column_names();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| !present.iter().any(|c| c.as_str() == *name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoaderError::schema(
            table,
            format!("missing required column(s): {}", missing.join(", ")),
        ))
    }
}

/// Convert the trade frame into records. `cluster` is left empty for the join.
pub fn trades_from_frame(df: &DataFrame) -> Result<Vec<TradeRecord>, LoaderError> {
    const TABLE: &str = "trades";
    require_columns(df, TABLE, &TRADE_COLUMNS)?;

    let accounts = string_values(df, TABLE, "account")?;
    let sides = string_values(df, TABLE, "side")?;
    let sizes = float_values(df, TABLE, "size_usd")?;
    let pnls = float_values(df, TABLE, "closed_pnl")?;
    let wins = bool_values(df, TABLE, "win")?;
    let classifications = string_values(df, TABLE, "classification")?;

    let rows = (0..df.height())
        .map(|i| TradeRecord {
            account: accounts[i].clone().unwrap_or_default(),
            side: sides[i].clone().unwrap_or_default(),
            size_usd: sizes[i],
            closed_pnl: pnls[i],
            win: wins[i],
            classification: classifications[i].clone(),
            cluster: None,
        })
        .collect();

    Ok(rows)
}

/// Convert the profile frame into a table that keeps every numeric column.
pub fn profiles_from_frame(df: &DataFrame) -> Result<ProfileTable, LoaderError> {
    const TABLE: &str = "profiles";
    require_columns(df, TABLE, &PROFILE_COLUMNS)?;

    let accounts = string_values(df, TABLE, "account")?;
    let clusters = string_values(df, TABLE, "cluster")?;
    let total_trades = float_values(df, TABLE, "total_trades")?;
    let win_rates = float_values(df, TABLE, "win_rate")?;
    let total_pnls = float_values(df, TABLE, "total_pnl")?;

    let feature_columns = numeric_columns(df)
        .into_iter()
        .filter(|name| name != "cluster")
        .collect::<Vec<_>>();
    let features = feature_columns
        .iter()
        .map(|name| float_values(df, TABLE, name))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = (0..df.height())
        .map(|i| TraderProfile {
            account: accounts[i].clone().unwrap_or_default(),
            cluster: clusters[i].as_deref().map(ClusterId::new),
            total_trades: total_trades[i],
            win_rate: win_rates[i],
            total_pnl: total_pnls[i],
            features: features.iter().map(|column| column[i]).collect(),
        })
        .collect();

    Ok(ProfileTable {
        feature_columns,
        rows,
    })
}

/// Names of the numeric (and boolean) columns, in file order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| {
            matches!(
                col.dtype(),
                DataType::Float32
                    | DataType::Float64
                    | DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
                    | DataType::Boolean
            )
        })
        .map(|col| col.name().to_string())
        .collect()
}

fn column<'a>(
    df: &'a DataFrame,
    table: &'static str,
    name: &str,
) -> Result<&'a Column, LoaderError> {
    df.column(name)
        .map_err(|_| LoaderError::schema(table, format!("missing required column(s): {name}")))
}

/// Text cells, trimmed; empty and null cells become `None`.
fn string_values(
    df: &DataFrame,
    table: &'static str,
    name: &str,
) -> Result<Vec<Option<String>>, LoaderError> {
    let cast = column(df, table, name)?
        .cast(&DataType::String)
        .map_err(|e| LoaderError::schema(table, format!("column {name} is not text: {e}")))?;
    let values = cast
        .str()
        .map_err(|e| LoaderError::schema(table, format!("column {name} is not text: {e}")))?;

    Ok(values
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

/// Numeric cells; null and unparseable cells become NaN.
fn float_values(df: &DataFrame, table: &'static str, name: &str) -> Result<Vec<f64>, LoaderError> {
    let cast = column(df, table, name)?
        .cast(&DataType::Float64)
        .map_err(|e| LoaderError::schema(table, format!("column {name} is not numeric: {e}")))?;
    let values = cast
        .f64()
        .map_err(|e| LoaderError::schema(table, format!("column {name} is not numeric: {e}")))?;

    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Win flags from 0/1, true/false or their text forms.
fn bool_values(
    df: &DataFrame,
    table: &'static str,
    name: &str,
) -> Result<Vec<Option<bool>>, LoaderError> {
    if column(df, table, name)?.dtype() == &DataType::String {
        return Ok(string_values(df, table, name)?
            .into_iter()
            .map(|v| v.and_then(|s| parse_flag(&s)))
            .collect());
    }

    Ok(float_values(df, table, name)?
        .into_iter()
        .map(|v| if v.is_nan() { None } else { Some(v != 0.0) })
        .collect())
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        other => other.parse::<f64>().ok().filter(|v| !v.is_nan()).map(|v| v != 0.0),
    }
}
