//! Trader Dashboard - trader performance vs market sentiment
//!
//! Loads the merged trade table and the trader cluster table once, then derives
//! every dashboard view for a sentiment/cluster selection.

pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::DashboardConfig;
pub use data::{DataLoader, DataSnapshot, FilterSelection, LoaderError};
pub use pipeline::{DashboardViews, ViewOptions};
