//! Data module - CSV loading, record types and the shared snapshot

mod loader;
mod model;
mod processor;
mod snapshot;

pub use loader::{
    numeric_columns, profiles_from_frame, read_csv, trades_from_frame, DataLoader, LoaderError,
    PROFILE_COLUMNS, TRADE_COLUMNS,
};
pub use model::{ClusterId, ProfileTable, TradeRecord, TradeTable, TraderProfile};
pub use processor::{DataProcessor, FilterSelection};
pub use snapshot::DataSnapshot;
