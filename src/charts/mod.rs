//! Charts module - Static PNG chart rendering

mod renderer;

pub use renderer::{heat_color, padded_range, ChartError, StaticChartRenderer, PALETTE};
