//! Static Chart Renderer
//! Draws the dashboard charts as PNG files with plotters.
//!
//! Charts:
//! 1. Win rate by sentiment, by side and by trade-size bin (bar charts)
//! 2. PnL by sentiment, win rate and total PnL by cluster (box plots)
//! 3. Win rate by cluster and sentiment (annotated heatmap)
//! 4. Trade size vs PnL, coloured by cluster (scatter)

use crate::data::ClusterId;
use crate::pipeline::{DashboardViews, Distribution, WinRateHeatmap};
use plotters::prelude::*;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 500;
const FONT: &str = "sans-serif";

const MISSING_CELL: RGBColor = RGBColor(220, 220, 220);
const NO_CLUSTER: RGBColor = RGBColor(150, 150, 150);

pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

// Heatmap gradient ends (light yellow -> dark blue)
const HEAT_LOW: (f64, f64, f64) = (255.0, 255.0, 217.0);
const HEAT_HIGH: (f64, f64, f64) = (8.0, 29.0, 88.0);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to render {chart}: {reason}")]
    Render { chart: String, reason: String },
    #[error("failed to prepare chart directory: {0}")]
    Io(#[from] std::io::Error),
}

impl ChartError {
    fn render(chart: &str, reason: impl Display) -> Self {
        ChartError::Render {
            chart: chart.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Renders the views of one selection into a directory of PNG files.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every non-empty chart into `dir`. A failing chart is logged and
    /// skipped; only a directory that cannot be created is an error.
    pub fn render_all(views: &DashboardViews<'_>, dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        let mut emit = |name: &str, ready: bool, render: &dyn Fn(&Path) -> Result<(), ChartError>| {
            if !ready {
                info!(chart = name, "nothing to plot; chart skipped");
                return;
            }
            let path = dir.join(format!("{name}.png"));
            match render(&path) {
                Ok(()) => {
                    info!(chart = name, path = %path.display(), "chart written");
                    written.push(path);
                }
                Err(e) => warn!(chart = name, error = %e, "chart skipped"),
            }
        };

        let by_sentiment: Vec<(String, f64)> = views
            .win_rate_by_sentiment
            .iter()
            .map(|g| (g.key.clone(), g.win_rate))
            .collect();
        let by_side: Vec<(String, f64)> = views
            .win_rate_by_side
            .iter()
            .map(|g| (g.key.clone(), g.win_rate))
            .collect();
        let by_size: Vec<(String, f64)> = views
            .win_rate_by_size
            .iter()
            .map(|b| (b.label.clone(), b.win_rate))
            .collect();

        emit("win_rate_by_sentiment", !by_sentiment.is_empty(), &|p: &Path| {
            Self::draw_win_rate_bars(
                p,
                "Win Rate by Market Sentiment (%)",
                "Market Sentiment",
                &by_sentiment,
            )
        });
        emit("win_rate_by_side", !by_side.is_empty(), &|p: &Path| {
            Self::draw_win_rate_bars(p, "Trade Side Performance", "Side", &by_side)
        });
        emit("win_rate_by_size", !by_size.is_empty(), &|p: &Path| {
            Self::draw_win_rate_bars(p, "Trade Size vs Win Rate", "Trade Size Bin", &by_size)
        });
        emit("pnl_by_sentiment", has_values(&views.pnl_by_sentiment), &|p: &Path| {
            Self::draw_boxplots(
                p,
                "PnL Distribution by Market Sentiment",
                "Market Sentiment",
                "Closed PnL (USD)",
                &views.pnl_by_sentiment,
            )
        });
        emit("cluster_win_rate", has_values(&views.cluster_win_rate), &|p: &Path| {
            Self::draw_boxplots(
                p,
                "Win Rate Distribution by Cluster",
                "Cluster",
                "Win Rate",
                &views.cluster_win_rate,
            )
        });
        emit("cluster_total_pnl", has_values(&views.cluster_total_pnl), &|p: &Path| {
            Self::draw_boxplots(
                p,
                "Total PnL Distribution by Cluster",
                "Cluster",
                "Total PnL",
                &views.cluster_total_pnl,
            )
        });
        emit("win_rate_heatmap", !views.heatmap.is_empty(), &|p: &Path| {
            Self::draw_heatmap(p, &views.heatmap)
        });
        emit("size_vs_pnl", !views.scatter.is_empty(), &|p: &Path| {
            Self::draw_scatter(p, views)
        });

        Ok(written)
    }

    /// Bar chart of win-rate percentages. Undefined rates leave an empty slot.
    pub fn draw_win_rate_bars(
        path: &Path,
        title: &str,
        x_desc: &str,
        bars: &[(String, f64)],
    ) -> Result<(), ChartError> {
        let err = |e| ChartError::render(title, e);
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(err)?;

        let labels: Vec<&str> = bars.iter().map(|(label, _)| label.as_str()).collect();
        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d((0..bars.len()).into_segmented(), 0f64..105f64)
            .map_err(err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc("Win Rate (%)")
            .x_labels(bars.len())
            .x_label_formatter(&|seg| segment_label(&labels, seg))
            .draw()
            .map_err(err)?;

        chart
            .draw_series(
                bars.iter()
                    .enumerate()
                    .filter(|(_, (_, rate))| rate.is_finite())
                    .map(|(i, (_, rate))| {
                        let color = PALETTE[i % PALETTE.len()];
                        let mut bar = Rectangle::new(
                            [
                                (SegmentValue::Exact(i), 0.0),
                                (SegmentValue::Exact(i + 1), *rate),
                            ],
                            color.filled(),
                        );
                        bar.set_margin(0, 0, 10, 10);
                        bar
                    }),
            )
            .map_err(err)?;

        root.present().map_err(err)?;
        Ok(())
    }

    /// One box per group, 1.5 × IQR whiskers.
    pub fn draw_boxplots<K: Display>(
        path: &Path,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        groups: &[Distribution<K>],
    ) -> Result<(), ChartError> {
        let err = |e| ChartError::render(title, e);
        let (y_min, y_max) = padded_range(groups.iter().flat_map(|g| g.values.iter().copied()));

        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(err)?;

        let labels: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(
                (0..groups.len()).into_segmented(),
                (y_min as f32)..(y_max as f32),
            )
            .map_err(err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_labels(groups.len())
            .x_label_formatter(&|seg| segment_label(&label_refs, seg))
            .draw()
            .map_err(err)?;

        let quartiles: Vec<(usize, Quartiles)> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.values.is_empty())
            .map(|(i, g)| (i, Quartiles::new(&g.values)))
            .collect();

        chart
            .draw_series(quartiles.iter().map(|(i, q)| {
                Boxplot::new_vertical(SegmentValue::CenterOf(*i), q)
                    .width(40)
                    .whisker_width(0.5)
                    .style(PALETTE[*i % PALETTE.len()])
            }))
            .map_err(err)?;

        root.present().map_err(err)?;
        Ok(())
    }

    /// Annotated cluster × sentiment grid; undefined cells are grey.
    pub fn draw_heatmap(path: &Path, heatmap: &WinRateHeatmap) -> Result<(), ChartError> {
        let title = "Win Rate (%) by Cluster and Sentiment";
        let err = |e| ChartError::render(title, e);
        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(err)?;

        let columns: Vec<&str> = heatmap.sentiments.iter().map(String::as_str).collect();
        let row_labels: Vec<String> = heatmap.clusters.iter().map(ToString::to_string).collect();
        let rows: Vec<&str> = row_labels.iter().map(String::as_str).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(
                (0..columns.len()).into_segmented(),
                (0..rows.len()).into_segmented(),
            )
            .map_err(err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Market Sentiment")
            .y_desc("Cluster")
            .x_labels(columns.len())
            .y_labels(rows.len())
            .x_label_formatter(&|seg| segment_label(&columns, seg))
            .y_label_formatter(&|seg| segment_label(&rows, seg))
            .draw()
            .map_err(err)?;

        let cells: Vec<(usize, usize, Option<f64>)> = heatmap
            .cells
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, v)| (r, c, *v)))
            .collect();

        chart
            .draw_series(cells.iter().map(|&(r, c, value)| {
                let color = value.map(heat_color).unwrap_or(MISSING_CELL);
                Rectangle::new(
                    [
                        (SegmentValue::Exact(c), SegmentValue::Exact(r)),
                        (SegmentValue::Exact(c + 1), SegmentValue::Exact(r + 1)),
                    ],
                    color.filled(),
                )
            }))
            .map_err(err)?;

        chart
            .draw_series(cells.iter().filter_map(|&(r, c, value)| {
                let v = value?;
                let text_color = if v > 50.0 { &WHITE } else { &BLACK };
                Some(Text::new(
                    format!("{v:.1}"),
                    (SegmentValue::CenterOf(c), SegmentValue::CenterOf(r)),
                    (FONT, 16).into_font().color(text_color),
                ))
            }))
            .map_err(err)?;

        root.present().map_err(err)?;
        Ok(())
    }

    /// Trade size against closed PnL, one colour per cluster.
    pub fn draw_scatter(path: &Path, views: &DashboardViews<'_>) -> Result<(), ChartError> {
        let title = "Trade Size vs PnL";
        let err = |e| ChartError::render(title, e);
        let points = &views.scatter;
        let (x_min, x_max) = padded_range(points.iter().map(|p| p.size_usd));
        let (y_min, y_max) = padded_range(points.iter().map(|p| p.closed_pnl));

        let clusters: Vec<&ClusterId> = points
            .iter()
            .filter_map(|p| p.cluster)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let color_of = |cluster: Option<&ClusterId>| {
            cluster
                .and_then(|c| clusters.iter().position(|known| *known == c))
                .map(|i| PALETTE[i % PALETTE.len()])
                .unwrap_or(NO_CLUSTER)
        };

        let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 24))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(err)?;

        chart
            .configure_mesh()
            .x_desc("Trade Size (USD)")
            .y_desc("Closed PnL")
            .draw()
            .map_err(err)?;

        chart
            .draw_series(points.iter().map(|p| {
                Circle::new(
                    (p.size_usd, p.closed_pnl),
                    3,
                    color_of(p.cluster).mix(0.7).filled(),
                )
            }))
            .map_err(err)?;

        root.present().map_err(err)?;
        Ok(())
    }
}

fn has_values<K>(groups: &[Distribution<K>]) -> bool {
    groups.iter().any(|g| !g.values.is_empty())
}

fn segment_label(labels: &[&str], seg: &SegmentValue<usize>) -> String {
    match seg {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i).map(|l| l.to_string()).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

/// Min/max of the finite values with 10% padding; never an empty range.
pub fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return (0.0, 1.0);
    }
    let pad = if max > min { (max - min) * 0.1 } else { min.abs().max(1.0) * 0.1 };
    (min - pad, max + pad)
}

/// Colour of a 0-100 win rate on the light-yellow to dark-blue gradient.
pub fn heat_color(rate: f64) -> RGBColor {
    let t = (rate / 100.0).clamp(0.0, 1.0);
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(
        lerp(HEAT_LOW.0, HEAT_HIGH.0),
        lerp(HEAT_LOW.1, HEAT_HIGH.1),
        lerp(HEAT_LOW.2, HEAT_HIGH.2),
    )
}
