//! Trader Dashboard - terminal report, JSON export and PNG charts
//!
//! Loads both datasets once, applies the selected filters and renders every view.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use trader_dashboard::charts::StaticChartRenderer;
use trader_dashboard::report::render_report;
use trader_dashboard::{DashboardConfig, DashboardViews, DataLoader};
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = DashboardConfig::parse();
    config.validate()?;

    let mut loader = DataLoader::new(&config.trades_path, &config.profiles_path);
    let snapshot = loader.load().context("failed to load dashboard data")?;

    if config.list_options {
        println!("Sentiments: {}", snapshot.sentiment_options().join(", "));
        let clusters: Vec<String> = snapshot
            .cluster_options()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("Clusters: {}", clusters.join(", "));
        return Ok(());
    }

    let selection = config.selection(&snapshot);
    let views = DashboardViews::compute(&snapshot, &selection, &config.view_options());
    info!(
        trades = views.kpis.total_trades,
        profiles = views.filtered_profiles.len(),
        "views computed"
    );

    println!("{}", render_report(&views));

    if let Some(path) = &config.json_out {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &views)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "views exported as JSON");
    }

    if let Some(dir) = &config.charts_dir {
        let written = StaticChartRenderer::render_all(&views, dir)
            .with_context(|| format!("failed to render charts into {}", dir.display()))?;
        info!(charts = written.len(), dir = %dir.display(), "charts rendered");
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
