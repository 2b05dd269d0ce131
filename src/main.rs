//! Origination Dashboard - financial-sector evolution chart and ranking
//!
//! Loads the three sources up front; a load failure ends the session before
//! any window opens.

use anyhow::Context;
use eframe::egui;
use origination_dashboard::config::DashboardConfig;
use origination_dashboard::data::DataLoader;
use origination_dashboard::gui::{DashboardApp, APP_TITLE};
use origination_dashboard::logging::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = DashboardConfig::load().context("loading configuration")?;
    let mut loader = DataLoader::new();
    let table = loader
        .load(&config.sources)
        .inspect_err(|e| tracing::error!(error = %e, "load failed"))
        .context("loading dashboard sources")?;
    tracing::info!(rows = table.len(), "dashboard ready");

    // Configure native options
    let [width, height] = config.window_size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([1000.0, 600.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, table, &config)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
