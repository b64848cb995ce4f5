//! Transfer Dashboard - Temporary Transfer Analysis (2020 & 2024 elections)
//!
//! Upload the two yearly CSV exports, then browse record counts, generation
//! hour, origin state and per-municipality variation.

mod charts;
mod config;
mod data;
mod export;
mod gui;
mod stats;

use config::{DashboardConfig, CONFIG_FILE_NAME};
use eframe::egui;
use gui::DashboardApp;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?;

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Análise de Transferências - Eleições 2020 e 2024"),
        ..Default::default()
    };

    tracing::info!("starting dashboard");
    eframe::run_native(
        "Transfer Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {}", e))
}
