mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DashboardApp;
use crate::config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env();
    log::info!(
        "Starting dashboard on {} (top {} regions)",
        config.data_path.display(),
        config.top_regions
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dasbor Penjualan E-Commerce",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
}
