use eframe::egui;
use log::warn;

use spotify_dashboard::app::DashboardApp;
use spotify_dashboard::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env().unwrap_or_else(|e| {
        warn!("Falling back to default configuration: {e:#}");
        DashboardConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Spotify Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
}
