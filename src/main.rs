use app_multi_opener::config::AppConfig;
use app_multi_opener::ui;

use eframe::egui;

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> eframe::Result<()> {
    let cfg = AppConfig::load();
    init_logging(&cfg.log_level);
    log::info!("Starting App Multi-Opener v{}", env!("CARGO_PKG_VERSION"));

    // Write defaults on first run so there is a file to edit.
    if let Some(path) = AppConfig::config_path() {
        if !path.exists() {
            match cfg.save_to(&path) {
                Ok(()) => log::info!("Wrote default config to {:?}", path),
                Err(e) => log::warn!("Could not write default config: {:#}", e),
            }
        }
    }
    log::debug!("Scan roots: {:?}", cfg.scan_roots);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };
    eframe::run_native(
        "App Multi-Opener",
        native_options,
        Box::new(move |_cc| Ok(Box::new(ui::MultiOpenerApp::new(&cfg)))),
    )
}
