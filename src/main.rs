mod app;
mod state;
mod ui;

use app::RustyMintApp;
use eframe::egui;
use rusty_mint::config::ViewerConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let (config, config_error) = match ViewerConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => {
            log::error!("Ignoring configuration: {e:#}");
            (ViewerConfig::default(), Some(format!("Configuration ignored: {e:#}")))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Mint – Results Viewer",
        options,
        Box::new(|_cc| {
            let mut app = RustyMintApp::new(config);
            app.state.config_warning = config_error;
            Ok(Box::new(app))
        }),
    )
}
