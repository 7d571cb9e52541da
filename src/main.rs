mod app;
mod color;
mod state;
mod ui;

use anyhow::{Context, anyhow};
use app::SurveyLensApp;
use eframe::egui;
use state::AppState;
use survey_lens::DashboardConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::resolve(std::env::args().skip(1))?;

    let mut state = AppState::new(config);
    state
        .load_startup_dataset()
        .context("cannot start without survey data")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Survey Lens – Brand Survey Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SurveyLensApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
