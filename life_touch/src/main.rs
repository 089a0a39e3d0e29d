// main.rs - Touch-driven Game of Life window
//
// The process owns the engine and the scheduler; the window only borrows
// handles to them and can come and go without losing the simulation.

use std::sync::{Arc, OnceLock};

use anyhow::Context;
use eframe::egui;
use life_engine::{Frame, PendingInputBuffer, SimulationEngine, TickScheduler, Viewport};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod settings;

use app::TouchApp;
use settings::Settings;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_args(std::env::args().skip(1))?;
    info!(scale = settings.cell_scale, tick = ?settings.scheduler.min_tick, "starting touch life");

    let input = Arc::new(PendingInputBuffer::new());
    let viewport = Viewport::default();
    let engine = SimulationEngine::new(Arc::clone(&input), viewport.clone());

    // Filled in once the window exists; ticks before that have nobody to wake.
    let repaint: Arc<OnceLock<egui::Context>> = Arc::default();
    let repaint_on_tick = Arc::clone(&repaint);
    let scheduler = Arc::new(
        TickScheduler::new(engine, settings.scheduler.clone()).with_presenter(move |_: &Frame| {
            if let Some(ctx) = repaint_on_tick.get() {
                ctx.request_repaint();
            }
        }),
    );
    scheduler.start().context("starting the tick loop")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 950.0]),
        ..Default::default()
    };

    let app_scheduler = Arc::clone(&scheduler);
    let scale = settings.cell_scale;
    let result = eframe::run_native(
        "Touch Life",
        options,
        Box::new(move |cc| {
            let _ = repaint.set(cc.egui_ctx.clone());
            Box::new(TouchApp::new(app_scheduler, input, viewport, scale))
        }),
    );

    scheduler.stop();
    scheduler.join();
    info!("tick loop joined, exiting");

    result.map_err(|err| anyhow::anyhow!("window closed with an error: {err}"))
}
