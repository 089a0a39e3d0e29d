// app.rs - egui front end: draws frames, turns pointer drags into pending input

use std::sync::Arc;

use eframe::egui;
use egui::{Color32, Painter, Pos2, Rect, Vec2};
use life_engine::{Cell, PATTERNS, PendingInputBuffer, RunState, TickScheduler, Viewport};
use tracing::warn;

/// egui reports no pressure for mouse input.
const POINTER_PRESSURE: f32 = 1.0;

pub struct TouchApp {
    scheduler: Arc<TickScheduler>,
    input: Arc<PendingInputBuffer>,
    viewport: Viewport,
    scale: f32,

    pub live_color: Color32,
    pub preview_color: Color32,
    pub background: Color32,
    pub selected_pattern: usize,

    paused_by_focus: bool,
    was_focused: bool,
}

impl TouchApp {
    pub fn new(
        scheduler: Arc<TickScheduler>,
        input: Arc<PendingInputBuffer>,
        viewport: Viewport,
        scale: f32,
    ) -> Self {
        Self {
            scheduler,
            input,
            viewport,
            scale,
            live_color: Color32::BLACK,
            preview_color: Color32::from_rgb(0, 200, 0),
            background: Color32::WHITE,
            selected_pattern: 0,
            paused_by_focus: false,
            was_focused: true,
        }
    }

    /// Losing window focus pauses the game, regaining it resumes, unless the
    /// pause came from the button.
    fn follow_focus(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.focused);
        if focused == self.was_focused {
            return;
        }
        self.was_focused = focused;

        let result = if focused && self.paused_by_focus {
            self.paused_by_focus = false;
            self.scheduler.resume()
        } else if !focused && self.scheduler.state() == RunState::Running {
            self.paused_by_focus = true;
            self.scheduler.pause()
        } else {
            Ok(())
        };
        if let Err(err) = result {
            warn!(%err, focused, "could not follow window focus");
        }
    }

    fn toggle_pause(&mut self) {
        self.paused_by_focus = false;
        let result = match self.scheduler.state() {
            RunState::Running => self.scheduler.pause(),
            RunState::Paused => self.scheduler.resume(),
            RunState::Stopped => Ok(()),
        };
        if let Err(err) = result {
            warn!(%err, "pause toggle ignored");
        }
    }

    fn stamp_selected_pattern(&self) {
        let Some(pattern) = PATTERNS.get(self.selected_pattern) else {
            return;
        };
        let bounds = self.viewport.bounds();
        let (width, height) = pattern.extent();
        let origin = Cell::new((bounds.width - width) / 2, (bounds.height - height) / 2);
        pattern.stamp(&self.input, origin);
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let button_text = match self.scheduler.state() {
                RunState::Running => "⏸ Pause",
                RunState::Paused => "▶ Resume",
                RunState::Stopped => "⏹ Stopped",
            };
            if ui.button(button_text).clicked() {
                self.toggle_pause();
            }

            ui.separator();

            ui.label("Pattern:");
            egui::ComboBox::from_id_source("pattern_selector")
                .selected_text(PATTERNS[self.selected_pattern].name)
                .show_ui(ui, |ui| {
                    for (i, pattern) in PATTERNS.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                    }
                });
            if ui.button("Stamp").clicked() {
                self.stamp_selected_pattern();
            }

            ui.separator();

            ui.label("Live:");
            ui.color_edit_button_srgba(&mut self.live_color);
            ui.label("Touch:");
            ui.color_edit_button_srgba(&mut self.preview_color);
        });

        let frame = self.scheduler.latest_frame();
        let stats = frame.stats;
        let bounds = self.viewport.bounds();
        ui.horizontal(|ui| {
            ui.label(format!("Generation: {}", frame.generation));
            ui.label(format!("Live cells: {}", frame.cells.len()));
            ui.label(format!("+{} / -{}", stats.births, stats.deaths));
            ui.label(format!("Cache hits: {}", stats.cache_hits));
            ui.label(format!("Tick: {:.1} ms", stats.elapsed.as_secs_f64() * 1000.0));
            ui.label(format!("Board: {}x{}", bounds.width, bounds.height));
        });
    }

    fn board(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;

        self.viewport.set(
            (rect.width() / self.scale).round() as i32,
            (rect.height() / self.scale).round() as i32,
        );

        // Pointer in grid space; the half-cell shift puts the rounded cell
        // under the pointer instead of down and to the right of it.
        if response.is_pointer_button_down_on() {
            if let Some(pos) = response.interact_pointer_pos() {
                let grid = (pos - rect.min) / self.scale - Vec2::splat(0.5);
                self.input.add_pending(grid.x, grid.y, POINTER_PRESSURE);
            }
        }
        if ui.input(|i| i.pointer.any_released()) {
            self.input.flush();
        }

        painter.rect_filled(rect, 0.0, self.background);

        let frame = self.scheduler.latest_frame();
        for &cell in frame.cells.iter() {
            self.draw_cell(&painter, rect.min, cell, self.live_color);
        }
        for touch in self.input.peek_touches() {
            let color = self.preview_color.gamma_multiply(touch.pressure.clamp(0.2, 1.0));
            self.draw_cell(&painter, rect.min, touch.cell, color);
        }
    }

    fn draw_cell(&self, painter: &Painter, origin: Pos2, cell: Cell, color: Color32) {
        let min = origin + Vec2::new(cell.x as f32, cell.y as f32) * self.scale;
        painter.rect_filled(Rect::from_min_size(min, Vec2::splat(self.scale)), 0.0, color);
    }
}

impl eframe::App for TouchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.follow_focus(ctx);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.heading("Touch Life");
            self.controls(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.board(ui));
    }
}
