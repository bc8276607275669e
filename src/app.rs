use std::path::PathBuf;
use std::time::{Duration, Instant};

use dark_light::Mode;
use eframe::egui;

use crate::axis;
use crate::controller::{InteractionController, ScrollRequest};
use crate::events::EventLog;
use crate::monitor::{self, SharedMonitor};
use crate::themes;
use crate::widgets::{ConnectionBadge, LogInspector, Timeline};

/// Top-level viewer: owns the loaded log, the interaction state, and a
/// handle to the shared monitor state written by the recorder thread.
pub struct LinklineApp {
    log_path: PathBuf,
    log: EventLog,
    load_error: Option<String>,
    controller: InteractionController,
    monitor: SharedMonitor,
    show_inspector: bool,
}

impl LinklineApp {
    pub fn new(log_path: PathBuf, monitor: SharedMonitor) -> Self {
        let mut app = Self {
            log_path,
            log: EventLog::default(),
            load_error: None,
            controller: InteractionController::new(Instant::now()),
            monitor,
            show_inspector: false,
        };
        app.reload();
        app
    }

    /// Refresh the in-memory log from disk. An unreadable file leaves an
    /// empty timeline; the error text surfaces in the inspector only.
    fn reload(&mut self) {
        match EventLog::load(&self.log_path) {
            Ok(log) => {
                self.log = log;
                self.load_error = None;
            }
            Err(err) => {
                self.log = EventLog::default();
                self.load_error = Some(err.to_string());
            }
        }
    }

    pub fn run(self, name: &str) -> eframe::Result {
        let mut native_options = eframe::NativeOptions::default();
        native_options.persist_window = true;

        eframe::run_native(
            name,
            native_options,
            Box::new(move |cc| {
                let ctx = cc.egui_ctx.clone();
                ctrlc::set_handler(move || ctx.send_viewport_cmd(egui::ViewportCommand::Close))
                    .expect("failed to set exit signal handler");

                cc.egui_ctx
                    .set_style_of(egui::Theme::Light, themes::console_light());
                cc.egui_ctx
                    .set_style_of(egui::Theme::Dark, themes::console_dark());
                let theme = match dark_light::detect() {
                    Ok(Mode::Light) => egui::ThemePreference::Light,
                    Ok(Mode::Dark) => egui::ThemePreference::Dark,
                    Ok(Mode::Unspecified) | Err(_) => egui::ThemePreference::Dark,
                };
                cc.egui_ctx.set_theme(theme);

                Ok(Box::new(self))
            }),
        )
    }
}

impl eframe::App for LinklineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.controller.should_reload(Instant::now()) {
            self.reload();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let viewport_w = ui.available_width();

            {
                let monitor = self.monitor.read();
                let signals = monitor.signals.snapshot();
                ui.add(ConnectionBadge::new(
                    &monitor.status,
                    monitor.since_ms,
                    monitor::now_ms(),
                    &signals,
                ));
            }

            ui.horizontal(|ui| {
                // Explicit user actions reload ahead of the periodic clock.
                if ui.button("-").on_hover_text("zoom out").clicked() {
                    self.controller.zoom_out(viewport_w);
                    self.reload();
                }
                if ui.button("+").on_hover_text("zoom in").clicked() {
                    self.controller.zoom_in(viewport_w);
                    self.reload();
                }
                if ui.button("Raw log").clicked() {
                    self.show_inspector = !self.show_inspector;
                    if self.show_inspector {
                        self.reload();
                    }
                }
                ui.weak(format!("{} events", self.log.len()));
            });

            let band_w = axis::domain(&self.log)
                .map(|(start, end)| axis::content_width(start, end, self.controller.scale()))
                .unwrap_or(0.0);
            let trailing = viewport_w * 0.5;
            let total_w = (band_w + trailing).max(viewport_w);

            let mut scroll = egui::ScrollArea::horizontal();
            if let Some(request) = self.controller.take_scroll_request() {
                let target = match request {
                    ScrollRequest::End => total_w,
                    ScrollRequest::Offset(x) => x,
                };
                scroll = scroll.horizontal_scroll_offset(target.max(0.0));
            }

            let timeline_height = ui.available_height().max(120.0);
            let output = scroll.show(ui, |ui| {
                ui.add(
                    Timeline::new(&self.log, &mut self.controller)
                        .height(timeline_height)
                        .min_width(viewport_w)
                        .trailing_pad(trailing),
                )
            });

            // Pinch/ctrl-wheel zoom over the band; buttons share the same
            // clamped rescale path.
            let zoom = ui.input(|i| i.zoom_delta());
            if output.inner.hovered() && (zoom - 1.0).abs() > f32::EPSILON {
                self.controller.rescale(zoom, viewport_w);
            }

            self.controller
                .sync_scroll(output.state.offset.x, viewport_w, band_w);
        });

        let mut open = self.show_inspector;
        if open {
            egui::Window::new("Raw log")
                .open(&mut open)
                .default_width(420.0)
                .show(ctx, |ui| {
                    LogInspector::new(&self.log, self.load_error.as_deref()).show(ui);
                });
        }
        self.show_inspector = open;

        // The badge clock ticks once a second; periodic reloads ride the
        // same wakeups.
        ctx.request_repaint_after(Duration::from_secs(1));
    }
}
