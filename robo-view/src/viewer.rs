//! Interactive robot parade viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the [`Parade`] and a
//! [`MeshCache`] and implements [`eframe::App`] to drive the parade every
//! frame and paint its draw queue with the egui painter.

use eframe::App;
use glam::Vec2;
use rand::Rng;
use robo_core::{
    color::Color,
    config::ParadeConfig,
    error::ConfigError,
    geometry::Fan,
    parade::{Parade, Viewport},
    render::{DrawCommand, DrawQueue, MeshBackend, MeshHandle},
};
use std::collections::HashMap;

/// Side of the square virtual space the parade is laid out in.
const GAME_SIZE: f32 = 1000.0;
/// Color at a fan's dark core (shade `0`).
const CORE_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
/// Fade-out time of a lightning flash, in milliseconds.
const FLASH_MS: f64 = 250.0;

/// Keeps uploaded fans around until the parade disposes them.
///
/// egui rebuilds meshes every frame, so "uploading" only stores the fan.
#[derive(Debug, Default)]
pub struct MeshCache {
    next: u64,
    fans: HashMap<MeshHandle, Fan>,
}

impl MeshCache {
    pub fn get(&self, handle: MeshHandle) -> Option<&Fan> {
        self.fans.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.fans.len()
    }
}

impl MeshBackend for MeshCache {
    fn create_mesh(&mut self, fan: &Fan) -> MeshHandle {
        let handle = MeshHandle(self.next);
        self.next += 1;
        self.fans.insert(handle, fan.clone());
        handle
    }

    fn dispose(&mut self, handle: MeshHandle) {
        if self.fans.remove(&handle).is_none() {
            log::warn!("dispose of unknown mesh {handle:?}");
        }
    }
}

/// Maps the virtual parade space onto a screen rectangle, keeping aspect.
#[derive(Debug, Clone, Copy)]
struct Screen {
    origin: egui::Pos2,
    scale: f32,
}

impl Screen {
    fn fit(rect: egui::Rect) -> Self {
        let scale = (rect.width() / GAME_SIZE).min(rect.height() / GAME_SIZE);
        let size = egui::vec2(GAME_SIZE, GAME_SIZE) * scale;
        Self {
            origin: rect.center() - size / 2.0,
            scale,
        }
    }

    fn to_screen(self, p: Vec2) -> egui::Pos2 {
        self.origin + egui::vec2(p.x, p.y) * self.scale
    }
}

fn color32(c: Color) -> egui::Color32 {
    egui::Rgba::from_rgba_unmultiplied(c.r, c.g, c.b, c.a).into()
}

/// Main application state for the viewer.
///
/// ### Fields
/// - `parade` - Live robots.
/// - `meshes` - Fans uploaded by the parade.
/// - `queue` - Per-frame draw commands.
/// - `cfg` - Settings being edited in the side panel; applied on demand.
/// - `cfg_error` - Last rejected settings, shown under the panel.
/// - `running` - Whether time advances.
/// - `ambiance` - Dark background with lightning instead of flat grey.
/// - `clock` - Parade time in milliseconds; frozen while paused.
/// - `last_light`, `lightning_countdown` - Lightning flash timing (ms).
pub struct Viewer {
    parade: Parade,
    meshes: MeshCache,
    queue: DrawQueue,
    cfg: ParadeConfig,
    cfg_error: Option<ConfigError>,

    running: bool,
    ambiance: bool,
    clock: f64,
    last_light: f64,
    lightning_countdown: f64,
    rng: rand::rngs::ThreadRng,
}

impl Viewer {
    /// Creates a viewer with the default parade.
    ///
    /// ### Returns
    /// An error if the default settings fail validation.
    pub fn new() -> Result<Self, ConfigError> {
        let cfg = ParadeConfig::default();
        let mut meshes = MeshCache::default();
        let parade = Parade::new(cfg.clone(), &mut meshes)?;
        Ok(Self {
            parade,
            meshes,
            queue: DrawQueue::new(),
            cfg,
            cfg_error: None,
            running: true,
            ambiance: true,
            clock: 0.0,
            last_light: f64::NEG_INFINITY,
            lightning_countdown: 0.0,
            rng: rand::rng(),
        })
    }

    fn randomize(&mut self) {
        self.parade.reset(&mut self.meshes);
    }

    fn toggle_endless(&mut self) {
        let endless = !self.parade.endless();
        self.parade.set_endless(endless, &mut self.meshes);
        self.cfg.endless = endless;
    }

    fn apply_config(&mut self) {
        match self.parade.set_config(self.cfg.clone(), &mut self.meshes) {
            Ok(()) => self.cfg_error = None,
            Err(e) => {
                log::warn!("rejected parade settings: {e}");
                self.cfg_error = Some(e);
            }
        }
    }

    /// Background grey level: a decaying flash in ambiance mode, flat
    /// light grey otherwise.
    fn background_level(&mut self, dt_ms: f64) -> f32 {
        if !self.ambiance {
            return 0.9;
        }
        self.lightning_countdown -= dt_ms;
        if self.lightning_countdown < 0.0 {
            self.last_light = self.clock;
            self.lightning_countdown = 10.0 + self.rng.random::<f64>() * 3000.0;
        }
        let since = self.clock - self.last_light;
        ((1.0 - since / FLASH_MS).max(0.0) * 0.2) as f32
    }

    /// Builds the top panel with the parade controls.
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Randomize").clicked() {
                    self.randomize();
                }
                let ambiance = if self.ambiance { "ON" } else { "OFF" };
                if ui.button(format!("Ambiance: {ambiance}")).clicked() {
                    self.ambiance = !self.ambiance;
                }
                let endless = if self.parade.endless() { "ON" } else { "OFF" };
                if ui.button(format!("Endless: {endless}")).clicked() {
                    self.toggle_endless();
                }
                ui.separator();
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }
            });
        });
    }

    /// Builds the bottom status bar.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("t = {:.1} s", self.clock / 1000.0));
                ui.separator();
                ui.label(format!("meshes = {}", self.meshes.len()));
                ui.label(format!("next seed = {}", self.parade.next_index()));
                ui.label(format!("robots = {}", self.parade.len()));
            });
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the right-hand panel for parade settings.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Parade");

                ui.separator();
                ui.label("Grid");
                ui.horizontal(|ui| {
                    ui.label("cols:");
                    ui.add(egui::DragValue::new(&mut self.cfg.cols).range(1..=8));
                    ui.label("rows:");
                    ui.add(egui::DragValue::new(&mut self.cfg.rows).range(1..=8));
                });
                ui.horizontal(|ui| {
                    ui.label("first seed:");
                    ui.add(egui::DragValue::new(&mut self.cfg.first_seed_index));
                });

                ui.separator();
                ui.label("Motion");
                Self::labeled_drag_f32(
                    ui,
                    "advance_scale:",
                    &mut self.cfg.advance_scale,
                    0.0..=0.01,
                    0.00001,
                );
                Self::labeled_drag_f32(
                    ui,
                    "retire_bound:",
                    &mut self.cfg.retire_bound,
                    0.1..=3.0,
                    0.01,
                );
                Self::labeled_drag_f32(ui, "unit_scale:", &mut self.cfg.unit_scale, 0.05..=2.0, 0.01);

                ui.separator();
                ui.label("Lanes");
                Self::labeled_drag_f32(ui, "margin:", &mut self.cfg.lane_margin, 0.0..=0.5, 0.005);
                Self::labeled_drag_f32(ui, "span:", &mut self.cfg.lane_span, 0.0..=1.0, 0.005);

                ui.separator();
                if ui.button("Apply").clicked() {
                    self.apply_config();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = ParadeConfig::default();
                    self.apply_config();
                }
                if let Some(e) = &self.cfg_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, e.to_string());
                }
            });
    }

    /// Paints one frame's sorted draw queue.
    fn paint_queue(&mut self, painter: &egui::Painter, screen: Screen) {
        for cmd in self.queue.drain_sorted() {
            match cmd {
                DrawCommand::Mesh {
                    transform,
                    color,
                    mesh,
                    ..
                } => {
                    let Some(fan) = self.meshes.get(mesh) else {
                        continue;
                    };
                    let mut out = egui::Mesh::default();
                    for v in &fan.verts {
                        let p = screen.to_screen(transform.transform_point2(v.pos));
                        out.colored_vertex(p, color32(CORE_COLOR.lerp(color, v.shade)));
                    }
                    for i in 1..fan.verts.len().saturating_sub(1) as u32 {
                        out.add_triangle(0, i, i + 1);
                    }
                    painter.add(egui::Shape::mesh(out));
                }
                DrawCommand::Circle {
                    pos,
                    radius,
                    spread,
                    color,
                    ..
                } => {
                    let center = screen.to_screen(pos);
                    let r = radius * screen.scale;
                    let halo = Color { a: 0.35, ..color };
                    painter.circle_filled(center, r, color32(halo));
                    painter.circle_filled(center, r * spread, color32(color));
                }
            }
        }
    }

    /// Builds the central panel: advances the parade and paints it.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
                let rect = response.rect;
                let painter = ui.painter_at(rect);

                if response.clicked() {
                    self.randomize();
                }

                let dt_ms = if self.running {
                    f64::from(ctx.input(|i| i.stable_dt)) * 1000.0
                } else {
                    0.0
                };
                self.clock += dt_ms;

                let level = self.background_level(dt_ms);
                painter.rect_filled(rect, 0.0, color32(Color::rgba(level, level, level, 1.0)));

                let screen = Screen::fit(rect);
                let viewport = Viewport::new(0.0, 0.0, GAME_SIZE, GAME_SIZE);
                self.parade.tick(
                    dt_ms as f32,
                    self.clock,
                    &viewport,
                    &mut self.meshes,
                    &mut self.queue,
                );
                self.paint_queue(&painter, screen);

                if self.running {
                    ctx.request_repaint();
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
