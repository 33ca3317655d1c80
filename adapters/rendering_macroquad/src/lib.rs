#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed preview adapter for Chapelet.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so
//! the crate depends on macroquad without its default `audio` feature.
//!
//! The preview scales the scene's canvas to fit the window and lets the user
//! count beads from the keyboard or mouse. Macroquad has no radial gradients,
//! so bead bodies are drawn as a rim disc with a smaller offset body disc
//! using the gradient's stop colors.
//!
//! Miniquad panics when it cannot create a window or GL context; the backend
//! turns such panics into errors so callers can fall back to another surface.

use std::{
    f32::consts::{FRAC_PI_2, TAU},
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use anyhow::{anyhow, Result};
use chapelet_rendering::{
    panic_message, BeadVisual, Color, FrameInput, GradientSet, Presentation, RenderingBackend,
    Scene, Segment,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_pressed, is_mouse_button_pressed, KeyCode, MouseButton},
    math::Vec2 as MacroquadVec2,
};

const ELLIPSE_STEPS: usize = 32;
const RING_STEPS: usize = 64;
const BODY_INSET: f32 = 0.78;

/// Counting shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountingShortcuts {
    /// `Q` or `Escape` closes the preview.
    pub quit_requested: bool,
    /// `Space`, `Right` or a left click counts one bead.
    pub advance: bool,
    /// `Backspace` or `Left` takes the last bead back.
    pub rewind: bool,
    /// `R` clears the count.
    pub reset: bool,
}

impl CountingShortcuts {
    /// Builds the shortcut snapshot from raw key and mouse observations.
    #[must_use]
    pub fn from_observations<P>(pressed: P, clicked: bool) -> Self
    where
        P: Fn(KeyCode) -> bool,
    {
        Self {
            quit_requested: pressed(KeyCode::Escape) || pressed(KeyCode::Q),
            advance: pressed(KeyCode::Space) || pressed(KeyCode::Right) || clicked,
            rewind: pressed(KeyCode::Backspace) || pressed(KeyCode::Left),
            reset: pressed(KeyCode::R),
        }
    }

    fn poll() -> Self {
        Self::from_observations(is_key_pressed, is_mouse_button_pressed(MouseButton::Left))
    }

    /// Counting actions forwarded to the scene update.
    #[must_use]
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            advance: self.advance,
            rewind: self.rewind,
            reset: self.reset,
        }
    }
}

/// Mapping from canvas units to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneMetrics {
    /// Pixels per canvas unit.
    pub scale: f32,
    /// Screen position of the canvas origin.
    pub offset: Vec2,
}

impl SceneMetrics {
    /// Fits `canvas` inside a `screen_width` by `screen_height` window, centred.
    #[must_use]
    pub fn fit(canvas: Vec2, screen_width: f32, screen_height: f32) -> Self {
        if canvas.x <= f32::EPSILON || canvas.y <= f32::EPSILON {
            return Self {
                scale: 0.0,
                offset: Vec2::ZERO,
            };
        }

        let scale = (screen_width / canvas.x).min(screen_height / canvas.y).max(0.0);
        let used = canvas * scale;
        let offset = (Vec2::new(screen_width, screen_height) - used) * 0.5;
        Self { scale, offset }
    }

    /// Converts a canvas-space point to screen pixels.
    #[must_use]
    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    /// Converts a canvas-space length to screen pixels.
    #[must_use]
    pub fn length(&self, value: f32) -> f32 {
        value * self.scale
    }
}

/// Points of an ellipse outline, closed on itself.
#[must_use]
pub fn ellipse_points(center: Vec2, radii: Vec2, steps: usize) -> Vec<Vec2> {
    let steps = steps.max(3);
    (0..=steps)
        .map(|step| {
            let angle = step as f32 / steps as f32 * TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radii
        })
        .collect()
}

/// Points of a clockwise arc starting at twelve o'clock and covering `fraction` of a turn.
#[must_use]
pub fn ring_arc_points(center: Vec2, radius: f32, fraction: f32, steps: usize) -> Vec<Vec2> {
    let fraction = fraction.clamp(0.0, 1.0);
    if fraction <= 0.0 {
        return Vec::new();
    }

    let steps = ((steps as f32 * fraction).ceil() as usize).max(1);
    (0..=steps)
        .map(|step| {
            let angle = -FRAC_PI_2 + step as f32 / steps as f32 * fraction * TAU;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    window_size: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            window_size: 720,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures the edge length of the square window in pixels.
    #[must_use]
    pub fn with_window_size(mut self, window_size: i32) -> Self {
        self.window_size = window_size.max(64);
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Arc<Scene>) + 'static,
    {
        let Self {
            swap_interval,
            window_size,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size,
            window_height: window_size,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let window = async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);

            loop {
                let shortcuts = CountingShortcuts::poll();
                if shortcuts.quit_requested {
                    log::info!(
                        "closing preview at {}/{} beads",
                        scene.progress.completed_count(),
                        scene.progress.total_beads()
                    );
                    break;
                }

                let input = shortcuts.frame_input();
                update_scene(input, &mut scene);

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::fit(
                    scene.canvas,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_scene(&scene, &metrics);

                macroquad::window::next_frame().await;
            }
        };

        panic::catch_unwind(AssertUnwindSafe(|| {
            macroquad::Window::from_config(config, window);
        }))
        .map_err(|payload| anyhow!("preview window failed: {}", panic_message(&*payload)))
    }
}

fn draw_scene(scene: &Scene, metrics: &SceneMetrics) {
    if metrics.scale <= f32::EPSILON {
        return;
    }

    let accent = scene.theme.accent;

    if let Some(glow) = scene.ambient_glow {
        let outline = ellipse_points(glow.center, glow.radii, ELLIPSE_STEPS * 2);
        draw_polyline(&outline, metrics, glow.width, accent.with_alpha(glow.opacity));
    }

    draw_polyline(
        &scene.cord.points,
        metrics,
        scene.cord.width,
        accent.with_alpha(scene.cord.opacity),
    );

    let pendant = &scene.pendant;
    for segment in pendant.stems.iter().chain(&pendant.tassel) {
        draw_segment(segment, metrics, accent);
    }
    let ring_center = metrics.to_screen(pendant.ring.center);
    macroquad::shapes::draw_circle_lines(
        ring_center.x,
        ring_center.y,
        metrics.length(pendant.ring.radius),
        metrics.length(pendant.ring.width),
        to_macroquad_color(accent.with_alpha(pendant.ring.opacity)),
    );

    draw_bead(&pendant.lead.visual, &scene.gradients, accent, metrics);
    for bead in &scene.beads {
        draw_bead(&bead.visual, &scene.gradients, accent, metrics);
    }

    draw_progress_ring(scene, metrics);
}

fn draw_bead(visual: &BeadVisual, gradients: &GradientSet, accent: Color, metrics: &SceneMetrics) {
    if let Some(halo) = visual.halo {
        fill_circle(visual.center, halo.radius, accent.with_alpha(halo.opacity), metrics);
    }

    fill_ellipse(
        visual.shadow.center,
        visual.shadow.radii,
        Color::black().with_alpha(visual.shadow.opacity),
        metrics,
    );

    let [_, body, rim] = gradients.for_fill(visual.fill).stops;
    fill_circle(
        visual.center,
        visual.radius,
        rim.color.with_alpha(visual.body_opacity),
        metrics,
    );
    let body_center = visual.center.lerp(visual.specular.center, 1.0 - BODY_INSET);
    fill_circle(
        body_center,
        visual.radius * BODY_INSET,
        body.color.with_alpha(visual.body_opacity),
        metrics,
    );

    for highlight in [visual.specular, visual.spark] {
        fill_circle(
            highlight.center,
            highlight.radius,
            Color::white().with_alpha(highlight.opacity),
            metrics,
        );
    }
}

fn draw_progress_ring(scene: &Scene, metrics: &SceneMetrics) {
    let indicator = scene.indicator;
    let center = scene.canvas - Vec2::splat(indicator.radius + 8.0);
    let screen_center = metrics.to_screen(center);
    macroquad::shapes::draw_circle_lines(
        screen_center.x,
        screen_center.y,
        metrics.length(indicator.radius),
        metrics.length(4.0),
        to_macroquad_color(Color::white().with_alpha(0.06)),
    );

    let arc = ring_arc_points(center, indicator.radius, indicator.ratio, RING_STEPS);
    draw_polyline(&arc, metrics, 4.0, scene.theme.accent);
}

fn draw_segment(segment: &Segment, metrics: &SceneMetrics, color: Color) {
    let from = metrics.to_screen(segment.from);
    let to = metrics.to_screen(segment.to);
    macroquad::shapes::draw_line(
        from.x,
        from.y,
        to.x,
        to.y,
        metrics.length(segment.width),
        to_macroquad_color(color.with_alpha(segment.opacity)),
    );
}

fn draw_polyline(points: &[Vec2], metrics: &SceneMetrics, width: f32, color: Color) {
    let thickness = metrics.length(width).max(1.0);
    let color = to_macroquad_color(color);
    for pair in points.windows(2) {
        let from = metrics.to_screen(pair[0]);
        let to = metrics.to_screen(pair[1]);
        macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, thickness, color);
    }
}

fn fill_circle(center: Vec2, radius: f32, color: Color, metrics: &SceneMetrics) {
    let center = metrics.to_screen(center);
    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        metrics.length(radius),
        to_macroquad_color(color),
    );
}

fn fill_ellipse(center: Vec2, radii: Vec2, color: Color, metrics: &SceneMetrics) {
    let color = to_macroquad_color(color);
    let screen_center = metrics.to_screen(center);
    let hub = MacroquadVec2::new(screen_center.x, screen_center.y);
    let outline = ellipse_points(center, radii, ELLIPSE_STEPS);
    for pair in outline.windows(2) {
        let a = metrics.to_screen(pair[0]);
        let b = metrics.to_screen(pair[1]);
        macroquad::shapes::draw_triangle(
            hub,
            MacroquadVec2::new(a.x, a.y),
            MacroquadVec2::new(b.x, b.y),
            color,
        );
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
