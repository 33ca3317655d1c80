#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Chapelet adapters.
//!
//! The [`engine`] module turns a [`LayoutInput`] into a [`Scene`], the
//! [`visuals`] module decides how each bead looks, and backends implement
//! [`RenderingBackend`] to put scenes on a surface.

pub mod engine;
pub mod visuals;

use std::{any::Any, sync::Arc};

use anyhow::Result as AnyResult;
use chapelet_core::{
    BeadSpec, CurveConfig, CurveConfigError, LayoutInput, ProgressState, DEFAULT_ACCENT_COLOR,
};
use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

pub use engine::{EngineStats, LayoutEngine};
pub use visuals::{
    BeadFill, BeadVisual, GradientSet, GradientStop, Halo, Highlight, ProgressIndicator,
    ProgressRenderer, ProgressRing, RadialGradient, Shadow,
};

/// Channel-wise factor applied to the accent color to derive its dark shade.
pub const DARKEN_FACTOR: f32 = 0.38;

/// Dark shade used when the accent color cannot be parsed.
pub const DARK_FALLBACK: &str = "#0a0f20";

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: f32::from(red) / 255.0,
            green: f32::from(green) / 255.0,
            blue: f32::from(blue) / 255.0,
            alpha: 1.0,
        }
    }

    /// Opaque white.
    #[must_use]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Opaque black.
    #[must_use]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Parses a `#RRGGBB` hex string into an opaque color.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(hex.to_owned()))?;
        if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigits(hex.to_owned()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::InvalidDigits(hex.to_owned()))
        };

        Ok(Self::from_rgb_u8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Byte RGB channels, rounded to the nearest integer.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        ]
    }

    /// Returns the color with each RGB byte scaled by `factor` and rounded.
    #[must_use]
    pub fn darken(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let [red, green, blue] = self.to_rgb_u8();
        let scale = |channel: u8| (f32::from(channel) * factor).round() as u8;

        Self {
            alpha: self.alpha,
            ..Self::from_rgb_u8(scale(red), scale(green), scale(blue))
        }
    }

    /// Returns the color with its alpha channel replaced.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Formats the color as a CSS `rgb(r,g,b)` function.
    #[must_use]
    pub fn to_css_rgb(self) -> String {
        let [red, green, blue] = self.to_rgb_u8();
        format!("rgb({red},{green},{blue})")
    }

    /// Formats the color as a lowercase `#rrggbb` hex string.
    #[must_use]
    pub fn to_hex(self) -> String {
        let [red, green, blue] = self.to_rgb_u8();
        format!("#{red:02x}{green:02x}{blue:02x}")
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

/// Darkens a `#RRGGBB` color and formats it as CSS `rgb(r,g,b)`.
///
/// Unreadable input yields [`DARK_FALLBACK`] so no invalid channel ever reaches
/// a renderer.
#[must_use]
pub fn darken_hex(hex: &str, factor: f32) -> String {
    match Color::from_hex(hex) {
        Ok(color) => color.darken(factor).to_css_rgb(),
        Err(_) => DARK_FALLBACK.to_owned(),
    }
}

/// Accent color paired with the darker shade used for gradient edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorTheme {
    /// Base accent color.
    pub accent: Color,
    /// Accent darkened by [`DARKEN_FACTOR`].
    pub shade: Color,
}

impl ColorTheme {
    /// Derives a theme from an accent color.
    #[must_use]
    pub fn new(accent: Color) -> Self {
        Self {
            accent,
            shade: accent.darken(DARKEN_FACTOR),
        }
    }

    /// Derives a theme from a `#RRGGBB` string, falling back on unreadable input.
    ///
    /// The fallback keeps the default accent and uses [`DARK_FALLBACK`] for the
    /// shade.
    #[must_use]
    pub fn from_hex(hex: &str) -> Self {
        match Color::from_hex(hex) {
            Ok(accent) => Self::new(accent),
            Err(error) => {
                log::warn!("{error}; using default accent {DEFAULT_ACCENT_COLOR}");
                Self {
                    accent: default_accent(),
                    shade: dark_fallback(),
                }
            }
        }
    }
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self::new(default_accent())
    }
}

fn default_accent() -> Color {
    Color::from_rgb_u8(0x63, 0x66, 0xf1)
}

fn dark_fallback() -> Color {
    Color::from_rgb_u8(0x0a, 0x0f, 0x20)
}

/// Errors raised when parsing a hex color.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The string did not start with `#`.
    #[error("color '{0}' must start with '#'")]
    MissingHash(String),
    /// The string did not hold exactly six hex digits.
    #[error("color '{0}' must hold exactly six hex digits")]
    InvalidDigits(String),
}

/// Dimensions and palette shared by every variant of the chaplet view.
///
/// All lengths are expressed in canvas units. Every field has a default, so a
/// configuration file only needs to list what it overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeadStyle {
    /// Width of the drawing canvas.
    pub canvas_width: f32,
    /// Height of the drawing canvas.
    pub canvas_height: f32,
    /// Horizontal radius of the bead loop.
    pub loop_radius_x: f32,
    /// Vertical radius of the bead loop.
    pub loop_radius_y: f32,
    /// Vertical center of the lead bead.
    pub lead_center_y: f32,
    /// Radius of the lead bead.
    pub lead_radius: f32,
    /// Gap between the bottom of the lead bead and the loop junction.
    pub junction_gap: f32,
    /// Radius of an ordinary bead.
    pub bead_radius: f32,
    /// Radius of a marker bead.
    pub marker_radius: f32,
    /// Extra radius of the halo drawn behind completed beads.
    pub halo_offset: f32,
    /// Opacity of the halo drawn behind completed beads.
    pub halo_opacity: f32,
    /// Number of straight segments used to draw the cord.
    pub cord_segments: u32,
    /// Opacity of the cord.
    pub cord_opacity: f32,
    /// Stroke width of the cord and pendant stems.
    pub cord_width: f32,
    /// Middle stop of the idle bead gradient.
    pub idle_mid: Color,
    /// Outer stop of the idle bead gradient.
    pub idle_edge: Color,
    /// Middle stop of the marker bead gradient.
    pub marker_mid: Color,
    /// Outer stop of the marker bead gradient.
    pub marker_edge: Color,
    /// Draw radius of the circular progress ring.
    pub ring_radius: f32,
    /// Stroke width of the circular progress ring.
    pub ring_width: f32,
}

impl Default for BeadStyle {
    fn default() -> Self {
        Self {
            canvas_width: 280.0,
            canvas_height: 350.0,
            loop_radius_x: 50.0,
            loop_radius_y: 110.0,
            lead_center_y: 62.0,
            lead_radius: 12.0,
            junction_gap: 2.0,
            bead_radius: 7.0,
            marker_radius: 9.5,
            halo_offset: 5.0,
            halo_opacity: 0.18,
            cord_segments: 100,
            cord_opacity: 0.35,
            cord_width: 1.8,
            idle_mid: Color::from_rgb_u8(0x18, 0x24, 0x3e),
            idle_edge: Color::from_rgb_u8(0x06, 0x0c, 0x18),
            marker_mid: Color::from_rgb_u8(0x7b, 0x8f, 0xae),
            marker_edge: Color::from_rgb_u8(0x1a, 0x22, 0x36),
            ring_radius: 22.0,
            ring_width: 4.0,
        }
    }
}

impl BeadStyle {
    /// Checks that every length is positive and every opacity lies in `0..=1`.
    pub fn validate(&self) -> Result<(), StyleError> {
        for (field, value) in [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("loop_radius_x", self.loop_radius_x),
            ("loop_radius_y", self.loop_radius_y),
            ("lead_radius", self.lead_radius),
            ("bead_radius", self.bead_radius),
            ("marker_radius", self.marker_radius),
            ("cord_width", self.cord_width),
            ("ring_radius", self.ring_radius),
            ("ring_width", self.ring_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StyleError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("halo_opacity", self.halo_opacity),
            ("cord_opacity", self.cord_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(StyleError::OpacityOutOfRange { field, value });
            }
        }
        if self.junction_gap < 0.0 || self.halo_offset < 0.0 {
            return Err(StyleError::NegativeOffset);
        }
        if self.cord_segments == 0 {
            return Err(StyleError::ZeroCordSegments);
        }
        Ok(())
    }

    /// Vertical coordinate of the junction between the loop and the pendant.
    #[must_use]
    pub fn junction_y(&self) -> f32 {
        self.lead_center_y + self.lead_offset()
    }

    /// Distance from the junction up to the center of the lead bead.
    #[must_use]
    pub fn lead_offset(&self) -> f32 {
        self.lead_radius + self.junction_gap
    }

    /// Curve the beads are threaded on, centred horizontally on the canvas.
    pub fn curve_config(&self) -> Result<CurveConfig, StyleError> {
        let pivot_y = self.junction_y();
        let config = CurveConfig::new(
            self.canvas_width * 0.5,
            pivot_y + self.loop_radius_y,
            pivot_y,
            self.loop_radius_x,
            self.loop_radius_y,
        )?;
        Ok(config)
    }
}

/// Errors raised when validating a [`BeadStyle`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum StyleError {
    /// Lengths must be strictly positive.
    #[error("style field `{field}` must be positive (received {value})")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Provided value.
        value: f32,
    },
    /// Opacities must lie in `0.0..=1.0`.
    #[error("style field `{field}` must lie between 0 and 1 (received {value})")]
    OpacityOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Provided value.
        value: f32,
    },
    /// Gaps and offsets must not be negative.
    #[error("junction_gap and halo_offset must not be negative")]
    NegativeOffset,
    /// The cord needs at least one segment.
    #[error("cord_segments must be positive")]
    ZeroCordSegments,
    /// The derived curve was rejected.
    #[error(transparent)]
    Curve(#[from] CurveConfigError),
}

/// Straight stroke between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Start of the stroke.
    pub from: Vec2,
    /// End of the stroke.
    pub to: Vec2,
    /// Stroke width.
    pub width: f32,
    /// Stroke opacity.
    pub opacity: f32,
}

impl Segment {
    /// Creates a new stroke descriptor.
    #[must_use]
    pub const fn new(from: Vec2, to: Vec2, width: f32, opacity: f32) -> Self {
        Self {
            from,
            to,
            width,
            opacity,
        }
    }
}

/// Closed cord the beads are threaded on.
#[derive(Clone, Debug, PartialEq)]
pub struct CordPresentation {
    /// Polyline sampled along the teardrop curve; first and last points coincide.
    pub points: Vec<Vec2>,
    /// Stroke width.
    pub width: f32,
    /// Stroke opacity; the stroke uses the theme accent.
    pub opacity: f32,
}

/// Outlined ring the chaplet hangs from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingPresentation {
    /// Center of the ring.
    pub center: Vec2,
    /// Radius of the ring.
    pub radius: f32,
    /// Stroke width.
    pub width: f32,
    /// Stroke opacity.
    pub opacity: f32,
}

/// Pendant assembly above the loop: lead bead, stems, hanging ring and tassel.
#[derive(Clone, Debug, PartialEq)]
pub struct PendantPresentation {
    /// Lead bead placed at the head of the chaplet.
    pub lead: BeadPresentation,
    /// Stems joining the lead bead to the loop and to the ring.
    pub stems: Vec<Segment>,
    /// Hanging ring.
    pub ring: RingPresentation,
    /// Tassel strands fanning out above the ring.
    pub tassel: Vec<Segment>,
}

/// Faint glow drawn around the loop once counting has started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientGlow {
    /// Center of the glow ellipse.
    pub center: Vec2,
    /// Horizontal and vertical radii of the glow ellipse.
    pub radii: Vec2,
    /// Stroke width of the glow ellipse.
    pub width: f32,
    /// Opacity of the glow.
    pub opacity: f32,
}

/// Bead together with the visual derived for it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeadPresentation {
    /// Placement and completion of the bead.
    pub spec: BeadSpec,
    /// Resolved look of the bead.
    pub visual: BeadVisual,
}

/// Scene description combining the cord, pendant, beads and progress indicator.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Width and height of the drawing canvas.
    pub canvas: Vec2,
    /// Accent color and shade used throughout the scene.
    pub theme: ColorTheme,
    /// Radial gradients referenced by bead fills.
    pub gradients: GradientSet,
    /// Cord the beads are threaded on.
    pub cord: CordPresentation,
    /// Pendant assembly at the head of the chaplet.
    pub pendant: PendantPresentation,
    /// Counting beads in sequence order.
    pub beads: Vec<BeadPresentation>,
    /// Glow shown once at least one bead is counted.
    pub ambient_glow: Option<AmbientGlow>,
    /// Clamped counting progress.
    pub progress: ProgressState,
    /// Aggregate progress indicator.
    pub indicator: ProgressIndicator,
}

impl Scene {
    /// Returns the beads that divide the chaplet into sections.
    pub fn markers(&self) -> impl Iterator<Item = &BeadPresentation> {
        self.beads.iter().filter(|bead| bead.spec.is_marker())
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window or document.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed, shared with the engine that composed it.
    pub scene: Arc<Scene>,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T, S>(window_title: T, clear_color: Color, scene: S) -> Self
    where
        T: Into<String>,
        S: Into<Arc<Scene>>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene: scene.into(),
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether one more bead was counted on this frame.
    pub advance: bool,
    /// Whether the last counted bead was taken back on this frame.
    pub rewind: bool,
    /// Whether the count was cleared on this frame.
    pub reset: bool,
}

impl FrameInput {
    /// Applies the frame's counting actions to `progress`.
    ///
    /// A reset wins over any other action recorded on the same frame.
    #[must_use]
    pub fn apply(self, progress: ProgressState) -> ProgressState {
        if self.reset {
            return progress.reset();
        }
        let mut progress = progress;
        if self.advance {
            progress = progress.advanced();
        }
        if self.rewind {
            progress = progress.rewound();
        }
        progress
    }

    /// Returns `true` when no counting action was recorded.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !(self.advance || self.rewind || self.reset)
    }
}

/// Rebuilds the [`LayoutInput`] for a new count, keeping the bead total and accent.
#[must_use]
pub fn input_for_progress(input: &LayoutInput, progress: ProgressState) -> LayoutInput {
    LayoutInput {
        total: i64::from(progress.total_beads()),
        completed_count: i64::from(progress.completed_count()),
        accent_color: input.accent_color.clone(),
    }
}

/// Extracts readable text from the payload of a caught panic.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Rendering backend capable of presenting Chapelet scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives per-frame input captured by
    /// the adapter and may swap in another scene before it is rendered. Headless
    /// backends run a single frame with idle input.
    ///
    /// Failures of the drawing surface, including panics raised while it is
    /// created, are returned as errors.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Arc<Scene>) + 'static;
}
