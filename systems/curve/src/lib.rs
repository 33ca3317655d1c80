#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure curve system that samples the teardrop loop beads are threaded on.
//!
//! The loop is narrow at the top, where it meets the pendant, and widest and
//! lowest halfway round. Coordinates follow screen conventions: `y` grows
//! downward from the junction.

use std::f32::consts::TAU;

use chapelet_core::CurveConfig;
use glam::{Vec2, Vec3};

const WIDTH_SWELL: f32 = 0.3;
const HEIGHT_BASE: f32 = 0.8;
const HEIGHT_SWELL: f32 = 0.4;

/// Samples points on the teardrop curve described by a [`CurveConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveSampler {
    config: CurveConfig,
}

impl CurveSampler {
    /// Creates a sampler for the provided curve.
    #[must_use]
    pub const fn new(config: CurveConfig) -> Self {
        Self { config }
    }

    /// Curve configuration backing the sampler.
    #[must_use]
    pub const fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Returns the point at normalised parameter `t`.
    ///
    /// `t` is expected in `0.0..1.0`; values outside that range are not
    /// wrapped. `t = 0.0` and `t = 1.0` both land on the junction.
    #[must_use]
    pub fn sample(&self, t: f32) -> Vec2 {
        teardrop_point(&self.config, t)
    }

    /// Returns the point at `t` lifted onto the `z = 0` plane.
    #[must_use]
    pub fn sample_3d(&self, t: f32) -> Vec3 {
        self.sample(t).extend(0.0)
    }

    /// Samples a closed polyline with `segments` equal parameter steps.
    ///
    /// The result holds `segments + 1` points and repeats the junction at both
    /// ends. Zero segments yields just the junction.
    #[must_use]
    pub fn polyline(&self, segments: u32) -> Vec<Vec2> {
        if segments == 0 {
            return vec![self.sample(0.0)];
        }

        (0..=segments)
            .map(|step| self.sample(step as f32 / segments as f32))
            .collect()
    }
}

/// Evaluates the teardrop curve at normalised parameter `t`.
#[must_use]
pub fn teardrop_point(config: &CurveConfig, t: f32) -> Vec2 {
    let angle = t * TAU;
    let half_sine = (angle * 0.5).sin();
    let radius_x = config.radius_x() * (1.0 + WIDTH_SWELL * half_sine);
    let radius_y = config.radius_y() * (HEIGHT_BASE + HEIGHT_SWELL * half_sine);

    Vec2::new(
        config.center_x() + angle.sin() * radius_x,
        config.pivot_y() + (1.0 - angle.cos()) * radius_y,
    )
}
