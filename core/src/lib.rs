#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Chapelet layout engine.
//!
//! This crate defines the value types that flow between the pure systems and
//! the adapters. Adapters describe what should be shown through a
//! [`LayoutInput`], the curve and placement systems turn it into ordered
//! [`BeadSpec`] values, and the rendering adapter derives visuals from them.
//! Every type here is a plain value: nothing is mutated in place and nothing
//! is shared between engine instances.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of beads on a canonical chaplet.
pub const CANONICAL_BEAD_COUNT: u32 = 33;

/// Marker indices used when the chaplet holds exactly [`CANONICAL_BEAD_COUNT`] beads.
pub const CANONICAL_MARKER_INDICES: [u32; 2] = [10, 21];

/// Largest bead count a chaplet may hold; larger totals are clamped to it.
pub const MAX_BEAD_COUNT: u32 = 10_000;

/// Largest bead count that is laid out without section markers.
pub const UNMARKED_MAX_TOTAL: u32 = 9;

/// Accent color applied when none (or an unreadable one) is supplied.
pub const DEFAULT_ACCENT_COLOR: &str = "#6366f1";

/// Geometry of the closed teardrop curve that beads are threaded on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    center_x: f32,
    center_y: f32,
    pivot_y: f32,
    radius_x: f32,
    radius_y: f32,
}

impl CurveConfig {
    /// Creates a new curve configuration.
    ///
    /// `pivot_y` is the junction where the loop meets the pendant and
    /// `center_y` the middle of the loop. Returns an error when a radius is not
    /// strictly positive or any coordinate is not finite.
    pub fn new(
        center_x: f32,
        center_y: f32,
        pivot_y: f32,
        radius_x: f32,
        radius_y: f32,
    ) -> Result<Self, CurveConfigError> {
        for (field, value) in [
            ("center_x", center_x),
            ("center_y", center_y),
            ("pivot_y", pivot_y),
            ("radius_x", radius_x),
            ("radius_y", radius_y),
        ] {
            if !value.is_finite() {
                return Err(CurveConfigError::NonFinite { field, value });
            }
        }
        if radius_x <= 0.0 {
            return Err(CurveConfigError::NonPositiveRadius {
                axis: Axis::X,
                radius: radius_x,
            });
        }
        if radius_y <= 0.0 {
            return Err(CurveConfigError::NonPositiveRadius {
                axis: Axis::Y,
                radius: radius_y,
            });
        }

        Ok(Self {
            center_x,
            center_y,
            pivot_y,
            radius_x,
            radius_y,
        })
    }

    /// Horizontal center of the loop.
    #[must_use]
    pub const fn center_x(&self) -> f32 {
        self.center_x
    }

    /// Vertical center of the loop.
    #[must_use]
    pub const fn center_y(&self) -> f32 {
        self.center_y
    }

    /// Vertical coordinate of the junction between the loop and the pendant.
    #[must_use]
    pub const fn pivot_y(&self) -> f32 {
        self.pivot_y
    }

    /// Base horizontal radius before teardrop modulation.
    #[must_use]
    pub const fn radius_x(&self) -> f32 {
        self.radius_x
    }

    /// Base vertical radius before teardrop modulation.
    #[must_use]
    pub const fn radius_y(&self) -> f32 {
        self.radius_y
    }

    /// Junction point where the loop closes.
    #[must_use]
    pub fn junction(&self) -> Vec2 {
        Vec2::new(self.center_x, self.pivot_y)
    }
}

/// Axis of a curve radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

/// Errors raised when constructing a [`CurveConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CurveConfigError {
    /// Radii must be strictly positive.
    #[error("curve radius along {axis:?} must be positive (received {radius})")]
    NonPositiveRadius {
        /// Axis of the offending radius.
        axis: Axis,
        /// Provided radius.
        radius: f32,
    },
    /// Coordinates and radii must be finite numbers.
    #[error("curve field `{field}` must be finite (received {value})")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// Provided value.
        value: f32,
    },
}

/// Role a bead plays within the chaplet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeadRole {
    /// Regular counting bead.
    Ordinary,
    /// Section divider bead.
    Marker,
    /// Pendant head bead sitting at the junction, outside the counted sequence.
    Lead,
}

/// Placed bead with its completion state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeadSpec {
    /// Zero-based position of the bead in the counting sequence.
    pub index: u32,
    /// Center of the bead in curve space.
    pub position: Vec2,
    /// Role the bead plays within the chaplet.
    pub role: BeadRole,
    /// Whether the bead has been counted.
    pub is_completed: bool,
}

impl BeadSpec {
    /// Creates a new bead descriptor.
    #[must_use]
    pub const fn new(index: u32, position: Vec2, role: BeadRole, is_completed: bool) -> Self {
        Self {
            index,
            position,
            role,
            is_completed,
        }
    }

    /// Returns `true` when the bead divides two sections.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.role == BeadRole::Marker
    }

    /// Returns `true` for the pendant head bead.
    #[must_use]
    pub fn is_lead(&self) -> bool {
        self.role == BeadRole::Lead
    }
}

/// Counting progress through a chaplet.
///
/// The total is capped at [`MAX_BEAD_COUNT`] and the completed count is clamped
/// into `0..=total_beads` on construction, so a value of this type never
/// describes nonexistent beads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressState {
    total_beads: u32,
    completed_count: u32,
}

impl ProgressState {
    /// Creates a new progress state, capping the total at [`MAX_BEAD_COUNT`] and
    /// clamping the completed count to it.
    #[must_use]
    pub fn new(total_beads: u32, completed_count: u32) -> Self {
        let total_beads = total_beads.min(MAX_BEAD_COUNT);
        Self {
            total_beads,
            completed_count: completed_count.min(total_beads),
        }
    }

    /// Creates a progress state from unchecked signed counts.
    ///
    /// Non-positive totals collapse to an empty chaplet, oversized totals are
    /// capped at [`MAX_BEAD_COUNT`] and the completed count is clamped into
    /// `0..=total`.
    #[must_use]
    pub fn from_raw(total_beads: i64, completed_count: i64) -> Self {
        let total = clamp_to_u32(total_beads);
        let completed = clamp_to_u32(completed_count);
        Self::new(total, completed)
    }

    /// Total number of beads in the counted sequence.
    #[must_use]
    pub const fn total_beads(&self) -> u32 {
        self.total_beads
    }

    /// Number of beads counted so far.
    #[must_use]
    pub const fn completed_count(&self) -> u32 {
        self.completed_count
    }

    /// Fraction of the chaplet that has been counted, `0.0` for an empty chaplet.
    #[must_use]
    pub fn progress_ratio(&self) -> f32 {
        if self.total_beads == 0 {
            return 0.0;
        }
        self.completed_count as f32 / self.total_beads as f32
    }

    /// Progress rounded to a whole percentage.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        (self.progress_ratio() * 100.0).round() as u32
    }

    /// Whether every bead has been counted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total_beads > 0 && self.completed_count == self.total_beads
    }

    /// Returns the state after counting one more bead, saturating at the total.
    #[must_use]
    pub fn advanced(self) -> Self {
        Self::new(self.total_beads, self.completed_count.saturating_add(1))
    }

    /// Returns the state after un-counting one bead, saturating at zero.
    #[must_use]
    pub fn rewound(self) -> Self {
        Self::new(self.total_beads, self.completed_count.saturating_sub(1))
    }

    /// Returns the state with no beads counted.
    #[must_use]
    pub const fn reset(self) -> Self {
        Self {
            total_beads: self.total_beads,
            completed_count: 0,
        }
    }

    /// Maps the current ratio onto a chaplet with a different bead count.
    #[must_use]
    pub fn rescaled(&self, total_beads: u32) -> Self {
        let completed = (self.progress_ratio() * total_beads as f32).round() as u32;
        Self::new(total_beads, completed)
    }
}

fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Request describing the chaplet an adapter wants to display.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutInput {
    /// Requested bead count; non-positive values yield an empty chaplet and
    /// values above [`MAX_BEAD_COUNT`] are capped.
    pub total: i64,
    /// Beads counted so far; clamped into `0..=total`.
    pub completed_count: i64,
    /// Accent color as `#RRGGBB`.
    pub accent_color: String,
}

impl LayoutInput {
    /// Creates a new layout request.
    #[must_use]
    pub fn new<T>(total: i64, completed_count: i64, accent_color: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            total,
            completed_count,
            accent_color: accent_color.into(),
        }
    }

    /// Clamped progress described by the request.
    #[must_use]
    pub fn progress(&self) -> ProgressState {
        ProgressState::from_raw(self.total, self.completed_count)
    }
}

impl Default for LayoutInput {
    fn default() -> Self {
        Self::new(i64::from(CANONICAL_BEAD_COUNT), 0, DEFAULT_ACCENT_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn curve_config_rejects_non_positive_radii() {
        let error = CurveConfig::new(140.0, 186.0, 76.0, 0.0, 110.0)
            .expect_err("zero radius must be rejected");

        assert!(matches!(
            error,
            CurveConfigError::NonPositiveRadius { axis: Axis::X, .. }
        ));
        assert!(CurveConfig::new(140.0, 186.0, 76.0, 50.0, -1.0).is_err());
    }

    #[test]
    fn curve_config_rejects_non_finite_fields() {
        let error = CurveConfig::new(f32::NAN, 186.0, 76.0, 50.0, 110.0)
            .expect_err("NaN center must be rejected");

        assert!(matches!(
            error,
            CurveConfigError::NonFinite {
                field: "center_x",
                ..
            }
        ));
    }

    #[test]
    fn progress_ratio_is_zero_for_empty_chaplet() {
        let progress = ProgressState::new(0, 5);

        assert_eq!(progress.completed_count(), 0);
        assert_eq!(progress.progress_ratio(), 0.0);
        assert_eq!(progress.percentage(), 0);
        assert!(!progress.is_complete());
    }

    #[test]
    fn progress_ratio_divides_completed_by_total() {
        let progress = ProgressState::new(33, 15);

        assert_relative_eq!(progress.progress_ratio(), 15.0 / 33.0);
        assert_eq!(progress.percentage(), 45);
    }

    #[test]
    fn from_raw_clamps_negative_and_overflowing_counts() {
        assert_eq!(ProgressState::from_raw(33, -4), ProgressState::new(33, 0));
        assert_eq!(ProgressState::from_raw(33, 99).completed_count(), 33);
        assert_eq!(ProgressState::from_raw(-3, 2).total_beads(), 0);
        assert_eq!(ProgressState::from_raw(-3, 2).completed_count(), 0);
    }

    #[test]
    fn oversized_totals_are_capped() {
        let progress = LayoutInput::new(i64::MAX, i64::MAX, DEFAULT_ACCENT_COLOR).progress();

        assert_eq!(progress.total_beads(), MAX_BEAD_COUNT);
        assert!(progress.is_complete());
        assert_eq!(
            ProgressState::new(u32::MAX, 12).total_beads(),
            MAX_BEAD_COUNT
        );
        assert_eq!(
            ProgressState::new(33, 0).rescaled(u32::MAX).total_beads(),
            MAX_BEAD_COUNT
        );
    }

    #[test]
    fn counting_steps_saturate_at_bounds() {
        let start = ProgressState::new(3, 0);

        assert_eq!(start.rewound(), start);
        let full = start.advanced().advanced().advanced().advanced();
        assert_eq!(full.completed_count(), 3);
        assert!(full.is_complete());
        assert_eq!(full.reset().completed_count(), 0);
    }

    #[test]
    fn rescaled_preserves_ratio_on_preview_chaplet() {
        let session = ProgressState::new(99, 33);
        let preview = session.rescaled(20);

        assert_eq!(preview.total_beads(), 20);
        assert_eq!(preview.completed_count(), 7);
        assert_eq!(ProgressState::new(0, 0).rescaled(20).completed_count(), 0);
    }

    #[test]
    fn bead_spec_role_helpers() {
        let marker = BeadSpec::new(10, Vec2::ZERO, BeadRole::Marker, false);
        let lead = BeadSpec::new(0, Vec2::ZERO, BeadRole::Lead, false);

        assert!(marker.is_marker());
        assert!(!marker.is_lead());
        assert!(lead.is_lead());
    }

    #[test]
    fn bead_role_serialises_as_snake_case() {
        let json = serde_json::to_string(&BeadRole::Ordinary).expect("role serialises");

        assert_eq!(json, "\"ordinary\"");
    }

    #[test]
    fn default_layout_input_uses_canonical_chaplet() {
        let input = LayoutInput::default();

        assert_eq!(input.total, 33);
        assert_eq!(input.accent_color, DEFAULT_ACCENT_COLOR);
        assert_eq!(input.progress(), ProgressState::new(33, 0));
    }
}
