//! Per-bead styling and the aggregate progress indicator.

use std::f32::consts::TAU;

use chapelet_core::{BeadSpec, CurveConfig, ProgressState};
use glam::Vec2;

use crate::{AmbientGlow, BeadStyle, Color, ColorTheme};

const GLOW_PADDING: Vec2 = Vec2::new(18.0, 12.0);
const GLOW_WIDTH: f32 = 34.0;
const GLOW_OPACITY: f32 = 0.05;

/// Gradient a bead body is filled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeadFill {
    /// Accent gradient used for counted beads and the lead bead.
    Active,
    /// Low-key neutral gradient for beads still to be counted.
    Idle,
    /// Silver gradient reserved for section markers.
    Marker,
}

impl BeadFill {
    /// Selects the fill for `bead`.
    ///
    /// Markers keep their silver fill whether or not they have been counted;
    /// only ordinary beads switch to the accent gradient on completion.
    #[must_use]
    pub fn select(bead: &BeadSpec) -> Self {
        if bead.is_lead() {
            Self::Active
        } else if bead.is_marker() {
            Self::Marker
        } else if bead.is_completed {
            Self::Active
        } else {
            Self::Idle
        }
    }
}

/// Color stop within a radial gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position of the stop between `0.0` (focus) and `1.0` (edge).
    pub offset: f32,
    /// Color of the stop.
    pub color: Color,
    /// Opacity of the stop.
    pub opacity: f32,
}

impl GradientStop {
    const fn new(offset: f32, color: Color, opacity: f32) -> Self {
        Self {
            offset,
            color,
            opacity,
        }
    }
}

/// Radial gradient lit from the upper left, shared by every bead fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialGradient {
    /// Focus of the gradient as a fraction of the bead's bounding box.
    pub focus: Vec2,
    /// Radius of the gradient as a fraction of the bead's bounding box.
    pub radius: f32,
    /// Specular, body and rim stops in order.
    pub stops: [GradientStop; 3],
}

impl RadialGradient {
    fn lit(highlight: f32, body_offset: f32, body: Color, rim: Color) -> Self {
        Self {
            focus: Vec2::new(0.36, 0.27),
            radius: 0.7,
            stops: [
                GradientStop::new(0.0, Color::white(), highlight),
                GradientStop::new(body_offset, body, 1.0),
                GradientStop::new(1.0, rim, 1.0),
            ],
        }
    }
}

/// Gradients for each [`BeadFill`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientSet {
    /// Accent gradient.
    pub active: RadialGradient,
    /// Idle gradient.
    pub idle: RadialGradient,
    /// Marker gradient.
    pub marker: RadialGradient,
}

impl GradientSet {
    /// Builds the gradients for a theme and style.
    #[must_use]
    pub fn new(theme: &ColorTheme, style: &BeadStyle) -> Self {
        Self {
            active: RadialGradient::lit(0.65, 0.22, theme.accent, theme.shade),
            idle: RadialGradient::lit(0.18, 0.38, style.idle_mid, style.idle_edge),
            marker: RadialGradient::lit(0.75, 0.28, style.marker_mid, style.marker_edge),
        }
    }

    /// Gradient used for `fill`.
    #[must_use]
    pub fn for_fill(&self, fill: BeadFill) -> &RadialGradient {
        match fill {
            BeadFill::Active => &self.active,
            BeadFill::Idle => &self.idle,
            BeadFill::Marker => &self.marker,
        }
    }
}

/// White circle layered over a bead to suggest a reflection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    /// Center of the highlight.
    pub center: Vec2,
    /// Radius of the highlight.
    pub radius: f32,
    /// Opacity of the highlight.
    pub opacity: f32,
}

/// Flattened ellipse cast below and to the right of a bead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Center of the shadow ellipse.
    pub center: Vec2,
    /// Horizontal and vertical radii of the shadow ellipse.
    pub radii: Vec2,
    /// Opacity of the shadow.
    pub opacity: f32,
}

/// Soft accent-colored disc behind a counted bead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Halo {
    /// Radius of the halo.
    pub radius: f32,
    /// Opacity of the halo.
    pub opacity: f32,
}

/// Resolved look of a single bead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeadVisual {
    /// Center of the bead body.
    pub center: Vec2,
    /// Radius of the bead body.
    pub radius: f32,
    /// Gradient filling the body.
    pub fill: BeadFill,
    /// Opacity of the body.
    pub body_opacity: f32,
    /// Broad reflection.
    pub specular: Highlight,
    /// Tiny bright glint.
    pub spark: Highlight,
    /// Cast shadow.
    pub shadow: Shadow,
    /// Halo for counted ordinary beads.
    pub halo: Option<Halo>,
}

/// Opacity tiers for a bead body and its reflections.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Tier {
    body: f32,
    specular: f32,
    spark: f32,
    shadow: f32,
}

fn tier(bead: &BeadSpec) -> Tier {
    if bead.is_completed {
        Tier {
            body: 1.0,
            specular: 0.52,
            spark: 0.88,
            shadow: 0.45,
        }
    } else if bead.is_marker() {
        Tier {
            body: 1.0,
            specular: 0.58,
            spark: 0.82,
            shadow: 0.25,
        }
    } else {
        Tier {
            body: 0.8,
            specular: 0.2,
            spark: 0.32,
            shadow: 0.25,
        }
    }
}

/// Circular progress stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressRing {
    radius: f32,
}

impl ProgressRing {
    /// Creates a ring drawn at `radius`.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Draw radius of the ring.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Full length of the ring stroke.
    #[must_use]
    pub fn circumference(&self) -> f32 {
        TAU * self.radius
    }

    /// Summarises `progress` for display on this ring.
    #[must_use]
    pub fn indicator(&self, progress: ProgressState) -> ProgressIndicator {
        let ratio = progress.progress_ratio();
        let circumference = self.circumference();
        ProgressIndicator {
            ratio,
            percentage: progress.percentage(),
            radius: self.radius,
            circumference,
            arc_length: ratio * circumference,
        }
    }
}

/// Aggregate progress summary shown next to the chaplet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressIndicator {
    /// Completed fraction of the chaplet.
    pub ratio: f32,
    /// Completed fraction rounded to a whole percentage.
    pub percentage: u32,
    /// Draw radius of the ring.
    pub radius: f32,
    /// Full length of the ring stroke.
    pub circumference: f32,
    /// Length of the filled part of the ring stroke.
    pub arc_length: f32,
}

/// Derives bead visuals from placement, theme and style.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressRenderer {
    style: BeadStyle,
    theme: ColorTheme,
}

impl ProgressRenderer {
    /// Creates a renderer for the provided style and theme.
    #[must_use]
    pub fn new(style: BeadStyle, theme: ColorTheme) -> Self {
        Self { style, theme }
    }

    /// Theme the renderer colors counted beads with.
    #[must_use]
    pub const fn theme(&self) -> &ColorTheme {
        &self.theme
    }

    /// Gradients referenced by the visuals this renderer produces.
    #[must_use]
    pub fn gradients(&self) -> GradientSet {
        GradientSet::new(&self.theme, &self.style)
    }

    /// Resolves the look of a counting bead.
    #[must_use]
    pub fn render_bead(&self, bead: &BeadSpec) -> BeadVisual {
        let radius = if bead.is_marker() {
            self.style.marker_radius
        } else {
            self.style.bead_radius
        };
        let tier = tier(bead);
        let center = bead.position;
        let halo = (bead.is_completed && !bead.is_marker()).then_some(Halo {
            radius: radius + self.style.halo_offset,
            opacity: self.style.halo_opacity,
        });

        BeadVisual {
            center,
            radius,
            fill: BeadFill::select(bead),
            body_opacity: tier.body,
            specular: Highlight {
                center: center + Vec2::new(-0.3, -0.35) * radius,
                radius: radius * 0.28,
                opacity: tier.specular,
            },
            spark: Highlight {
                center: center + Vec2::new(-0.56, -0.54) * radius,
                radius: radius * 0.1,
                opacity: tier.spark,
            },
            shadow: Shadow {
                center: center + Vec2::new(1.5, 2.5),
                radii: Vec2::new(radius, radius * 0.5),
                opacity: tier.shadow,
            },
            halo,
        }
    }

    /// Resolves the look of the lead bead, which always carries the accent.
    #[must_use]
    pub fn render_lead(&self, lead: &BeadSpec) -> BeadVisual {
        let radius = self.style.lead_radius;
        let center = lead.position;

        BeadVisual {
            center,
            radius,
            fill: BeadFill::select(lead),
            body_opacity: 1.0,
            specular: Highlight {
                center: center + Vec2::new(-0.32, -0.36) * radius,
                radius: radius * 0.28,
                opacity: 0.48,
            },
            spark: Highlight {
                center: center + Vec2::new(-0.58, -0.55) * radius,
                radius: radius * 0.1,
                opacity: 0.72,
            },
            shadow: Shadow {
                center: center + Vec2::new(2.0, radius * 0.5 + 2.0),
                radii: Vec2::new(radius, radius * 0.5),
                opacity: 0.32,
            },
            halo: None,
        }
    }

    /// Ring indicator summarising `progress`.
    #[must_use]
    pub fn indicator(&self, progress: ProgressState) -> ProgressIndicator {
        ProgressRing::new(self.style.ring_radius).indicator(progress)
    }

    /// Glow around the loop, present only once a bead has been counted.
    #[must_use]
    pub fn ambient_glow(&self, progress: ProgressState, curve: &CurveConfig) -> Option<AmbientGlow> {
        (progress.completed_count() > 0).then(|| AmbientGlow {
            center: Vec2::new(curve.center_x(), curve.pivot_y() + curve.radius_y()),
            radii: Vec2::new(curve.radius_x(), curve.radius_y()) + GLOW_PADDING,
            width: GLOW_WIDTH,
            opacity: GLOW_OPACITY,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chapelet_core::BeadRole;

    fn renderer() -> ProgressRenderer {
        ProgressRenderer::new(BeadStyle::default(), ColorTheme::from_hex("#6366f1"))
    }

    fn bead(role: BeadRole, is_completed: bool) -> BeadSpec {
        BeadSpec::new(4, Vec2::new(100.0, 200.0), role, is_completed)
    }

    #[test]
    fn markers_keep_their_fill_when_completed() {
        assert_eq!(
            BeadFill::select(&bead(BeadRole::Marker, true)),
            BeadFill::Marker
        );
        assert_eq!(
            BeadFill::select(&bead(BeadRole::Marker, false)),
            BeadFill::Marker
        );
    }

    #[test]
    fn ordinary_beads_switch_fill_on_completion() {
        assert_eq!(
            BeadFill::select(&bead(BeadRole::Ordinary, true)),
            BeadFill::Active
        );
        assert_eq!(
            BeadFill::select(&bead(BeadRole::Ordinary, false)),
            BeadFill::Idle
        );
        assert_eq!(
            BeadFill::select(&bead(BeadRole::Lead, false)),
            BeadFill::Active
        );
    }

    #[test]
    fn only_completed_ordinary_beads_get_a_halo() {
        let renderer = renderer();

        let halo = renderer
            .render_bead(&bead(BeadRole::Ordinary, true))
            .halo
            .expect("completed bead has a halo");
        assert_abs_diff_eq!(halo.radius, 12.0);
        assert_abs_diff_eq!(halo.opacity, 0.18);
        assert!(renderer
            .render_bead(&bead(BeadRole::Marker, true))
            .halo
            .is_none());
        assert!(renderer
            .render_bead(&bead(BeadRole::Ordinary, false))
            .halo
            .is_none());
    }

    #[test]
    fn opacity_tiers_follow_completion_then_marker() {
        let renderer = renderer();
        let idle = renderer.render_bead(&bead(BeadRole::Ordinary, false));
        let marker = renderer.render_bead(&bead(BeadRole::Marker, false));
        let counted_marker = renderer.render_bead(&bead(BeadRole::Marker, true));

        assert_abs_diff_eq!(idle.body_opacity, 0.8);
        assert_abs_diff_eq!(idle.specular.opacity, 0.2);
        assert_abs_diff_eq!(marker.radius, 9.5);
        assert_abs_diff_eq!(marker.specular.opacity, 0.58);
        assert_abs_diff_eq!(counted_marker.specular.opacity, 0.52);
        assert_abs_diff_eq!(counted_marker.shadow.opacity, 0.45);
    }

    #[test]
    fn reflections_sit_up_and_left_of_the_body() {
        let visual = renderer().render_bead(&bead(BeadRole::Ordinary, false));

        assert!(visual.specular.center.x < visual.center.x);
        assert!(visual.specular.center.y < visual.center.y);
        assert_abs_diff_eq!(visual.spark.radius, 0.7, epsilon = 1e-5);
    }

    #[test]
    fn active_gradient_runs_from_accent_to_shade() {
        let gradients = renderer().gradients();
        let [specular, body, rim] = gradients.active.stops;

        assert_eq!(specular.color, Color::white());
        assert_abs_diff_eq!(specular.opacity, 0.65);
        assert_eq!(body.color.to_hex(), "#6366f1");
        assert_eq!(rim.color.to_css_rgb(), "rgb(38,39,92)");
        assert_eq!(gradients.for_fill(BeadFill::Marker).stops[1].color.to_hex(), "#7b8fae");
    }

    #[test]
    fn ring_indicator_scales_arc_with_ratio() {
        let ring = ProgressRing::new(22.0);
        let indicator = ring.indicator(ProgressState::new(33, 15));

        assert_abs_diff_eq!(ring.circumference(), 138.230_09, epsilon = 1e-3);
        assert_eq!(indicator.percentage, 45);
        assert_abs_diff_eq!(
            indicator.arc_length,
            15.0 / 33.0 * ring.circumference(),
            epsilon = 1e-3
        );
        assert_eq!(ring.indicator(ProgressState::new(0, 0)).arc_length, 0.0);
    }

    #[test]
    fn ambient_glow_appears_once_counting_starts() {
        let renderer = renderer();
        let curve = BeadStyle::default().curve_config().expect("valid style");

        assert!(renderer
            .ambient_glow(ProgressState::new(33, 0), &curve)
            .is_none());
        let glow = renderer
            .ambient_glow(ProgressState::new(33, 1), &curve)
            .expect("glow after first bead");
        assert_abs_diff_eq!(glow.center.y, 186.0);
        assert_abs_diff_eq!(glow.radii.x, 68.0);
        assert_abs_diff_eq!(glow.radii.y, 122.0);
    }
}
