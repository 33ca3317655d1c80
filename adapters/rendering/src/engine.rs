//! Memoized scene computation.
//!
//! Callers feed the engine whatever the owning view currently shows and get a
//! shared [`Scene`] back. Work is only redone for the inputs that changed:
//! bead geometry follows the bead total, the theme follows the accent color,
//! and bead visuals follow the completed count.

use std::sync::Arc;

use chapelet_core::{LayoutInput, ProgressState};
use chapelet_system_curve::CurveSampler;
use chapelet_system_placement::{Arrangement, BeadPlacer};
use glam::Vec2;

use crate::{
    visuals::ProgressRenderer, BeadPresentation, BeadStyle, ColorTheme, CordPresentation,
    PendantPresentation, RingPresentation, Scene, Segment, StyleError,
};

const STEM_OPACITY: f32 = 0.6;
const UPPER_STEM_LENGTH: f32 = 10.0;
const RING_GAP: f32 = 14.0;
const RING_RADIUS: f32 = 5.0;
const RING_OPACITY: f32 = 0.55;
const TASSEL_WIDTH: f32 = 1.6;
const TASSEL_OPACITY: f32 = 0.4;
const TASSEL_ROOT_SPREAD: f32 = 0.3;
const TASSEL_STRANDS: [Vec2; 4] = [
    Vec2::new(-9.0, -18.0),
    Vec2::new(-3.0, -21.0),
    Vec2::new(3.0, -20.0),
    Vec2::new(9.0, -17.0),
];

/// Number of times each memoized stage has been recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Bead geometry recomputations.
    pub arrangements: u32,
    /// Theme derivations.
    pub themes: u32,
    /// Full scene compositions.
    pub scenes: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SceneKey {
    progress: ProgressState,
    accent_color: String,
}

/// Computes scenes, reusing previous work whenever inputs repeat.
#[derive(Debug)]
pub struct LayoutEngine {
    style: BeadStyle,
    placer: BeadPlacer,
    cord: Vec<Vec2>,
    arrangement: Option<(u32, Arc<Arrangement>)>,
    theme: Option<(String, ColorTheme)>,
    scene: Option<(SceneKey, Arc<Scene>)>,
    stats: EngineStats,
}

impl LayoutEngine {
    /// Creates an engine for the provided style.
    ///
    /// Returns an error when the style fails validation.
    pub fn new(style: BeadStyle) -> Result<Self, StyleError> {
        style.validate()?;
        let sampler = CurveSampler::new(style.curve_config()?);
        let placer = BeadPlacer::new(sampler).with_lead_offset(style.lead_offset());
        let cord = sampler.polyline(style.cord_segments);

        Ok(Self {
            style,
            placer,
            cord,
            arrangement: None,
            theme: None,
            scene: None,
            stats: EngineStats::default(),
        })
    }

    /// Style the engine lays scenes out with.
    #[must_use]
    pub const fn style(&self) -> &BeadStyle {
        &self.style
    }

    /// Recomputation counters since the engine was created.
    #[must_use]
    pub const fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Returns the scene for `input`, recomputing only what changed.
    pub fn compute(&mut self, input: &LayoutInput) -> Arc<Scene> {
        let key = SceneKey {
            progress: input.progress(),
            accent_color: input.accent_color.clone(),
        };
        if let Some((cached_key, scene)) = &self.scene {
            if *cached_key == key {
                return Arc::clone(scene);
            }
        }

        let arrangement = self.arrangement_for(key.progress.total_beads());
        let theme = self.theme_for(&key.accent_color);
        let scene = Arc::new(self.compose(&arrangement, theme, key.progress));
        self.stats.scenes += 1;
        log::debug!(
            "composed scene for {}/{} beads",
            key.progress.completed_count(),
            key.progress.total_beads()
        );

        self.scene = Some((key, Arc::clone(&scene)));
        scene
    }

    fn arrangement_for(&mut self, total: u32) -> Arc<Arrangement> {
        match &self.arrangement {
            Some((cached_total, arrangement)) if *cached_total == total => Arc::clone(arrangement),
            _ => {
                let arrangement = Arc::new(self.placer.arrange(total));
                self.stats.arrangements += 1;
                self.arrangement = Some((total, Arc::clone(&arrangement)));
                arrangement
            }
        }
    }

    fn theme_for(&mut self, accent_color: &str) -> ColorTheme {
        match &self.theme {
            Some((cached_accent, theme)) if cached_accent == accent_color => *theme,
            _ => {
                let theme = ColorTheme::from_hex(accent_color);
                self.stats.themes += 1;
                self.theme = Some((accent_color.to_owned(), theme));
                theme
            }
        }
    }

    fn compose(
        &self,
        arrangement: &Arrangement,
        theme: ColorTheme,
        progress: ProgressState,
    ) -> Scene {
        let renderer = ProgressRenderer::new(self.style.clone(), theme);
        let beads = arrangement
            .with_progress(progress.completed_count())
            .into_iter()
            .map(|spec| BeadPresentation {
                visual: renderer.render_bead(&spec),
                spec,
            })
            .collect();
        let lead = self.placer.lead();
        let lead = BeadPresentation {
            visual: renderer.render_lead(&lead),
            spec: lead,
        };

        Scene {
            canvas: Vec2::new(self.style.canvas_width, self.style.canvas_height),
            theme,
            gradients: renderer.gradients(),
            cord: CordPresentation {
                points: self.cord.clone(),
                width: self.style.cord_width,
                opacity: self.style.cord_opacity,
            },
            pendant: self.pendant(lead),
            beads,
            ambient_glow: renderer.ambient_glow(progress, self.placer.sampler().config()),
            progress,
            indicator: renderer.indicator(progress),
        }
    }

    fn pendant(&self, lead: BeadPresentation) -> PendantPresentation {
        let center = lead.spec.position;
        let radius = self.style.lead_radius;
        let width = self.style.cord_width;
        let junction = self.placer.sampler().config().junction();
        let top = center - Vec2::new(0.0, radius);
        let ring_center = top - Vec2::new(0.0, RING_GAP);

        let stems = vec![
            Segment::new(center + Vec2::new(0.0, radius), junction, width, STEM_OPACITY),
            Segment::new(
                top,
                top - Vec2::new(0.0, UPPER_STEM_LENGTH),
                width,
                STEM_OPACITY,
            ),
        ];
        let tassel = TASSEL_STRANDS
            .iter()
            .map(|&strand| {
                Segment::new(
                    ring_center + Vec2::new(strand.x * TASSEL_ROOT_SPREAD, 0.0),
                    ring_center + strand,
                    TASSEL_WIDTH,
                    TASSEL_OPACITY,
                )
            })
            .collect();

        PendantPresentation {
            lead,
            stems,
            ring: RingPresentation {
                center: ring_center,
                radius: RING_RADIUS,
                width,
                opacity: RING_OPACITY,
            },
            tassel,
        }
    }
}
