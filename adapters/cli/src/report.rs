//! JSON report describing a composed scene.

use chapelet_core::BeadRole;
use chapelet_rendering::{BeadFill, BeadPresentation, Scene};
use serde::Serialize;

/// Machine-readable summary of a layout.
#[derive(Debug, Serialize)]
pub(crate) struct LayoutReport {
    total_beads: u32,
    completed_count: u32,
    progress_ratio: f32,
    percentage: u32,
    is_complete: bool,
    markers: Vec<u32>,
    arc: ArcReport,
    lead: BeadReport,
    beads: Vec<BeadReport>,
}

#[derive(Debug, Serialize)]
struct ArcReport {
    radius: f32,
    circumference: f32,
    arc_length: f32,
}

#[derive(Debug, Serialize)]
struct BeadReport {
    index: u32,
    x: f32,
    y: f32,
    radius: f32,
    role: BeadRole,
    completed: bool,
    fill: &'static str,
}

impl From<&BeadPresentation> for BeadReport {
    fn from(bead: &BeadPresentation) -> Self {
        Self {
            index: bead.spec.index,
            x: bead.spec.position.x,
            y: bead.spec.position.y,
            radius: bead.visual.radius,
            role: bead.spec.role,
            completed: bead.spec.is_completed,
            fill: fill_name(bead.visual.fill),
        }
    }
}

impl LayoutReport {
    /// Summarises `scene`.
    pub(crate) fn from_scene(scene: &Scene) -> Self {
        let progress = scene.progress;
        Self {
            total_beads: progress.total_beads(),
            completed_count: progress.completed_count(),
            progress_ratio: progress.progress_ratio(),
            percentage: scene.indicator.percentage,
            is_complete: progress.is_complete(),
            markers: scene.markers().map(|bead| bead.spec.index).collect(),
            arc: ArcReport {
                radius: scene.indicator.radius,
                circumference: scene.indicator.circumference,
                arc_length: scene.indicator.arc_length,
            },
            lead: BeadReport::from(&scene.pendant.lead),
            beads: scene.beads.iter().map(BeadReport::from).collect(),
        }
    }
}

fn fill_name(fill: BeadFill) -> &'static str {
    match fill {
        BeadFill::Active => "active",
        BeadFill::Idle => "idle",
        BeadFill::Marker => "marker",
    }
}
