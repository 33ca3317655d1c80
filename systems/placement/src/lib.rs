#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement system that threads beads along the teardrop curve.
//!
//! Placement happens in two steps. [`BeadPlacer::arrange`] samples positions
//! and assigns roles for a bead count, which only changes when the chaplet is
//! swapped. [`Arrangement::with_progress`] then tags completion, which changes
//! on every counted bead and is cheap.

use chapelet_core::{
    BeadRole, BeadSpec, ProgressState, CANONICAL_BEAD_COUNT, CANONICAL_MARKER_INDICES,
    MAX_BEAD_COUNT, UNMARKED_MAX_TOTAL,
};
use chapelet_system_curve::CurveSampler;
use glam::Vec2;

/// Returns the section marker indices for a chaplet of `total` beads.
///
/// The canonical 33-bead chaplet splits into three groups of eleven. Other
/// counts above [`UNMARKED_MAX_TOTAL`] use approximate thirds; smaller
/// chaplets have no markers.
#[must_use]
pub fn marker_indices(total: u32) -> Option<[u32; 2]> {
    if total == CANONICAL_BEAD_COUNT {
        return Some(CANONICAL_MARKER_INDICES);
    }
    if total <= UNMARKED_MAX_TOTAL {
        return None;
    }

    let first_third = total / 3 - 1;
    let second_third = (2 * u64::from(total) / 3) as u32 - 1;
    Some([first_third, second_third])
}

/// Returns `true` when bead `index` divides two sections of a `total`-bead chaplet.
#[must_use]
pub fn is_marker(total: u32, index: u32) -> bool {
    marker_indices(total).is_some_and(|markers| markers.contains(&index))
}

/// Curve parameter at which bead `index` of `total` is placed.
///
/// The half-step offset keeps every bead off the junction, which belongs to
/// the lead bead.
#[must_use]
pub fn bead_parameter(index: u32, total: u32) -> f32 {
    (index as f32 + 0.5) / total as f32
}

/// Position and role of a single bead, before completion is known.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeadSlot {
    /// Center of the bead in curve space.
    pub position: Vec2,
    /// Role the bead plays within the chaplet.
    pub role: BeadRole,
}

/// Count-independent bead geometry for a chaplet.
#[derive(Clone, Debug, PartialEq)]
pub struct Arrangement {
    slots: Vec<BeadSlot>,
}

impl Arrangement {
    /// Number of beads in the counted sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the arrangement holds no beads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bead slots in counting order.
    #[must_use]
    pub fn slots(&self) -> &[BeadSlot] {
        &self.slots
    }

    /// Tags each bead as completed when its index is below `completed_count`.
    ///
    /// The count is clamped to the bead total, so completion always forms a
    /// contiguous prefix of the sequence.
    #[must_use]
    pub fn with_progress(&self, completed_count: u32) -> Vec<BeadSpec> {
        let completed_count = completed_count.min(self.slots.len() as u32);
        self.slots
            .iter()
            .zip(0u32..)
            .map(|(slot, index)| {
                BeadSpec::new(index, slot.position, slot.role, index < completed_count)
            })
            .collect()
    }
}

/// Places beads along a sampled curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeadPlacer {
    sampler: CurveSampler,
    lead_offset: f32,
}

impl BeadPlacer {
    /// Creates a placer that threads beads along the provided curve.
    #[must_use]
    pub const fn new(sampler: CurveSampler) -> Self {
        Self {
            sampler,
            lead_offset: 0.0,
        }
    }

    /// Sets how far above the junction the lead bead's center hangs.
    #[must_use]
    pub fn with_lead_offset(mut self, lead_offset: f32) -> Self {
        self.lead_offset = lead_offset.max(0.0);
        self
    }

    /// Sampler backing the placer.
    #[must_use]
    pub const fn sampler(&self) -> &CurveSampler {
        &self.sampler
    }

    /// Computes positions and roles for a `total`-bead chaplet.
    ///
    /// A zero total yields an empty arrangement and totals above
    /// [`MAX_BEAD_COUNT`] are capped.
    #[must_use]
    pub fn arrange(&self, total: u32) -> Arrangement {
        if total > MAX_BEAD_COUNT {
            log::warn!("capping {total} beads at {MAX_BEAD_COUNT}");
        }
        let total = total.min(MAX_BEAD_COUNT);
        log::debug!("arranging {total} beads along the teardrop curve");

        let markers = marker_indices(total);
        let slots = (0..total)
            .map(|index| {
                let role = match markers {
                    Some(markers) if markers.contains(&index) => BeadRole::Marker,
                    _ => BeadRole::Ordinary,
                };
                BeadSlot {
                    position: self.sampler.sample(bead_parameter(index, total)),
                    role,
                }
            })
            .collect();

        Arrangement { slots }
    }

    /// Places every bead of the chaplet described by `progress`.
    #[must_use]
    pub fn place(&self, progress: ProgressState) -> Vec<BeadSpec> {
        self.arrange(progress.total_beads())
            .with_progress(progress.completed_count())
    }

    /// Pendant head bead hanging above the junction.
    #[must_use]
    pub fn lead(&self) -> BeadSpec {
        let junction = self.sampler.config().junction();
        BeadSpec::new(
            0,
            junction - Vec2::new(0.0, self.lead_offset),
            BeadRole::Lead,
            false,
        )
    }
}
