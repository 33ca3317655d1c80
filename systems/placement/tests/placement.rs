use approx::assert_abs_diff_eq;
use chapelet_core::{BeadRole, CurveConfig, LayoutInput, ProgressState, MAX_BEAD_COUNT};
use chapelet_system_curve::CurveSampler;
use chapelet_system_placement::{bead_parameter, marker_indices, BeadPlacer};

fn placer() -> BeadPlacer {
    let config = CurveConfig::new(140.0, 186.0, 76.0, 50.0, 110.0).expect("valid curve");
    BeadPlacer::new(CurveSampler::new(config)).with_lead_offset(14.0)
}

fn marker_set(total: u32) -> Vec<u32> {
    placer()
        .place(ProgressState::new(total, 0))
        .into_iter()
        .filter(|bead| bead.is_marker())
        .map(|bead| bead.index)
        .collect()
}

#[test]
fn completion_forms_a_prefix_for_every_count() {
    let placer = placer();

    for total in 1..=40 {
        let arrangement = placer.arrange(total);
        for completed in 0..=total {
            let beads = arrangement.with_progress(completed);
            assert_eq!(beads.len(), total as usize);
            for bead in &beads {
                assert_eq!(
                    bead.is_completed,
                    bead.index < completed,
                    "total {total}, completed {completed}, bead {}",
                    bead.index
                );
            }
        }
    }
}

#[test]
fn canonical_chaplet_marks_beads_ten_and_twenty_one() {
    assert_eq!(marker_set(33), vec![10, 21]);
}

#[test]
fn twelve_bead_chaplet_marks_approximate_thirds() {
    assert_eq!(marker_set(12), vec![3, 7]);
    assert_eq!(marker_indices(12), Some([3, 7]));
}

#[test]
fn nine_bead_chaplet_has_no_markers() {
    assert!(marker_set(9).is_empty());
}

#[test]
fn beads_are_sampled_at_half_step_parameters() {
    let placer = placer();
    let beads = placer.place(ProgressState::new(20, 0));

    for bead in beads {
        let expected = placer.sampler().sample(bead_parameter(bead.index, 20));
        assert_eq!(bead.position, expected);
    }
}

#[test]
fn no_bead_sits_on_the_junction() {
    let placer = placer();
    let junction = placer.sampler().config().junction();

    for bead in placer.place(ProgressState::new(33, 0)) {
        assert!(
            bead.position.distance(junction) > 1.0,
            "bead {} overlaps the junction",
            bead.index
        );
    }
}

#[test]
fn empty_chaplet_places_nothing() {
    let placer = placer();

    assert!(placer.arrange(0).is_empty());
    assert!(placer.place(ProgressState::from_raw(-5, 3)).is_empty());
}

#[test]
fn oversized_totals_are_capped_before_allocation() {
    let placer = placer();
    let requested = LayoutInput::new(i64::MAX, 0, "#6366f1").progress();

    assert_eq!(requested.total_beads(), MAX_BEAD_COUNT);
    assert_eq!(placer.arrange(u32::MAX).len(), MAX_BEAD_COUNT as usize);
    assert_eq!(placer.place(requested).len(), MAX_BEAD_COUNT as usize);
}

#[test]
fn overflowing_completion_is_clamped() {
    let beads = placer().arrange(5).with_progress(12);

    assert!(beads.iter().all(|bead| bead.is_completed));
}

#[test]
fn lead_bead_hangs_above_the_junction() {
    let lead = placer().lead();

    assert_eq!(lead.role, BeadRole::Lead);
    assert_abs_diff_eq!(lead.position.x, 140.0);
    assert_abs_diff_eq!(lead.position.y, 62.0);
}

#[test]
fn arrangement_is_identical_across_runs() {
    let first = placer().arrange(33);
    let second = placer().arrange(33);

    assert_eq!(first, second, "placement diverged between runs");
}
