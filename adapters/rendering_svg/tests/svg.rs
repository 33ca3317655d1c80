use chapelet_core::LayoutInput;
use chapelet_rendering::{BeadStyle, Color, LayoutEngine, Presentation, RenderingBackend, Scene};
use chapelet_rendering_svg::{render_document, SvgBackend, SvgOptions};

fn scene(total: i64, completed: i64) -> Scene {
    let mut engine = LayoutEngine::new(BeadStyle::default()).expect("default style is valid");
    (*engine.compute(&LayoutInput::new(total, completed, "#6366f1"))).clone()
}

#[test]
fn document_draws_one_body_per_bead_plus_lead() {
    let document = render_document(&scene(33, 15), &SvgOptions::default()).expect("formats");

    assert!(document.starts_with("<svg"));
    assert!(document.trim_end().ends_with("</svg>"));
    assert_eq!(document.matches(r#"class="bead""#).count(), 34);
    assert_eq!(document.matches("url(#chapelet-marker)").count(), 2);
    assert_eq!(document.matches("url(#chapelet-active)").count(), 15);
    assert_eq!(document.matches("url(#chapelet-idle)").count(), 17);
}

#[test]
fn document_embeds_theme_gradients() {
    let document = render_document(&scene(33, 0), &SvgOptions::default()).expect("formats");

    assert!(document.contains(r##"stop-color="#6366f1""##));
    assert!(document.contains(r##"stop-color="#26275c""##));
    assert!(document.contains(r##"stop-color="#7b8fae""##));
}

#[test]
fn progress_ring_reports_rounded_percentage() {
    let document = render_document(&scene(33, 15), &SvgOptions::default()).expect("formats");

    assert!(document.contains(">45%</text>"));
    assert!(document.contains(r#"stroke-dasharray="62.8 138.2""#));
}

#[test]
fn progress_ring_can_be_hidden() {
    let options = SvgOptions {
        show_progress_ring: false,
        ..SvgOptions::default()
    };
    let document = render_document(&scene(33, 15), &options).expect("formats");

    assert!(!document.contains(r#"class="progress""#));
}

#[test]
fn document_never_contains_nan() {
    let document = render_document(&scene(12, 40), &SvgOptions::default()).expect("formats");

    assert!(!document.contains("NaN"));
}

#[test]
fn backend_writes_document_to_sink() {
    let mut buffer = Vec::new();
    let presentation = Presentation::new("Tasbih & Dhikr", Color::new(0.0, 0.0, 0.0, 0.0), scene(33, 0));

    SvgBackend::new(&mut buffer)
        .with_progress_ring(false)
        .run(presentation, |input, scene| {
            assert!(input.is_idle());
            assert_eq!(scene.beads.len(), 33);
        })
        .expect("rendering succeeds");

    let document = String::from_utf8(buffer).expect("utf-8 document");
    assert!(document.contains("<title>Tasbih &amp; Dhikr</title>"));
    assert!(!document.contains("<rect"));
}
