#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless SVG rendering adapter for Chapelet.
//!
//! The backend runs a single frame and writes the resulting scene as a
//! standalone SVG document. Layers are emitted back to front: gradients, glow,
//! cord, pendant, beads and finally the optional progress ring.

use std::{
    fmt::{self, Write as _},
    io::Write,
    sync::Arc,
};

use anyhow::{Context, Result};
use chapelet_rendering::{
    BeadFill, BeadVisual, Color, FrameInput, Presentation, RadialGradient, RenderingBackend,
    Scene, Segment,
};
use glam::Vec2;

const RING_MARGIN: f32 = 8.0;
const RING_TRACK: &str = "rgba(255,255,255,0.06)";

/// Rendering backend that serialises the scene as an SVG document.
#[derive(Debug)]
pub struct SvgBackend<W> {
    sink: W,
    show_progress_ring: bool,
}

impl<W> SvgBackend<W>
where
    W: Write,
{
    /// Creates a backend writing into `sink`.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            show_progress_ring: true,
        }
    }

    /// Configures whether the circular progress indicator is drawn.
    #[must_use]
    pub fn with_progress_ring(mut self, show: bool) -> Self {
        self.show_progress_ring = show;
        self
    }
}

impl<W> RenderingBackend for SvgBackend<W>
where
    W: Write,
{
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Arc<Scene>) + 'static,
    {
        let Self {
            mut sink,
            show_progress_ring,
        } = self;
        let Presentation {
            window_title,
            clear_color,
            mut scene,
        } = presentation;

        update_scene(FrameInput::default(), &mut scene);

        let options = SvgOptions {
            title: window_title,
            background: (clear_color.alpha > 0.0).then_some(clear_color),
            show_progress_ring,
        };
        let document = render_document(&scene, &options).context("failed to format SVG")?;
        sink.write_all(document.as_bytes())
            .context("failed to write SVG document")?;
        sink.flush().context("failed to flush SVG document")?;
        log::info!(
            "wrote SVG chaplet with {} beads ({} bytes)",
            scene.beads.len(),
            document.len()
        );

        Ok(())
    }
}

/// Document-level settings for [`render_document`].
#[derive(Clone, Debug, PartialEq)]
pub struct SvgOptions {
    /// Title embedded in the document.
    pub title: String,
    /// Solid background, or `None` for a transparent document.
    pub background: Option<Color>,
    /// Whether the circular progress indicator is drawn in the lower right corner.
    pub show_progress_ring: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            title: String::from("Chapelet"),
            background: None,
            show_progress_ring: true,
        }
    }
}

/// Formats `scene` as a standalone SVG document.
pub fn render_document(scene: &Scene, options: &SvgOptions) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let Vec2 {
        x: width,
        y: height,
    } = scene.canvas;
    let accent = scene.theme.accent.to_hex();

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#
    )?;
    writeln!(out, "  <title>{}</title>", escape_xml(&options.title))?;
    write_defs(&mut out, scene)?;

    if let Some(background) = options.background {
        writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}" fill-opacity="{:.2}"/>"#,
            background.to_hex(),
            background.alpha
        )?;
    }

    if let Some(glow) = scene.ambient_glow {
        writeln!(
            out,
            r#"  <ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" fill="none" stroke="{accent}" stroke-width="{:.1}" opacity="{:.2}"/>"#,
            glow.center.x, glow.center.y, glow.radii.x, glow.radii.y, glow.width, glow.opacity
        )?;
    }

    let points = scene
        .cord
        .points
        .iter()
        .map(|point| format!("{:.1},{:.1}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(
        out,
        r#"  <polyline points="{points}" fill="none" stroke="{accent}" stroke-opacity="{:.2}" stroke-width="{:.1}" stroke-linejoin="round"/>"#,
        scene.cord.opacity, scene.cord.width
    )?;

    let pendant = &scene.pendant;
    for stem in &pendant.stems {
        write_segment(&mut out, stem, &accent, false)?;
    }
    writeln!(
        out,
        r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{accent}" stroke-opacity="{:.2}" stroke-width="{:.1}"/>"#,
        pendant.ring.center.x,
        pendant.ring.center.y,
        pendant.ring.radius,
        pendant.ring.opacity,
        pendant.ring.width
    )?;
    for strand in &pendant.tassel {
        write_segment(&mut out, strand, &accent, true)?;
    }
    write_bead(&mut out, &pendant.lead.visual, &accent)?;

    for bead in &scene.beads {
        write_bead(&mut out, &bead.visual, &accent)?;
    }

    if options.show_progress_ring {
        write_progress_ring(&mut out, scene, &accent)?;
    }

    writeln!(out, "</svg>")?;
    Ok(out)
}

fn write_defs(out: &mut String, scene: &Scene) -> fmt::Result {
    writeln!(out, "  <defs>")?;
    for fill in [BeadFill::Active, BeadFill::Idle, BeadFill::Marker] {
        write_gradient(out, gradient_id(fill), scene.gradients.for_fill(fill))?;
    }
    writeln!(out, "  </defs>")
}

fn write_gradient(out: &mut String, id: &str, gradient: &RadialGradient) -> fmt::Result {
    writeln!(
        out,
        r#"    <radialGradient id="{id}" cx="{:.0}%" cy="{:.0}%" r="{:.0}%">"#,
        gradient.focus.x * 100.0,
        gradient.focus.y * 100.0,
        gradient.radius * 100.0
    )?;
    for stop in &gradient.stops {
        writeln!(
            out,
            r#"      <stop offset="{:.0}%" stop-color="{}" stop-opacity="{:.2}"/>"#,
            stop.offset * 100.0,
            stop.color.to_hex(),
            stop.opacity
        )?;
    }
    writeln!(out, "    </radialGradient>")
}

fn write_segment(out: &mut String, segment: &Segment, stroke: &str, round_cap: bool) -> fmt::Result {
    let cap = if round_cap {
        r#" stroke-linecap="round""#
    } else {
        ""
    };
    writeln!(
        out,
        r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{stroke}" stroke-opacity="{:.2}" stroke-width="{:.1}"{cap}/>"#,
        segment.from.x, segment.from.y, segment.to.x, segment.to.y, segment.opacity, segment.width
    )
}

fn write_bead(out: &mut String, visual: &BeadVisual, accent: &str) -> fmt::Result {
    let center = visual.center;
    writeln!(out, "  <g>")?;
    if let Some(halo) = visual.halo {
        writeln!(
            out,
            r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{accent}" opacity="{:.2}"/>"#,
            center.x, center.y, halo.radius, halo.opacity
        )?;
    }
    writeln!(
        out,
        r#"    <ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" fill="black" opacity="{:.2}"/>"#,
        visual.shadow.center.x,
        visual.shadow.center.y,
        visual.shadow.radii.x,
        visual.shadow.radii.y,
        visual.shadow.opacity
    )?;
    writeln!(
        out,
        r#"    <circle class="bead" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="url(#{})" opacity="{:.2}"/>"#,
        center.x,
        center.y,
        visual.radius,
        gradient_id(visual.fill),
        visual.body_opacity
    )?;
    for highlight in [visual.specular, visual.spark] {
        writeln!(
            out,
            r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="white" opacity="{:.2}"/>"#,
            highlight.center.x, highlight.center.y, highlight.radius, highlight.opacity
        )?;
    }
    writeln!(out, "  </g>")
}

fn write_progress_ring(out: &mut String, scene: &Scene, accent: &str) -> fmt::Result {
    let indicator = scene.indicator;
    let offset = indicator.radius + RING_MARGIN;
    let center = scene.canvas - Vec2::splat(offset);

    writeln!(out, r#"  <g class="progress">"#)?;
    writeln!(
        out,
        r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{RING_TRACK}" stroke-width="4"/>"#,
        center.x, center.y, indicator.radius
    )?;
    writeln!(
        out,
        r#"    <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{accent}" stroke-width="4" stroke-linecap="round" stroke-dasharray="{:.1} {:.1}" transform="rotate(-90 {:.2} {:.2})"/>"#,
        center.x,
        center.y,
        indicator.radius,
        indicator.arc_length,
        indicator.circumference,
        center.x,
        center.y
    )?;
    writeln!(
        out,
        r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="central" font-size="12" font-weight="900" fill="white">{}%</text>"#,
        center.x, center.y, indicator.percentage
    )?;
    writeln!(out, "  </g>")
}

fn gradient_id(fill: BeadFill) -> &'static str {
    match fill {
        BeadFill::Active => "chapelet-active",
        BeadFill::Idle => "chapelet-idle",
        BeadFill::Marker => "chapelet-marker",
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
