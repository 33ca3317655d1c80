#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that lays out and renders Chapelet prayer beads.

mod config;
mod report;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use chapelet_core::{
    LayoutInput, ProgressState, CANONICAL_BEAD_COUNT, DEFAULT_ACCENT_COLOR, MAX_BEAD_COUNT,
};
use chapelet_rendering::{
    input_for_progress, panic_message, Color, FrameInput, LayoutEngine, Presentation,
    RenderingBackend, Scene,
};
use chapelet_rendering_macroquad::MacroquadBackend;
use chapelet_rendering_svg::SvgBackend;
use clap::{Args, Parser, Subcommand, ValueHint};

use crate::report::LayoutReport;

const WINDOW_TITLE: &str = "Chapelet";

#[derive(Debug, Parser)]
#[command(author, version, about = "Lays out and renders prayer-bead chaplets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the chaplet as an SVG document
    Render(RenderArgs),
    /// Print the bead layout as JSON
    Layout(LayoutArgs),
    /// Open an interactive counting window
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Number of beads on the chaplet; values outside 1..=10000 fall back to 33
    #[arg(long, default_value_t = i64::from(CANONICAL_BEAD_COUNT), allow_negative_numbers = true)]
    total: i64,

    /// Beads counted so far
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    count: i64,

    /// Accent color as #RRGGBB
    #[arg(long, default_value = DEFAULT_ACCENT_COLOR)]
    color: String,

    /// Show the same progress on a chaplet with this many beads
    #[arg(long, allow_negative_numbers = true)]
    scale_to: Option<i64>,

    /// TOML style file overriding the default look
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Destination file; writes to stdout when omitted
    #[arg(long, short, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Omit the circular progress indicator
    #[arg(long)]
    no_ring: bool,
}

#[derive(Debug, Args)]
struct LayoutArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Destination file; writes to stdout when omitted
    #[arg(long, short, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Render as fast as possible instead of waiting for the display refresh
    #[arg(long)]
    no_vsync: bool,

    /// SVG file written when the preview window cannot be shown; stdout when omitted
    #[arg(long, value_hint = ValueHint::FilePath)]
    fallback: Option<PathBuf>,
}

impl SessionArgs {
    fn layout_input(&self) -> LayoutInput {
        let total = bead_total(self.total, "--total");
        let mut progress = ProgressState::from_raw(i64::from(total), self.count);
        if let Some(scale_to) = self.scale_to {
            progress = progress.rescaled(bead_total(scale_to, "--scale-to"));
        }

        LayoutInput::new(
            i64::from(progress.total_beads()),
            i64::from(progress.completed_count()),
            self.color.as_str(),
        )
    }

    fn engine(&self) -> Result<LayoutEngine> {
        let style = config::load_style(self.config.as_deref())?;
        LayoutEngine::new(style).context("failed to prepare layout engine")
    }

    fn scene(&self) -> Result<Arc<Scene>> {
        let mut engine = self.engine()?;
        Ok(engine.compute(&self.layout_input()))
    }
}

fn bead_total(requested: i64, flag: &str) -> u32 {
    match u32::try_from(requested) {
        Ok(total) if (1..=MAX_BEAD_COUNT).contains(&total) => total,
        _ => {
            log::warn!(
                "{flag} {requested} is outside 1..={MAX_BEAD_COUNT}; using {CANONICAL_BEAD_COUNT}"
            );
            CANONICAL_BEAD_COUNT
        }
    }
}

/// Entry point for the Chapelet command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    match Cli::parse().command {
        Command::Render(args) => render(&args),
        Command::Layout(args) => layout(&args),
        Command::Preview(args) => preview(args),
    }
}

fn render(args: &RenderArgs) -> Result<()> {
    let transparent = Color::new(0.0, 0.0, 0.0, 0.0);
    let presentation = Presentation::new(WINDOW_TITLE, transparent, args.session.scene()?);
    let show_ring = !args.no_ring;

    match &args.output {
        Some(path) => SvgBackend::new(BufWriter::new(create(path)?))
            .with_progress_ring(show_ring)
            .run(presentation, |_, _| {}),
        None => SvgBackend::new(io::stdout().lock())
            .with_progress_ring(show_ring)
            .run(presentation, |_, _| {}),
    }
}

fn layout(args: &LayoutArgs) -> Result<()> {
    let scene = args.session.scene()?;
    let report = LayoutReport::from_scene(&scene);
    let json = serde_json::to_string_pretty(&report).context("failed to serialise layout")?;

    match &args.output {
        Some(path) => {
            let mut file = create(path)?;
            writeln!(file, "{json}")
                .with_context(|| format!("failed to write layout to {}", path.display()))?;
            log::info!("wrote layout report to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write layout to stdout")?;
        }
    }
    Ok(())
}

fn preview(args: PreviewArgs) -> Result<()> {
    let mut engine = args.session.engine()?;
    let mut current = args.session.layout_input();
    let clear_color = Color::from_rgb_u8(0x06, 0x0c, 0x18);
    let presentation = Presentation::new(WINDOW_TITLE, clear_color, engine.compute(&current));
    let backend = MacroquadBackend::new().with_vsync(!args.no_vsync);
    let fallback = args.fallback;

    present_with_fallback(
        backend,
        presentation,
        move |input, scene| {
            if input.is_idle() {
                return;
            }
            let progress = input.apply(scene.progress);
            if progress == scene.progress {
                return;
            }

            current = input_for_progress(&current, progress);
            *scene = engine.compute(&current);
            log::info!(
                "counted {}/{} ({}%)",
                progress.completed_count(),
                progress.total_beads(),
                scene.indicator.percentage
            );
        },
        || fallback_sink(fallback.as_deref()),
    )
}

/// Runs `backend`, writing the initial scene as a static SVG if it fails or panics.
fn present_with_fallback<B, F, S, W>(
    backend: B,
    presentation: Presentation,
    update_scene: F,
    fallback_sink: S,
) -> Result<()>
where
    B: RenderingBackend,
    F: FnMut(FrameInput, &mut Arc<Scene>) + 'static,
    S: FnOnce() -> Result<W>,
    W: Write,
{
    let window_title = presentation.window_title.clone();
    let initial = Arc::clone(&presentation.scene);

    let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
        backend.run(presentation, update_scene)
    }));
    let error = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(error)) => error,
        Err(payload) => anyhow!("preview panicked: {}", panic_message(&*payload)),
    };

    log::warn!("preview unavailable ({error:#}); writing a static SVG instead");
    let transparent = Color::new(0.0, 0.0, 0.0, 0.0);
    SvgBackend::new(fallback_sink()?).run(
        Presentation::new(window_title, transparent, initial),
        |_, _| {},
    )
}

fn fallback_sink(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(create(path)?)),
        None => Box::new(io::stdout()),
    };
    Ok(sink)
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(args: &[&str]) -> SessionArgs {
        let mut argv = vec!["chapelet", "layout"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).expect("arguments parse").command {
            Command::Layout(args) => args.session,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn defaults_describe_a_fresh_canonical_session() {
        let input = session(&[]).layout_input();

        assert_eq!(input, LayoutInput::default());
    }

    #[test]
    fn non_positive_total_falls_back_to_canonical_count() {
        let input = session(&["--total", "-4", "--count", "2"]).layout_input();

        assert_eq!(input.total, 33);
        assert_eq!(input.completed_count, 2);
    }

    #[test]
    fn count_is_clamped_to_total() {
        let input = session(&["--total", "9", "--count", "40"]).layout_input();

        assert_eq!(input.completed_count, 9);
    }

    #[test]
    fn scale_to_maps_progress_onto_a_new_total() {
        let input = session(&["--total", "33", "--count", "15", "--scale-to", "20"]).layout_input();

        assert_eq!(input.total, 20);
        assert_eq!(input.completed_count, 9);
    }

    #[test]
    fn render_accepts_output_and_ring_flags() {
        let cli = Cli::try_parse_from([
            "chapelet",
            "render",
            "--color",
            "#10b981",
            "--output",
            "chaplet.svg",
            "--no-ring",
        ])
        .expect("arguments parse");

        match cli.command {
            Command::Render(args) => {
                assert!(args.no_ring);
                assert_eq!(args.output, Some(PathBuf::from("chaplet.svg")));
                assert_eq!(args.session.color, "#10b981");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn oversized_total_falls_back_to_canonical_count() {
        let input = session(&["--total", "4294967295", "--count", "3"]).layout_input();

        assert_eq!(input.total, 33);
        assert_eq!(input.completed_count, 3);
        assert_eq!(bead_total(i64::from(MAX_BEAD_COUNT), "--total"), MAX_BEAD_COUNT);
        assert_eq!(bead_total(i64::from(MAX_BEAD_COUNT) + 1, "--scale-to"), 33);
    }

    struct FailingBackend;

    impl RenderingBackend for FailingBackend {
        fn run<F>(self, _: Presentation, _: F) -> Result<()>
        where
            F: FnMut(FrameInput, &mut Arc<Scene>) + 'static,
        {
            Err(anyhow!("no display available"))
        }
    }

    struct PanickingBackend;

    impl RenderingBackend for PanickingBackend {
        fn run<F>(self, _: Presentation, _: F) -> Result<()>
        where
            F: FnMut(FrameInput, &mut Arc<Scene>) + 'static,
        {
            panic!("failed to create GL context")
        }
    }

    struct IdleBackend;

    impl RenderingBackend for IdleBackend {
        fn run<F>(self, mut presentation: Presentation, mut update_scene: F) -> Result<()>
        where
            F: FnMut(FrameInput, &mut Arc<Scene>) + 'static,
        {
            update_scene(FrameInput::default(), &mut presentation.scene);
            Ok(())
        }
    }

    fn canonical_presentation() -> Presentation {
        let mut engine = LayoutEngine::new(chapelet_rendering::BeadStyle::default())
            .expect("default style is valid");
        let scene = engine.compute(&LayoutInput::new(33, 15, DEFAULT_ACCENT_COLOR));
        Presentation::new(WINDOW_TITLE, Color::black(), scene)
    }

    fn fallback_output<B>(backend: B) -> Vec<u8>
    where
        B: RenderingBackend,
    {
        let mut sink = Vec::new();
        present_with_fallback(backend, canonical_presentation(), |_, _| {}, || {
            Ok(&mut sink)
        })
        .expect("fallback succeeds");
        sink
    }

    #[test]
    fn failed_preview_falls_back_to_static_svg() {
        let document = String::from_utf8(fallback_output(FailingBackend)).expect("utf-8");

        assert!(document.starts_with("<svg"));
        assert_eq!(document.matches(r#"class="bead""#).count(), 34);
        assert!(document.contains(">45%</text>"));
    }

    #[test]
    fn panicking_preview_falls_back_to_static_svg() {
        let document = String::from_utf8(fallback_output(PanickingBackend)).expect("utf-8");

        assert!(document.starts_with("<svg"));
        assert!(document.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn working_preview_writes_no_fallback() {
        assert!(fallback_output(IdleBackend).is_empty());
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["chapelet", "count"]).is_err());
    }
}
