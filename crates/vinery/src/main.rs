//! Grow and animate vine drawings offline.
//!
//! Drives a [`Session`] with a frame loop standing in for a display's
//! refresh clock, rasterises every chord with `tiny-skia`, and writes the
//! finished drawing as PNG (plus optional intermediate frames and an SVG
//! draw log).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tiny_skia::{
    Color, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Rect, SpreadMode, Stroke,
    Transform,
};
use tracing_subscriber::EnvFilter;
use vinery_pipeline::{
    AnimatorConfig, CoverageMask, Dimensions, DrawInstruction, LineCap, Rgb, SamplerConfig,
    Scene, Scheduler, Session, Surface, VineConfig, WalkConfig,
};

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

/// Grow a vine over relaxed Voronoi cells and animate it arc by arc.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Output PNG path. With several runs, the run number is appended to
    /// the file stem.
    #[arg(short, long, default_value = "vine.png")]
    output: PathBuf,

    /// Surface width in pixels.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// Random seed. A fresh seed is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Nominal point count before oversampling.
    #[arg(long, default_value_t = SamplerConfig::DEFAULT_COUNT)]
    count: usize,

    /// Walk length in moves.
    #[arg(long, default_value_t = WalkConfig::DEFAULT_STEPS)]
    steps: usize,

    /// Centroid relaxation passes.
    #[arg(long, default_value_t = SamplerConfig::DEFAULT_RELAX_PASSES)]
    relax_passes: usize,

    /// Angular step per chord in radians.
    #[arg(long, default_value_t = AnimatorConfig::DEFAULT_ANGULAR_SPEED)]
    speed: f64,

    /// Chords drawn per frame.
    #[arg(long, default_value_t = AnimatorConfig::DEFAULT_SUBSTEPS_PER_FRAME)]
    substeps_per_frame: usize,

    /// Image whose alpha channel restricts where points may land. It is
    /// resized to the surface first.
    #[arg(long, value_name = "IMAGE")]
    mask: Option<PathBuf>,

    /// Directory to write intermediate frames into.
    #[arg(long, value_name = "DIR")]
    frames_dir: Option<PathBuf>,

    /// Write every Nth frame when `--frames-dir` is set.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    frame_every: u64,

    /// Also write the draw log of the first run as SVG.
    #[arg(long, value_name = "PATH")]
    svg: Option<PathBuf>,

    /// Number of drawings to grow. Each one after the first is a restart
    /// of the same session.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    runs: u64,

    /// Full configuration as JSON (overrides individual parameter flags).
    ///
    /// When provided, all other configuration flags are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`VineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<VineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    let mut config = VineConfig::default();
    config.sampler.count = cli.count;
    config.sampler.relax_passes = cli.relax_passes;
    config.walk.steps = cli.steps;
    config.animator.angular_speed = cli.speed;
    config.animator.substeps_per_frame = cli.substeps_per_frame;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Frame clock
// ---------------------------------------------------------------------------

/// Records what the session asked for during one frame.
#[derive(Default)]
struct FrameLoop {
    pending: bool,
    delay: Option<Duration>,
}

impl FrameLoop {
    /// Consume the request, returning whether another frame is due and
    /// how long to wait before it.
    const fn take(&mut self) -> (bool, Option<Duration>) {
        let due = (self.pending, self.delay);
        self.pending = false;
        self.delay = None;
        due
    }
}

impl Scheduler for FrameLoop {
    fn request_frame(&mut self) {
        self.pending = true;
    }

    fn request_frame_after(&mut self, delay: Duration) {
        self.pending = true;
        self.delay = Some(delay);
    }
}

// ---------------------------------------------------------------------------
// Rasterisation
// ---------------------------------------------------------------------------

fn skia_color(rgb: Rgb) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255)
}

const fn skia_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Butt => tiny_skia::LineCap::Butt,
    }
}

/// A `tiny-skia` canvas that also keeps the draw log of the current
/// drawing.
struct PixmapSurface {
    pixmap: Pixmap,
    line_cap: tiny_skia::LineCap,
    draws: Vec<DrawInstruction>,
}

impl PixmapSurface {
    fn new(dimensions: Dimensions) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(dimensions.width, dimensions.height)?,
            line_cap: tiny_skia::LineCap::Round,
            draws: Vec::new(),
        })
    }
}

impl Surface for PixmapSurface {
    #[allow(clippy::cast_precision_loss)]
    fn begin(&mut self, scene: &Scene) {
        self.draws.clear();
        self.line_cap = skia_cap(scene.line_cap);

        let w = self.pixmap.width() as f32;
        let h = self.pixmap.height() as f32;
        let shader = LinearGradient::new(
            tiny_skia::Point::from_xy(0.0, 0.0),
            tiny_skia::Point::from_xy(0.0, h),
            vec![
                GradientStop::new(0.0, skia_color(scene.background_top)),
                GradientStop::new(1.0, skia_color(scene.background_bottom)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        );
        let Some(shader) = shader else {
            self.pixmap.fill(skia_color(scene.background_bottom));
            return;
        };
        let Some(rect) = Rect::from_xywh(0.0, 0.0, w, h) else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: false,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw(&mut self, instruction: &DrawInstruction) {
        self.draws.push(*instruction);

        let mut pb = PathBuilder::new();
        pb.move_to(instruction.x0 as f32, instruction.y0 as f32);
        pb.line_to(instruction.x1 as f32, instruction.y1 as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = Stroke {
            width: instruction.width as f32,
            line_cap: self.line_cap,
            ..Stroke::default()
        };
        let mut paint = Paint::default();
        paint.set_color(skia_color(instruction.stroke));
        paint.anti_alias = true;
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// `vine.png` for a single run, `vine-3.png` for the third of several.
fn run_path(base: &Path, run: u64, runs: u64) -> PathBuf {
    if runs == 1 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("vine");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("png");
    base.with_file_name(format!("{stem}-{}.{ext}", run + 1))
}

fn load_mask(path: &Path, dimensions: Dimensions) -> Result<Box<dyn CoverageMask>, String> {
    let img = image::open(path)
        .map_err(|e| format!("Error reading mask {}: {e}", path.display()))?
        .to_rgba8();
    let resized = image::imageops::resize(
        &img,
        dimensions.width,
        dimensions.height,
        image::imageops::FilterType::Triangle,
    );
    Ok(Box::new(resized))
}

fn write_svg(
    path: &Path,
    surface: &PixmapSurface,
    session: &Session,
    config_json: &str,
    seed: u64,
) {
    let desc = format!("seed {seed}, palette {}", session.scene().palette);
    let metadata = vinery_export::SvgMetadata {
        title: Some("vine"),
        description: Some(&desc),
        config_json: Some(config_json),
    };
    let svg = vinery_export::to_svg(
        &surface.draws,
        session.dimensions(),
        session.scene(),
        &metadata,
    );
    match std::fs::write(path, &svg) {
        Ok(()) => eprintln!("SVG written to {} ({} bytes)", path.display(), svg.len()),
        Err(e) => eprintln!("Error writing SVG to {}: {e}", path.display()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let config_json = serde_json::to_string(&config).unwrap_or_default();

    let dimensions = Dimensions::new(cli.width, cli.height);
    let mask = match cli.mask.as_deref().map(|p| load_mask(p, dimensions)).transpose() {
        Ok(m) => m,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let seed = cli.seed.unwrap_or_else(rand::random);
    eprintln!("Seed: {seed}");
    eprintln!("Surface: {}x{}", dimensions.width, dimensions.height);

    let mut session = match Session::new(config, dimensions, mask, StdRng::seed_from_u64(seed)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Build error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let Some(mut surface) = PixmapSurface::new(dimensions) else {
        eprintln!("Invalid surface size {}x{}", dimensions.width, dimensions.height);
        return ExitCode::FAILURE;
    };

    if let Some(ref dir) = cli.frames_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("Error creating {}: {e}", dir.display());
        return ExitCode::FAILURE;
    }

    let mut clock = FrameLoop::default();
    let mut run = 0;
    let mut frame = 0_u64;
    loop {
        if let Err(e) = session.frame(&mut surface, &mut clock) {
            eprintln!("Build error: {e}");
            return ExitCode::FAILURE;
        }
        frame += 1;

        if let Some(ref dir) = cli.frames_dir
            && frame % cli.frame_every == 0
        {
            let path = dir.join(format!("frame-{frame:06}.png"));
            if let Err(e) = surface.pixmap.save_png(&path) {
                eprintln!("Error writing {}: {e}", path.display());
            }
        }

        let (due, delay) = clock.take();
        if due {
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
            continue;
        }

        // The drawing finished without asking for another frame.
        let path = run_path(&cli.output, run, cli.runs);
        match surface.pixmap.save_png(&path) {
            Ok(()) => eprintln!(
                "Run {}/{}: {} arcs, {} chords, palette {} -> {}",
                run + 1,
                cli.runs,
                session.path().arcs.len(),
                surface.draws.len(),
                session.scene().palette,
                path.display(),
            ),
            Err(e) => {
                eprintln!("Error writing {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
        if run == 0
            && let Some(ref svg_path) = cli.svg
        {
            write_svg(svg_path, &surface, &session, &config_json, seed);
        }

        run += 1;
        if run == cli.runs {
            break;
        }
        session.restart(&mut clock);
        if let (_, Some(delay)) = clock.take() {
            std::thread::sleep(delay);
        }
    }

    ExitCode::SUCCESS
}
