use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flockview_common::SurfaceGeometry;
use flockview_driver::{
    DriverConfig, DriverStats, EngineFailurePolicy, FixedRateScheduler, FrameScheduler, FrameTick,
    ManualScheduler, SimulationDriver,
};
use flockview_input::{ControlBinding, TRAIN_CONTROL_ID};
use flockview_kernel::{DemoEngine, DemoEngineConfig, Engine, MAX_GENERATION_LENGTH, SharedEngine};
use flockview_render::{FrameCompositor, PixelCanvas, RecordingContext, prepare_context};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flockview", about = "Drive and render a population simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the render loop headless onto a pixel canvas
    Run(RunArgs),
    /// Print the draw calls of a single frame
    Trace(WorldArgs),
}

#[derive(Args)]
struct WorldArgs {
    /// Logical surface width
    #[arg(long, default_value = "800")]
    width: f32,
    /// Logical surface height
    #[arg(long, default_value = "600")]
    height: f32,
    /// Device pixel ratio
    #[arg(long, default_value = "1.0")]
    scale: f32,
    /// RNG seed for the demo engine
    #[arg(short, long, default_value = "42")]
    seed: u64,
    /// Number of agents
    #[arg(long, default_value = "40")]
    agents: usize,
    /// Number of food items
    #[arg(long, default_value = "60")]
    foods: usize,
    /// Ticks per generation
    #[arg(
        long,
        default_value = "2500",
        value_parser = clap::value_parser!(u64).range(0..=MAX_GENERATION_LENGTH)
    )]
    generation_length: u64,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    world: WorldArgs,
    /// Frames to run before the host shuts the loop down
    #[arg(short, long, default_value = "600")]
    frames: u64,
    /// Frame rate; ignored with --unpaced
    #[arg(long, default_value = "60")]
    fps: u32,
    /// Grant frames back to back without waiting
    #[arg(long)]
    unpaced: bool,
    /// What to do when the engine fails mid-loop
    #[arg(long, value_enum, default_value_t = FailurePolicy::Halt)]
    on_engine_failure: FailurePolicy,
    /// With `skip`, halt after this many failed frames in a row
    #[arg(long)]
    max_consecutive_failures: Option<u32>,
    /// Press the train control just before these frame indices
    #[arg(long, value_delimiter = ',')]
    train_at: Vec<u64>,
    /// Write the last frame as PNG
    #[arg(long)]
    png: Option<PathBuf>,
    /// Write the final world snapshot as JSON
    #[arg(long)]
    snapshot_json: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailurePolicy {
    Halt,
    Skip,
}

impl From<FailurePolicy> for EngineFailurePolicy {
    fn from(p: FailurePolicy) -> Self {
        match p {
            FailurePolicy::Halt => EngineFailurePolicy::Halt,
            FailurePolicy::Skip => EngineFailurePolicy::SkipFrame,
        }
    }
}

impl WorldArgs {
    fn geometry(&self) -> Result<SurfaceGeometry> {
        SurfaceGeometry::new(self.width, self.height, self.scale)
            .context("invalid surface geometry")
    }

    fn engine(&self) -> DemoEngine {
        DemoEngine::new(DemoEngineConfig {
            agents: self.agents,
            foods: self.foods,
            generation_length: self.generation_length,
            seed: self.seed,
        })
    }
}

/// Host wrapper that presses the train control before selected frames,
/// out of band from the driver.
struct ScriptedClicks<S, E> {
    inner: S,
    control: ControlBinding<E>,
    pending: BTreeSet<u64>,
}

impl<S: FrameScheduler, E: Engine> FrameScheduler for ScriptedClicks<S, E> {
    fn next_frame(&mut self) -> impl Future<Output = Option<FrameTick>> {
        async move {
            let tick = self.inner.next_frame().await?;
            if self.pending.remove(&tick.index) {
                if let Err(e) = self.control.on_trigger(TRAIN_CONTROL_ID) {
                    tracing::warn!(frame = tick.index, "train click failed: {e}");
                }
            }
            Some(tick)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Info => {
            println!("flockview v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", flockview_render::crate_info());
            println!("input: {}", flockview_input::crate_info());
            println!("driver: {}", flockview_driver::crate_info());
        }
        Commands::Run(args) => run(args)?,
        Commands::Trace(args) => trace(args)?,
    }

    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    let geometry = args.world.geometry()?;
    let engine = SharedEngine::new(args.world.engine());
    let control = ControlBinding::train(engine.clone());

    let config = DriverConfig {
        on_engine_failure: args.on_engine_failure.into(),
        max_consecutive_failures: args.max_consecutive_failures,
    };
    let canvas = PixelCanvas::new(&geometry).context("failed to allocate drawing surface")?;
    let mut driver = SimulationDriver::new(engine.clone(), canvas, geometry, config);
    tracing::info!(
        width = geometry.width(),
        height = geometry.height(),
        scale = geometry.scale(),
        frames = args.frames,
        "starting render loop"
    );

    let pending: BTreeSet<u64> = args.train_at.iter().copied().collect();
    let stats = if args.unpaced {
        let scheduler = ScriptedClicks {
            inner: ManualScheduler::new(args.frames),
            control,
            pending,
        };
        drive(&mut driver, scheduler)?
    } else {
        let inner = FixedRateScheduler::with_fps(args.fps).with_limit(args.frames);
        tracing::debug!(interval = ?inner.interval(), "pacing frames");
        let scheduler = ScriptedClicks {
            inner,
            control,
            pending,
        };
        drive(&mut driver, scheduler)?
    };

    println!(
        "frames rendered={} skipped={} last frame: {} foods, {} agents",
        stats.frames_rendered,
        stats.frames_skipped,
        stats.last_frame.discs,
        stats.last_frame.triangles
    );

    if let Some(path) = &args.snapshot_json {
        let snapshot = engine.world().context("failed to read final snapshot")?;
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &snapshot)?;
        println!("snapshot written to {}", path.display());
    }

    if let Some(path) = &args.png {
        save_png(&driver.into_context(), path)?;
        println!("frame written to {}", path.display());
    }

    Ok(())
}

fn drive<E, S>(
    driver: &mut SimulationDriver<E, PixelCanvas>,
    mut scheduler: S,
) -> Result<DriverStats>
where
    E: Engine,
    S: FrameScheduler,
{
    pollster::block_on(driver.run(&mut scheduler)).context("render loop halted")
}

fn trace(args: WorldArgs) -> Result<()> {
    let geometry = args.geometry()?;
    let engine = SharedEngine::new(args.engine());
    let mut ctx = RecordingContext::new();
    prepare_context(&mut ctx, &geometry);

    engine.step()?;
    let stats = FrameCompositor::new(geometry).compose(&mut ctx, &engine)?;
    print!("{}", ctx.to_text());
    println!("-- {} primitives", stats.primitives());
    Ok(())
}

fn save_png(canvas: &PixelCanvas, path: &Path) -> Result<()> {
    let (width, height) = (canvas.width(), canvas.height());
    let image = image::RgbaImage::from_raw(width, height, canvas.as_rgba().to_vec())
        .context("canvas buffer does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
