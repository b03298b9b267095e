use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use framefx::assets::decode::{list_image_files, load_frame};
use framefx::{
    BackgroundModel, FxResult, MosaicComposer, ParticleMorphEngine, PixelBuffer, PngSequenceSink,
    SegmapMode, Settings, TileLibrary, WorkerPool,
};

#[derive(Parser, Debug)]
#[command(name = "framefx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run ViBe background subtraction over an image sequence.
    Segment(SegmentArgs),
    /// Turn an image, or every image in a directory, into a photo mosaic.
    Mosaic(MosaicArgs),
    /// Render a particle morph from one image to another.
    Morph(MorphArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Settings JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dedicated worker threads (default: rayon global pool).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct SegmentArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory of input frames, processed in file-name order.
    #[arg(long)]
    frames: PathBuf,

    /// Output directory for segmentation maps.
    #[arg(long)]
    out: PathBuf,

    /// Segmentation map mode: segmap, background or foreground.
    #[arg(long)]
    mode: Option<SegmapMode>,

    /// Reinitialize the model when the camera moves.
    #[arg(long, default_value_t = false)]
    shaky: bool,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct MosaicArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Input image or directory of images.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Tile image directory.
    #[arg(long)]
    tiles: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Tile edge length in pixels.
    #[arg(long)]
    tile_size: Option<u32>,
}

#[derive(Parser, Debug)]
struct MorphArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Image the particles start from.
    #[arg(long)]
    source: PathBuf,

    /// Image whose layout the particles end in.
    #[arg(long)]
    target: PathBuf,

    /// Output directory for the rendered frames.
    #[arg(long)]
    out: PathBuf,

    /// Particle edge length in pixels.
    #[arg(long)]
    particle_size: Option<u32>,

    /// Number of frames in the transition.
    #[arg(long)]
    steps: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Segment(args) => cmd_segment(args),
        Command::Mosaic(args) => cmd_mosaic(args),
        Command::Morph(args) => cmd_morph(args),
    }
}

fn load_settings(common: &CommonArgs) -> anyhow::Result<Settings> {
    let mut settings = match &common.config {
        Some(path) => Settings::from_path(path)?,
        None => Settings::default(),
    };
    if common.threads.is_some() {
        settings.threads = common.threads;
    }
    Ok(settings)
}

fn worker_pool(settings: &Settings) -> anyhow::Result<WorkerPool> {
    Ok(WorkerPool::new(settings.threads)?)
}

fn read_sequence(dir: &Path) -> anyhow::Result<impl Iterator<Item = FxResult<PixelBuffer>>> {
    let paths = list_image_files(dir)?;
    anyhow::ensure!(!paths.is_empty(), "no images found in '{}'", dir.display());
    Ok(paths.into_iter().map(|p| load_frame(&p)))
}

fn cmd_segment(args: SegmentArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(&args.common)?;
    if let Some(mode) = args.mode {
        settings.vibe.segmap_mode = mode;
    }
    if args.shaky {
        settings.vibe.shaky_camera = true;
    }
    if args.seed.is_some() {
        settings.vibe.seed = args.seed;
    }
    settings.validate()?;
    tracing::info!(
        mode = settings.vibe.segmap_mode.label(),
        shaky = settings.vibe.shaky_camera,
        "segmenting"
    );

    let mut model =
        BackgroundModel::new(settings.vibe.clone())?.with_pool(worker_pool(&settings)?);
    let frames = read_sequence(&args.frames)?;
    let mut sink = PngSequenceSink::new(&args.out, "segmap");
    let n = framefx::segment_frames(&mut model, frames, &mut sink)
        .with_context(|| format!("segment '{}'", args.frames.display()))?;

    eprintln!("wrote {n} segmentation maps to {}", args.out.display());
    Ok(())
}

fn cmd_mosaic(args: MosaicArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(&args.common)?;
    if let Some(tiles) = args.tiles {
        settings.mosaic.tile_directory = tiles;
    }
    if let Some(size) = args.tile_size {
        settings.mosaic.tile_size = size;
    }
    settings.validate()?;

    let library = Arc::new(TileLibrary::new(
        settings.mosaic.tile_directory.clone(),
        settings.mosaic.tile_size,
    )?);
    let composer = MosaicComposer::with_library(settings.mosaic.clone(), library)?
        .with_pool(worker_pool(&settings)?);
    if composer.library().is_fallback()? {
        tracing::warn!(
            dir = %settings.mosaic.tile_directory.display(),
            "no tiles loaded, composing with the fallback palette"
        );
    }

    let mut sink = PngSequenceSink::new(&args.out, "mosaic");
    let result = if args.in_path.is_dir() {
        framefx::mosaic_frames(&composer, read_sequence(&args.in_path)?, &mut sink)
    } else {
        framefx::mosaic_frames(&composer, [load_frame(&args.in_path)], &mut sink)
    };
    let n = result.with_context(|| format!("mosaic '{}'", args.in_path.display()))?;

    eprintln!("wrote {n} mosaic frames to {}", args.out.display());
    Ok(())
}

fn cmd_morph(args: MorphArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(&args.common)?;
    if let Some(size) = args.particle_size {
        settings.morph.particle_size = size;
    }
    if let Some(steps) = args.steps {
        settings.morph.total_steps = steps;
    }
    settings.validate()?;

    let source = load_frame(&args.source)?;
    let target = load_frame(&args.target)?;
    let mut engine =
        ParticleMorphEngine::new(settings.morph.clone())?.with_pool(worker_pool(&settings)?);
    engine.initialize(&source, &target).with_context(|| {
        format!(
            "pair '{}' with '{}'",
            args.source.display(),
            args.target.display()
        )
    })?;

    let mut sink = PngSequenceSink::new(&args.out, "morph");
    let n = framefx::morph_frames(&engine, &mut sink)?;

    eprintln!(
        "wrote {n} morph frames ({} ms apart) to {}",
        engine.frame_delay_ms(),
        args.out.display()
    );
    Ok(())
}
