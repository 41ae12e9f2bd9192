use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slide_tiler_rs::logger;
use slide_tiler_rs::tiling::config::{pixel_value, tile_size_value};
use slide_tiler_rs::tiling::{
    BatchOptions, BatchPipeline, CancellationToken, SlideTilingPipeline, TilingConfig,
    load_geojson,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Cut slides and their GeoJSON annotations into tiles and masks")]
struct Arguments {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tile one slide with one GeoJSON file.
    Single(SingleArgs),
    /// Tile every slide in a directory, pairing GeoJSON files by name prefix.
    Batch(BatchArgs),
}

#[derive(Args)]
struct TilingArgs {
    /// Tile edge length in pixels.
    #[arg(long, alias = "tile_size", default_value_t = 2000, allow_negative_numbers = true)]
    tile_size: i64,
    /// Mask value for annotated pixels (0-255).
    #[arg(long, alias = "mask_value", default_value_t = 255, allow_negative_numbers = true)]
    mask_value: i64,
    /// Mask value for background pixels (0-255).
    #[arg(long, alias = "background_value", default_value_t = 0, allow_negative_numbers = true)]
    background_value: i64,
    /// Only save tiles that contain annotations.
    #[arg(long, alias = "only_annotated")]
    save_only_annotated: bool,
    /// JPEG quality for tile images (1-100).
    #[arg(long, default_value_t = 95)]
    jpeg_quality: u8,
}

impl TilingArgs {
    fn to_config(&self) -> slide_tiler_rs::tiling::Result<TilingConfig> {
        TilingConfig::builder()
            .tile_size(tile_size_value(self.tile_size)?)
            .mask_value(pixel_value("mask_value", self.mask_value)?)
            .background_value(pixel_value("background_value", self.background_value)?)
            .save_only_annotated(self.save_only_annotated)
            .jpeg_quality(self.jpeg_quality)
            .build()
    }
}

#[derive(Args)]
struct SingleArgs {
    /// Slide image to tile.
    #[arg(long)]
    slide: PathBuf,
    /// GeoJSON file with the slide's annotations.
    #[arg(long)]
    geojson: PathBuf,
    /// Output directory; tiles land in <output>/<slide name>/.
    #[arg(long, short = 'o', alias = "output_dir")]
    output: PathBuf,
    #[command(flatten)]
    tiling: TilingArgs,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory containing slide images.
    #[arg(long, alias = "slides_dir")]
    slides_dir: PathBuf,
    /// Directory containing GeoJSON files.
    #[arg(long, alias = "geojson_dir")]
    geojson_dir: PathBuf,
    /// Output directory for all tiles, masks and the CSV summary.
    #[arg(long, short = 'o', alias = "output_dir")]
    output: PathBuf,
    /// Comma-separated slide extensions, e.g. ".tif,.svs".
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,
    #[command(flatten)]
    tiling: TilingArgs,
}

fn main() -> Result<()> {
    let arguments = Arguments::parse();
    logger::init(arguments.verbose);

    match arguments.command {
        Command::Single(args) => run_single(args),
        Command::Batch(args) => run_batch(args),
    }
}

fn run_single(args: SingleArgs) -> Result<()> {
    let config = args.tiling.to_config()?;
    info!(tile_size = config.tile_size, "Starting slide tiling");

    let annotations = load_geojson(&args.geojson)?;
    let pipeline = SlideTilingPipeline::new(config);

    match pipeline.tile_file(&args.slide, &annotations, &args.output) {
        Ok(stats) => {
            info!(
                total = stats.total_tiles,
                annotated = stats.tiles_with_annotations,
                saved = stats.saved_tiles,
                "Done"
            );
            Ok(())
        }
        Err(e) if e.is_skip() => {
            warn!("{}. Nothing to do.", e);
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("tile {}", args.slide.display())),
    }
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let config = args.tiling.to_config()?;
    info!(tile_size = config.tile_size, "Starting batch tiling");

    let mut options = BatchOptions::new(args.slides_dir, args.geojson_dir, args.output);
    if let Some(extensions) = args.extensions {
        options = options.with_extensions(
            extensions
                .into_iter()
                .map(|ext| ext.trim().to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
        );
    }

    let stats = BatchPipeline::new(config)
        .run(&options, &CancellationToken::new())
        .context("batch processing failed")?;

    info!(
        processed = stats.processed.len(),
        skipped = stats.skipped,
        "Batch complete"
    );
    Ok(())
}
