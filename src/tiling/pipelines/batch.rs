use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use crate::tiling::{
    annotation::{DEFAULT_SLIDE_EXTENSIONS, discover_slides, find_matching_geojson, load_geojson},
    common::error::{Result, TilingError},
    config::TilingConfig,
    output::{StandardTileWriter, TileWriter},
    pipelines::{
        cancellation::CancellationToken,
        slide_tiling::{SlideTilingPipeline, slide_stem},
    },
    slide::{AutoSlideReader, SlideReader},
    stats::{BatchStats, SUMMARY_FILE_NAME, SlideStats},
};

/// Directories and file filter for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub slides_dir: PathBuf,
    pub geojson_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Slide extensions including the leading dot, compared case-insensitively
    pub extensions: Vec<String>,
}

impl BatchOptions {
    pub fn new<P: Into<PathBuf>>(slides_dir: P, geojson_dir: P, output_dir: P) -> Self {
        Self {
            slides_dir: slides_dir.into(),
            geojson_dir: geojson_dir.into(),
            output_dir: output_dir.into(),
            extensions: DEFAULT_SLIDE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }
}

/// Runs the slide pipeline over every matched slide in a directory. A failing
/// slide is logged and skipped; only configuration and directory errors end
/// the batch.
pub struct BatchPipeline<R: SlideReader, W: TileWriter> {
    slide_pipeline: SlideTilingPipeline<R, W>,
}

impl BatchPipeline<AutoSlideReader, StandardTileWriter> {
    pub fn new(config: TilingConfig) -> Self {
        Self {
            slide_pipeline: SlideTilingPipeline::new(config),
        }
    }
}

impl<R: SlideReader, W: TileWriter> BatchPipeline<R, W> {
    pub fn with_pipeline(slide_pipeline: SlideTilingPipeline<R, W>) -> Self {
        Self { slide_pipeline }
    }

    pub fn config(&self) -> &TilingConfig {
        self.slide_pipeline.config()
    }

    #[instrument(skip_all, fields(slides_dir = %options.slides_dir.display()))]
    pub fn run(&self, options: &BatchOptions, cancel: &CancellationToken) -> Result<BatchStats> {
        self.config().validate()?;

        std::fs::create_dir_all(&options.output_dir).map_err(|e| {
            TilingError::IoFailure(format!("{}: {}", options.output_dir.display(), e))
        })?;

        let slides = discover_slides(&options.slides_dir, &options.extensions)?;
        info!(
            geojson_dir = %options.geojson_dir.display(),
            "Found {} slide files",
            slides.len()
        );

        let mut batch = BatchStats {
            slides_found: slides.len(),
            ..BatchStats::default()
        };

        for (position, slide_path) in slides.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    remaining = slides.len() - position,
                    "Batch cancelled, stopping before next slide"
                );
                batch.cancelled = true;
                break;
            }

            info!(
                "[{}/{}] Processing slide: {}",
                position + 1,
                slides.len(),
                slide_path.display()
            );

            match self.process_slide(slide_path, options) {
                Ok(stats) => batch.record(stats),
                Err(e) if e.is_skip() => {
                    warn!("{}. Skipping this slide.", e);
                    batch.record_skip();
                }
                Err(e) => {
                    error!(slide = %slide_path.display(), "Error processing slide: {}", e);
                    batch.record_skip();
                }
            }
        }

        batch.log_summary();
        if !batch.processed.is_empty() {
            batch.write_csv(&options.output_dir.join(SUMMARY_FILE_NAME))?;
        }

        Ok(batch)
    }

    fn process_slide(&self, slide_path: &Path, options: &BatchOptions) -> Result<SlideStats> {
        let geojson_path = find_matching_geojson(slide_path, &options.geojson_dir)?
            .ok_or_else(|| TilingError::NoMatchingAnnotation(slide_path.display().to_string()))?;

        let annotations = load_geojson(&geojson_path)?;
        if annotations.is_empty() {
            return Err(TilingError::EmptyAnnotationSet(slide_stem(slide_path)));
        }

        self.slide_pipeline
            .tile_file(slide_path, &annotations, &options.output_dir)
    }
}
