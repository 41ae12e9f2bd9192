use std::path::Path;

use tracing::{debug, info, instrument};

use crate::tiling::{
    annotation::Annotation,
    common::error::{Result, TilingError},
    config::TilingConfig,
    extract::extract_tile,
    geometry::{intersect_annotation, rasterize_mask},
    grid::{TileCell, TileGrid},
    output::{OutputLayout, StandardTileWriter, TileWriter},
    progress::{LogProgress, ProgressEvent, ProgressSink},
    slide::{AutoSlideReader, SlideRaster, SlideReader},
    stats::SlideStats,
};

/// Tiles one slide at a time: grid planning, per-cell extraction, clipping,
/// mask rasterization, save filtering and counting.
pub struct SlideTilingPipeline<R: SlideReader, W: TileWriter> {
    reader: R,
    writer: W,
    config: TilingConfig,
}

impl SlideTilingPipeline<AutoSlideReader, StandardTileWriter> {
    pub fn new(config: TilingConfig) -> Self {
        Self {
            reader: AutoSlideReader,
            writer: StandardTileWriter,
            config,
        }
    }
}

impl<R: SlideReader, W: TileWriter> SlideTilingPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: TilingConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    /// Tiles an already decoded slide into `<output_dir>/<slide_name>/`.
    ///
    /// Tile indices follow row-major grid order and advance for every cell,
    /// saved or not. A failure part way through leaves earlier files in place.
    #[instrument(skip(self, slide, annotations, output_dir, progress), fields(width = slide.width(), height = slide.height()))]
    pub fn tile_slide(
        &self,
        slide: &SlideRaster,
        annotations: &[Annotation],
        slide_name: &str,
        output_dir: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<SlideStats> {
        self.config.validate()?;
        if annotations.is_empty() {
            return Err(TilingError::EmptyAnnotationSet(slide_name.to_string()));
        }

        let tile_size = self.config.tile_size;
        let grid = {
            let _span = tracing::info_span!("plan_grid", tile_size).entered();
            TileGrid::plan(slide.width(), slide.height(), tile_size)?
        };
        let total_cells = grid.len();

        let layout = OutputLayout::for_slide(output_dir, slide_name);
        self.writer.prepare(&layout)?;

        info!(
            cols = grid.cols(),
            rows = grid.rows(),
            save_only_annotated = self.config.save_only_annotated,
            "Will process {} tiles",
            total_cells
        );

        let mut tile_index = 0usize;
        let mut tiles_with_annotations = 0usize;
        let mut saved_tiles = 0usize;

        {
            let _span = tracing::info_span!("tile_cells", total_cells).entered();
            for cell in grid.cells() {
                let outcome = self.process_cell(slide, annotations, &cell, &layout, tile_index)?;

                if outcome.annotated {
                    tiles_with_annotations += 1;
                }
                if outcome.saved {
                    saved_tiles += 1;
                }
                tile_index += 1;

                progress.on_progress(&ProgressEvent {
                    cells_processed: tile_index,
                    total_cells,
                    annotated_count: tiles_with_annotations,
                    saved_count: saved_tiles,
                });
            }
        }

        info!(
            total = tile_index,
            annotated = tiles_with_annotations,
            saved = saved_tiles,
            tiles_dir = %layout.tiles_dir.display(),
            masks_dir = %layout.masks_dir.display(),
            "Slide processing complete"
        );

        Ok(SlideStats {
            filename: slide_name.to_string(),
            total_tiles: tile_index,
            tiles_with_annotations,
            saved_tiles,
            tiles_dir: layout.tiles_dir,
            masks_dir: layout.masks_dir,
        })
    }

    fn process_cell(
        &self,
        slide: &SlideRaster,
        annotations: &[Annotation],
        cell: &TileCell,
        layout: &OutputLayout,
        tile_index: usize,
    ) -> Result<CellOutcome> {
        let mut annotated = false;
        let mut pieces = Vec::new();
        for annotation in annotations {
            let (intersects, intersection) = intersect_annotation(annotation, cell);
            if intersects {
                annotated = true;
                pieces.extend(intersection.into_pieces());
            }
        }

        let saved = !self.config.save_only_annotated || annotated;
        if saved {
            let tile = extract_tile(slide, cell, self.config.tile_size);
            let mask = rasterize_mask(
                self.config.tile_size,
                self.config.background_value,
                self.config.mask_value,
                &pieces,
            );
            self.writer
                .write_tile(layout, tile_index, &tile, &mask, &self.config)?;
        }

        debug!(
            index = tile_index,
            row = cell.row,
            col = cell.col,
            pieces = pieces.len(),
            annotated,
            saved,
            "Processed cell"
        );

        Ok(CellOutcome { annotated, saved })
    }

    /// Reads and decodes a slide file with the configured reader.
    #[instrument(skip(self, slide_path), fields(slide = %slide_path.as_ref().display()))]
    pub fn read_slide_file<P: AsRef<Path>>(&self, slide_path: P) -> Result<SlideRaster> {
        let slide_path = slide_path.as_ref();

        let data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(slide_path).map_err(|e| {
                TilingError::DecodeFailure(format!("{}: {}", slide_path.display(), e))
            })?
        };

        let slide = {
            let _span = tracing::info_span!("decode_slide").entered();
            self.reader.read_slide(&data)?
        };

        info!(
            width = slide.width(),
            height = slide.height(),
            "Slide dimensions: {} x {}",
            slide.width(),
            slide.height()
        );
        Ok(slide)
    }

    /// Decodes `slide_path` and tiles it into `<output_dir>/<file stem>/`.
    pub fn tile_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        slide_path: P,
        annotations: &[Annotation],
        output_dir: Q,
    ) -> Result<SlideStats> {
        self.tile_file_with_progress(slide_path, annotations, output_dir, &mut LogProgress::default())
    }

    pub fn tile_file_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        slide_path: P,
        annotations: &[Annotation],
        output_dir: Q,
        progress: &mut dyn ProgressSink,
    ) -> Result<SlideStats> {
        let slide_path = slide_path.as_ref();
        let slide_name = slide_stem(slide_path);

        self.config.validate()?;
        if annotations.is_empty() {
            return Err(TilingError::EmptyAnnotationSet(slide_name));
        }

        let slide = self.read_slide_file(slide_path)?;
        self.tile_slide(&slide, annotations, &slide_name, output_dir.as_ref(), progress)
    }

    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TilingConfig) {
        self.config = config;
    }
}

struct CellOutcome {
    annotated: bool,
    saved: bool,
}

/// File name without its final extension, used as the slide's output directory.
pub fn slide_stem(slide_path: &Path) -> String {
    slide_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slide".to_string())
}
