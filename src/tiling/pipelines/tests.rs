use std::path::Path;
use std::sync::{Arc, Mutex};

use image::{GrayImage, Rgb, RgbImage};

use crate::tiling::annotation::Annotation;
use crate::tiling::common::error::{Result, TilingError};
use crate::tiling::config::TilingConfig;
use crate::tiling::output::{OutputLayout, TileWriter};
use crate::tiling::pipelines::{BatchOptions, BatchPipeline, CancellationToken, SlideTilingPipeline};
use crate::tiling::progress::{NoProgress, ProgressEvent};
use crate::tiling::slide::{SlideRaster, SlideReader};

struct MockReader {
    should_fail: bool,
    width: u32,
    height: u32,
}

impl SlideReader for MockReader {
    fn read_slide(&self, _data: &[u8]) -> Result<SlideRaster> {
        if self.should_fail {
            return Err(TilingError::DecodeFailure("Mock decode error".to_string()));
        }
        Ok(SlideRaster::new(RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb([200, 100, 50]),
        )))
    }
}

#[derive(Debug, Clone)]
struct WrittenTile {
    index: usize,
    tile_dimensions: (u32, u32),
    mask: GrayImage,
}

#[derive(Default)]
struct MockWriter {
    fail_prepare: bool,
    fail_at_index: Option<usize>,
    written: Arc<Mutex<Vec<WrittenTile>>>,
}

impl TileWriter for MockWriter {
    fn prepare(&self, _layout: &OutputLayout) -> Result<()> {
        if self.fail_prepare {
            return Err(TilingError::IoFailure("Mock mkdir error".to_string()));
        }
        Ok(())
    }

    fn write_tile(
        &self,
        _layout: &OutputLayout,
        index: usize,
        tile: &RgbImage,
        mask: &GrayImage,
        _config: &TilingConfig,
    ) -> Result<()> {
        if self.fail_at_index == Some(index) {
            return Err(TilingError::IoFailure("Mock write error".to_string()));
        }
        self.written.lock().unwrap().push(WrittenTile {
            index,
            tile_dimensions: tile.dimensions(),
            mask: mask.clone(),
        });
        Ok(())
    }
}

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Annotation {
    Annotation::from_exterior(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)])
}

fn slide(width: u32, height: u32) -> SlideRaster {
    SlideRaster::new(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])))
}

fn pipeline(config: TilingConfig, writer: MockWriter) -> SlideTilingPipeline<MockReader, MockWriter> {
    SlideTilingPipeline::with_custom(
        MockReader {
            should_fail: false,
            width: 64,
            height: 64,
        },
        writer,
        config,
    )
}

fn config(tile_size: u32, save_only_annotated: bool) -> TilingConfig {
    TilingConfig::builder()
        .tile_size(tile_size)
        .save_only_annotated(save_only_annotated)
        .build()
        .unwrap()
}

#[test]
fn test_all_tiles_saved_by_default() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(2000, false), writer);

    let stats = pipeline
        .tile_slide(
            &slide(3000, 2500),
            &[square(100.0, 100.0, 200.0, 200.0)],
            "scan",
            Path::new("out"),
            &mut NoProgress,
        )
        .unwrap();

    assert_eq!(stats.total_tiles, 4);
    assert_eq!(stats.tiles_with_annotations, 1);
    assert_eq!(stats.saved_tiles, 4);
    assert_eq!(stats.filename, "scan");

    let written = written.lock().unwrap();
    let indices: Vec<_> = written.iter().map(|w| w.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    assert!(written.iter().all(|w| w.tile_dimensions == (2000, 2000)));
    assert!(written.iter().all(|w| w.mask.dimensions() == (2000, 2000)));
}

#[test]
fn test_square_annotation_mask_in_first_tile() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(2000, false), writer);

    pipeline
        .tile_slide(
            &slide(2000, 2000),
            &[square(100.0, 100.0, 200.0, 200.0)],
            "scan",
            Path::new("out"),
            &mut NoProgress,
        )
        .unwrap();

    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    for (x, y, pixel) in written[0].mask.enumerate_pixels() {
        let inside = (100..=200).contains(&x) && (100..=200).contains(&y);
        assert_eq!(pixel.0[0], if inside { 255 } else { 0 });
    }
}

#[test]
fn test_save_only_annotated_keeps_global_indices() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(10, true), writer);

    // 3x2 grid; annotations hit cells 1 and 5 only
    let annotations = [square(12.0, 2.0, 18.0, 8.0), square(22.0, 12.0, 28.0, 18.0)];
    let stats = pipeline
        .tile_slide(&slide(30, 20), &annotations, "scan", Path::new("out"), &mut NoProgress)
        .unwrap();

    assert_eq!(stats.total_tiles, 6);
    assert_eq!(stats.tiles_with_annotations, 2);
    assert_eq!(stats.saved_tiles, stats.tiles_with_annotations);

    let indices: Vec<_> = written.lock().unwrap().iter().map(|w| w.index).collect();
    assert_eq!(indices, vec![1, 5]);
}

#[test]
fn test_point_annotations_mark_tiles_with_blank_masks() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(10, true), writer);

    let annotations = [Annotation::point(geo::Point::new(25.0, 15.0))];
    let stats = pipeline
        .tile_slide(&slide(30, 20), &annotations, "scan", Path::new("out"), &mut NoProgress)
        .unwrap();

    assert_eq!(stats.tiles_with_annotations, 1);
    assert_eq!(stats.saved_tiles, 1);

    let written = written.lock().unwrap();
    assert_eq!(written[0].index, 5);
    assert!(written[0].mask.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn test_annotation_spanning_cells_marks_each() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(10, true), writer);

    let stats = pipeline
        .tile_slide(
            &slide(20, 10),
            &[square(5.0, 2.0, 15.0, 6.0)],
            "scan",
            Path::new("out"),
            &mut NoProgress,
        )
        .unwrap();

    assert_eq!(stats.tiles_with_annotations, 2);
    let written = written.lock().unwrap();
    let left = &written[0].mask;
    let right = &written[1].mask;
    assert_eq!(left.get_pixel(7, 4).0[0], 255);
    assert_eq!(left.get_pixel(2, 4).0[0], 0);
    assert_eq!(right.get_pixel(3, 4).0[0], 255);
    assert_eq!(right.get_pixel(8, 4).0[0], 0);
}

#[test]
fn test_mask_values_follow_config() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let config = TilingConfig::builder()
        .tile_size(16)
        .mask_value(1)
        .background_value(9)
        .build()
        .unwrap();
    let pipeline = pipeline(config, writer);

    pipeline
        .tile_slide(
            &slide(16, 16),
            &[square(2.0, 2.0, 5.0, 5.0), square(4.0, 4.0, 8.0, 8.0)],
            "scan",
            Path::new("out"),
            &mut NoProgress,
        )
        .unwrap();

    let written = written.lock().unwrap();
    let mask = &written[0].mask;
    assert!(mask.pixels().all(|p| p.0[0] == 1 || p.0[0] == 9));
    assert_eq!(mask.get_pixel(3, 3).0[0], 1);
    assert_eq!(mask.get_pixel(7, 7).0[0], 1);
    assert_eq!(mask.get_pixel(12, 12).0[0], 9);
}

#[test]
fn test_repeated_runs_are_identical() {
    let annotations = [square(3.5, 4.2, 27.9, 13.1), square(0.0, 15.0, 9.0, 25.0)];
    let run = || {
        let written = Arc::new(Mutex::new(Vec::new()));
        let writer = MockWriter {
            written: written.clone(),
            ..MockWriter::default()
        };
        pipeline(config(10, false), writer)
            .tile_slide(&slide(33, 27), &annotations, "scan", Path::new("out"), &mut NoProgress)
            .unwrap();
        let tiles = written.lock().unwrap().clone();
        tiles
            .into_iter()
            .map(|w| (w.index, w.mask.into_raw()))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_empty_annotation_set_is_skip() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(10, false), writer);

    let result = pipeline.tile_slide(&slide(20, 20), &[], "scan", Path::new("out"), &mut NoProgress);

    match result {
        Err(e @ TilingError::EmptyAnnotationSet(_)) => assert!(e.is_skip()),
        other => panic!("expected empty annotation skip, got {:?}", other),
    }
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_prepare_failure_aborts_before_tiles() {
    let writer = MockWriter {
        fail_prepare: true,
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(10, false), writer);

    let result = pipeline.tile_slide(
        &slide(20, 20),
        &[square(1.0, 1.0, 2.0, 2.0)],
        "scan",
        Path::new("out"),
        &mut NoProgress,
    );

    assert!(matches!(result, Err(TilingError::IoFailure(_))));
}

#[test]
fn test_write_failure_aborts_slide_keeping_earlier_tiles() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        fail_at_index: Some(2),
        written: written.clone(),
        ..MockWriter::default()
    };
    let pipeline = pipeline(config(10, false), writer);

    let result = pipeline.tile_slide(
        &slide(40, 10),
        &[square(1.0, 1.0, 2.0, 2.0)],
        "scan",
        Path::new("out"),
        &mut NoProgress,
    );

    assert!(matches!(result, Err(TilingError::IoFailure(_))));
    assert_eq!(written.lock().unwrap().len(), 2);
}

#[test]
fn test_invalid_config_fails_fast() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter {
        written: written.clone(),
        ..MockWriter::default()
    };
    let mut pipeline = pipeline(TilingConfig::default(), writer);
    pipeline.set_config(TilingConfig {
        tile_size: 0,
        ..TilingConfig::default()
    });

    let result = pipeline.tile_slide(
        &slide(20, 20),
        &[square(1.0, 1.0, 2.0, 2.0)],
        "scan",
        Path::new("out"),
        &mut NoProgress,
    );

    assert!(matches!(result, Err(TilingError::InvalidConfiguration(_))));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_progress_events_per_cell() {
    let pipeline = pipeline(config(10, true), MockWriter::default());
    let mut events: Vec<ProgressEvent> = Vec::new();
    let mut sink = |event: &ProgressEvent| events.push(*event);

    pipeline
        .tile_slide(
            &slide(20, 20),
            &[square(1.0, 1.0, 5.0, 5.0)],
            "scan",
            Path::new("out"),
            &mut sink,
        )
        .unwrap();

    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        ProgressEvent {
            cells_processed: 1,
            total_cells: 4,
            annotated_count: 1,
            saved_count: 1,
        }
    );
    assert_eq!(
        events[3],
        ProgressEvent {
            cells_processed: 4,
            total_cells: 4,
            annotated_count: 1,
            saved_count: 1,
        }
    );
}

#[test]
fn test_tile_file_reader_failure() {
    let dir = tempfile::tempdir().unwrap();
    let slide_path = dir.path().join("broken.tif");
    std::fs::write(&slide_path, b"not really a slide").unwrap();

    let pipeline = SlideTilingPipeline::with_custom(
        MockReader {
            should_fail: true,
            width: 0,
            height: 0,
        },
        MockWriter::default(),
        TilingConfig::default(),
    );

    let result = pipeline.tile_file(&slide_path, &[square(1.0, 1.0, 2.0, 2.0)], dir.path());
    assert!(matches!(result, Err(TilingError::DecodeFailure(_))));
}

#[test]
fn test_tile_file_missing_file_is_decode_failure() {
    let pipeline = pipeline(TilingConfig::default(), MockWriter::default());

    let result = pipeline.tile_file("/nonexistent/slide.tif", &[square(1.0, 1.0, 2.0, 2.0)], "out");
    assert!(matches!(result, Err(TilingError::DecodeFailure(_))));
}

#[test]
fn test_tile_file_uses_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let slide_path = dir.path().join("DR001_scan.svs");
    std::fs::write(&slide_path, b"bytes").unwrap();
    let pipeline = pipeline(config(32, false), MockWriter::default());

    let stats = pipeline
        .tile_file(&slide_path, &[square(1.0, 1.0, 2.0, 2.0)], dir.path())
        .unwrap();

    assert_eq!(stats.filename, "DR001_scan");
    assert_eq!(stats.total_tiles, 4);
    assert_eq!(stats.tiles_dir, dir.path().join("DR001_scan").join("tiles"));
}

fn write_geojson(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

const ONE_SQUARE: &str = r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "properties": {},
    "geometry": {"type": "Polygon", "coordinates": [[[1, 1], [5, 1], [5, 5], [1, 5], [1, 1]]]}}]}"#;

const NO_FEATURES: &str = r#"{"type": "FeatureCollection", "features": []}"#;

#[test]
fn test_batch_isolates_failures_and_skips() {
    let root = tempfile::tempdir().unwrap();
    let slides = root.path().join("slides");
    let geojson = root.path().join("geojson");
    let output = root.path().join("out");
    std::fs::create_dir_all(&slides).unwrap();
    std::fs::create_dir_all(&geojson).unwrap();

    for name in ["S0001.tif", "S0002.tif", "S0003.tif", "S0004.tif"] {
        std::fs::write(slides.join(name), b"bytes").unwrap();
    }
    write_geojson(&geojson, "S0001_ann.geojson", ONE_SQUARE);
    write_geojson(&geojson, "S0002_ann.geojson", NO_FEATURES);
    write_geojson(&geojson, "S0003_ann.geojson", "{broken");
    // S0004 has no annotation file

    let batch = BatchPipeline::with_pipeline(pipeline(config(32, false), MockWriter::default()));
    let stats = batch
        .run(
            &BatchOptions::new(slides, geojson, output.clone()),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(stats.slides_found, 4);
    assert_eq!(stats.processed.len(), 1);
    assert_eq!(stats.processed[0].filename, "S0001");
    assert_eq!(stats.skipped, 3);
    assert!(!stats.cancelled);
    assert!(output.join("batch_processing_summary.csv").is_file());
}

#[test]
fn test_batch_continues_after_decode_failure() {
    let root = tempfile::tempdir().unwrap();
    let slides = root.path().join("slides");
    let geojson = root.path().join("geojson");
    std::fs::create_dir_all(&slides).unwrap();
    std::fs::create_dir_all(&geojson).unwrap();
    std::fs::write(slides.join("S0001.png"), b"bytes").unwrap();
    std::fs::write(slides.join("S0002.png"), b"bytes").unwrap();
    write_geojson(&geojson, "S0001.geojson", ONE_SQUARE);
    write_geojson(&geojson, "S0002.geojson", ONE_SQUARE);

    let failing = SlideTilingPipeline::with_custom(
        MockReader {
            should_fail: true,
            width: 0,
            height: 0,
        },
        MockWriter::default(),
        config(32, false),
    );
    let stats = BatchPipeline::with_pipeline(failing)
        .run(
            &BatchOptions::new(slides, geojson, root.path().join("out")),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(stats.slides_found, 2);
    assert!(stats.processed.is_empty());
    assert_eq!(stats.skipped, 2);
    assert!(!root.path().join("out").join("batch_processing_summary.csv").exists());
}

#[test]
fn test_batch_cancellation_stops_before_slides() {
    let root = tempfile::tempdir().unwrap();
    let slides = root.path().join("slides");
    let geojson = root.path().join("geojson");
    std::fs::create_dir_all(&slides).unwrap();
    std::fs::create_dir_all(&geojson).unwrap();
    std::fs::write(slides.join("S0001.tif"), b"bytes").unwrap();
    write_geojson(&geojson, "S0001.geojson", ONE_SQUARE);

    let token = CancellationToken::new();
    token.cancel();

    let stats = BatchPipeline::with_pipeline(pipeline(config(32, false), MockWriter::default()))
        .run(&BatchOptions::new(slides, geojson, root.path().join("out")), &token)
        .unwrap();

    assert!(stats.cancelled);
    assert!(stats.processed.is_empty());
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_batch_invalid_config_aborts() {
    let root = tempfile::tempdir().unwrap();
    let mut pipeline = pipeline(TilingConfig::default(), MockWriter::default());
    pipeline.set_config(TilingConfig {
        tile_size: 0,
        ..TilingConfig::default()
    });

    let result = BatchPipeline::with_pipeline(pipeline).run(
        &BatchOptions::new(root.path().join("slides"), root.path().join("g"), root.path().join("o")),
        &CancellationToken::new(),
    );

    assert!(matches!(result, Err(TilingError::InvalidConfiguration(_))));
}
