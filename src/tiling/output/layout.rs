//! Output directory layout

use std::path::{Path, PathBuf};

pub const TILES_DIR: &str = "tiles";
pub const MASKS_DIR: &str = "masks";

/// `<output>/<slide>/tiles/Da{i}.jpg` and `<output>/<slide>/masks/Da{i}_mask.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub slide_dir: PathBuf,
    pub tiles_dir: PathBuf,
    pub masks_dir: PathBuf,
}

impl OutputLayout {
    pub fn for_slide(output_dir: &Path, slide_name: &str) -> Self {
        let slide_dir = output_dir.join(slide_name);
        Self {
            tiles_dir: slide_dir.join(TILES_DIR),
            masks_dir: slide_dir.join(MASKS_DIR),
            slide_dir,
        }
    }

    pub fn tile_path(&self, index: usize) -> PathBuf {
        self.tiles_dir.join(format!("Da{}.jpg", index))
    }

    pub fn mask_path(&self, index: usize) -> PathBuf {
        self.masks_dir.join(format!("Da{}_mask.png", index))
    }
}
