use std::path::Path;

use burn::prelude::*;
use image::{GrayImage, Luma};

use crate::error::ArtifactError;

/// Layout of a sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub width: u32,
    pub height: u32,
    /// Images per row.
    pub nrow: u32,
    /// Pixels between images and around the border.
    pub padding: u32,
}

impl GridLayout {
    pub fn new(width: u32, height: u32) -> Self {
        GridLayout {
            width,
            height,
            nrow: 8,
            padding: 2,
        }
    }

    pub fn with_nrow(mut self, nrow: u32) -> Self {
        self.nrow = nrow.max(1);
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }
}

/// Map a generator output in [-1, 1] to an 8-bit gray level.
pub fn to_gray(value: f32) -> u8 {
    let unit = (value.clamp(-1.0, 1.0) + 1.0) / 2.0;
    (unit * 255.0).round() as u8
}

/// Tile flattened samples into one grayscale image on a black background.
///
/// `samples` holds consecutive `width * height` images; with `n` images the
/// grid has `min(nrow, n)` columns and `ceil(n / nrow)` rows.
pub fn make_grid(samples: &[f32], layout: GridLayout) -> Result<GrayImage, ArtifactError> {
    let dim = (layout.width * layout.height) as usize;
    if dim == 0 || samples.len() % dim != 0 {
        return Err(ArtifactError::SampleShape {
            len: samples.len(),
            width: layout.width,
            height: layout.height,
        });
    }
    let count = samples.len() / dim;
    if count == 0 {
        return Err(ArtifactError::Empty("no samples for grid"));
    }

    // Public fields can bypass `with_nrow`; zero behaves as one column.
    let nrow = layout.nrow.max(1);
    let cols = nrow.min(count as u32);
    let rows = (count as u32).div_ceil(nrow);
    let cell_w = layout.width + layout.padding;
    let cell_h = layout.height + layout.padding;
    let mut grid = GrayImage::new(cols * cell_w + layout.padding, rows * cell_h + layout.padding);

    for (index, sample) in samples.chunks_exact(dim).enumerate() {
        let index = index as u32;
        let left = (index % nrow) * cell_w + layout.padding;
        let top = (index / nrow) * cell_h + layout.padding;
        for (offset, &value) in sample.iter().enumerate() {
            let x = offset as u32 % layout.width;
            let y = offset as u32 / layout.width;
            grid.put_pixel(left + x, top + y, Luma([to_gray(value)]));
        }
    }
    Ok(grid)
}

/// Pull a `[n, width * height]` tensor off the device and tile it.
pub fn grid_from_tensor<B: Backend>(
    samples: Tensor<B, 2>,
    layout: GridLayout,
) -> Result<GrayImage, ArtifactError> {
    let values: Vec<f32> = samples
        .into_data()
        .to_vec()
        .map_err(|e| ArtifactError::Tensor(format!("{e:?}")))?;
    make_grid(&values, layout)
}

/// Write a grid as PNG, creating parent directories.
pub fn save_png(image: &GrayImage, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    Ok(())
}

/// Read a previously written grid back (used when resuming training).
pub fn load_png(path: &Path) -> Result<GrayImage, ArtifactError> {
    Ok(image::open(path)?.to_luma8())
}
