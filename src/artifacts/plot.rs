//! Rasterized line chart of the per-epoch loss histories.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::ArtifactError;

const BACKGROUND: Rgb<u8> = Rgb([235, 235, 235]);
const GRID: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([80, 80, 80]);
pub const GENERATOR_COLOR: Rgb<u8> = Rgb([52, 138, 189]);
pub const DISCRIMINATOR_COLOR: Rgb<u8> = Rgb([226, 74, 51]);

const MARGIN: u32 = 40;
const GRID_LINES: u32 = 5;

/// Plot area inside the margins, in pixel coordinates.
struct Frame {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
    min: f32,
    max: f32,
    points: usize,
}

impl Frame {
    fn x(&self, index: usize) -> u32 {
        if self.points <= 1 {
            return (self.left + self.right) / 2;
        }
        let t = index as f32 / (self.points - 1) as f32;
        self.left + (t * (self.right - self.left) as f32).round() as u32
    }

    fn y(&self, value: f32) -> u32 {
        let span = self.max - self.min;
        let t = if span > 0.0 { (value - self.min) / span } else { 0.5 };
        self.bottom - (t * (self.bottom - self.top) as f32).round() as u32
    }
}

/// Draw generator and discriminator loss curves over epoch index.
///
/// Both series share one y-axis scaled to their joint finite min/max. Non-finite
/// values are skipped and break the line. The legend is two colour swatches in
/// the top-right corner (generator first).
pub fn plot_losses(
    generator: &[f32],
    discriminator: &[f32],
    width: u32,
    height: u32,
) -> Result<RgbImage, ArtifactError> {
    let finite = generator
        .iter()
        .chain(discriminator)
        .copied()
        .filter(|v| v.is_finite());
    let (min, max) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return Err(ArtifactError::Empty("no finite loss values to plot"));
    }
    if width <= 2 * MARGIN || height <= 2 * MARGIN {
        return Err(ArtifactError::Empty("plot area too small"));
    }

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let frame = Frame {
        left: MARGIN,
        top: MARGIN,
        right: width - MARGIN,
        bottom: height - MARGIN,
        min,
        max,
        points: generator.len().max(discriminator.len()),
    };

    for i in 0..=GRID_LINES {
        let y = frame.top + i * (frame.bottom - frame.top) / GRID_LINES;
        draw_line(&mut img, (frame.left, y), (frame.right, y), GRID);
    }
    draw_line(&mut img, (frame.left, frame.bottom), (frame.right, frame.bottom), AXIS);
    draw_line(&mut img, (frame.left, frame.top), (frame.left, frame.bottom), AXIS);

    draw_series(&mut img, &frame, generator, GENERATOR_COLOR);
    draw_series(&mut img, &frame, discriminator, DISCRIMINATOR_COLOR);

    let legend_x = width - MARGIN - 30;
    for (row, color) in [GENERATOR_COLOR, DISCRIMINATOR_COLOR].into_iter().enumerate() {
        let y = MARGIN / 2 + row as u32 * 8;
        for dy in 0..3 {
            draw_line(&mut img, (legend_x, y + dy), (legend_x + 24, y + dy), color);
        }
    }

    Ok(img)
}

/// Render the loss plot and write it as PNG.
pub fn save_loss_plot(
    generator: &[f32],
    discriminator: &[f32],
    path: &Path,
) -> Result<(), ArtifactError> {
    let img = plot_losses(generator, discriminator, 640, 480)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    Ok(())
}

fn draw_series(img: &mut RgbImage, frame: &Frame, values: &[f32], color: Rgb<u8>) {
    let mut previous: Option<(u32, u32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            previous = None;
            continue;
        }
        let point = (frame.x(i), frame.y(v));
        match previous {
            Some(prev) => draw_thick_line(img, prev, point, color),
            None => draw_marker(img, point, color),
        }
        previous = Some(point);
    }
}

fn draw_marker(img: &mut RgbImage, (cx, cy): (u32, u32), color: Rgb<u8>) {
    for y in cy.saturating_sub(2)..=cy + 2 {
        for x in cx.saturating_sub(2)..=cx + 2 {
            if x < img.width() && y < img.height() {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn draw_thick_line(img: &mut RgbImage, from: (u32, u32), to: (u32, u32), color: Rgb<u8>) {
    draw_line(img, from, to, color);
    draw_line(img, (from.0, from.1 + 1), (to.0, to.1 + 1), color);
}

/// Bresenham line, clipped to the image.
fn draw_line(img: &mut RgbImage, from: (u32, u32), to: (u32, u32), color: Rgb<u8>) {
    let (mut x0, mut y0) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < img.width() && (y0 as u32) < img.height() {
            img.put_pixel(x0 as u32, y0 as u32, color);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
