use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, GrayImage};

use crate::error::ArtifactError;

/// Encode snapshots as a looping GIF, one frame per snapshot in order.
pub fn save_gif(frames: &[GrayImage], path: &Path, frame_delay_ms: u32) -> Result<(), ArtifactError> {
    if frames.is_empty() {
        return Err(ArtifactError::Empty("no snapshots to animate"));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;
    for snapshot in frames {
        let rgba = DynamicImage::ImageLuma8(snapshot.clone()).to_rgba8();
        let delay = Delay::from_numer_denom_ms(frame_delay_ms, 1);
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
    }
    Ok(())
}
