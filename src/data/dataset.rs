use burn::data::dataset::vision::MnistDataset;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::info;

use crate::data::batcher::BatchIter;

/// Maps raw 0..=255 pixels into [-1, 1]: `(x / 255 - 0.5) / 0.5`.
pub fn normalize_pixel(value: f32) -> f32 {
    (value / 255.0 - 0.5) / 0.5
}

/// In-memory collection of flattened, normalized grayscale images.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    samples: Vec<Vec<f32>>,
    width: u32,
    height: u32,
}

impl ImageDataset {
    /// Wrap already-normalized samples. Every sample must hold `width * height` values.
    pub fn from_samples(samples: Vec<Vec<f32>>, width: u32, height: u32) -> Self {
        let dim = (width * height) as usize;
        assert!(
            samples.iter().all(|s| s.len() == dim),
            "every sample must have {dim} values"
        );
        ImageDataset {
            samples,
            width,
            height,
        }
    }

    /// MNIST training split (60k digits, 28x28), downloaded and cached by Burn.
    pub fn mnist() -> Self {
        let mnist = MnistDataset::train();
        info!(samples = mnist.len(), "loaded MNIST training split");
        let samples = mnist
            .iter()
            .map(|item| {
                item.image
                    .iter()
                    .flat_map(|row| row.iter().map(|&px| normalize_pixel(px)))
                    .collect()
            })
            .collect();
        ImageDataset::from_samples(samples, 28, 28)
    }

    /// Procedural images of one soft blob each, useful when MNIST is unavailable.
    pub fn synthetic<R: Rng>(count: usize, width: u32, height: u32, rng: &mut R) -> Self {
        let samples = (0..count)
            .map(|_| synthetic_blob(width, height, rng))
            .collect();
        ImageDataset::from_samples(samples, width, height)
    }

    /// Keep at most the first `n` samples.
    pub fn limit(mut self, n: usize) -> Self {
        self.samples.truncate(n);
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Values per sample.
    pub fn sample_dim(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn get(&self, index: usize) -> Option<&[f32]> {
        self.samples.get(index).map(Vec::as_slice)
    }

    /// One shuffled pass over the dataset in batches of `batch_size`.
    pub fn batches<B: Backend, R: Rng>(
        &self,
        batch_size: usize,
        rng: &mut R,
        device: &B::Device,
    ) -> BatchIter<'_, B> {
        BatchIter::new(self, batch_size, rng, device.clone())
    }
}

fn synthetic_blob<R: Rng>(width: u32, height: u32, rng: &mut R) -> Vec<f32> {
    let (w, h) = (width as f32, height as f32);
    let cx = rng.random_range(0.25..0.75) * w;
    let cy = rng.random_range(0.25..0.75) * h;
    let radius = rng.random_range(0.12..0.3) * w.min(h);

    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let falloff = (-(dx * dx + dy * dy) / (2.0 * radius * radius)).exp();
            let jitter: f32 = rng.sample(StandardNormal);
            let raw = (255.0 * falloff + 8.0 * jitter).clamp(0.0, 255.0);
            pixels.push(normalize_pixel(raw));
        }
    }
    pixels
}
