//! Training data: normalized image samples and shuffled mini-batches.

mod batcher;
mod dataset;

pub use batcher::BatchIter;
pub use dataset::{normalize_pixel, ImageDataset};

use rand::Rng;

/// Where training images come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Mnist,
    Synthetic,
}

/// Dataset selection, loadable from the `[data]` TOML section.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source: DataSource,
    /// Sample count for the synthetic source.
    pub synthetic_samples: usize,
    pub max_samples: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            source: DataSource::Mnist,
            synthetic_samples: 1024,
            max_samples: None,
        }
    }
}

impl ImageDataset {
    /// Build the configured dataset. Synthetic images use the given geometry;
    /// MNIST is always 28x28.
    pub fn from_config<R: Rng>(config: &DataConfig, width: u32, height: u32, rng: &mut R) -> Self {
        let dataset = match config.source {
            DataSource::Mnist => ImageDataset::mnist(),
            DataSource::Synthetic => {
                ImageDataset::synthetic(config.synthetic_samples, width, height, rng)
            }
        };
        match config.max_samples {
            Some(n) => dataset.limit(n),
            None => dataset,
        }
    }
}
