use std::path::{Path, PathBuf};

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::artifacts::load_png;
use crate::error::ArtifactError;

/// Per-epoch loss means and sample snapshots accumulated across a run.
///
/// Owned by the caller and handed to [`crate::training::Trainer::train`] by
/// mutable reference; one entry per completed epoch in each sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub generator_losses: Vec<f32>,
    pub discriminator_losses: Vec<f32>,
    /// Latent vectors behind every snapshot, row-major `[sample_size, latent_dim]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_noise: Option<Vec<f32>>,
    #[serde(skip)]
    pub snapshots: Vec<GrayImage>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epochs_completed(&self) -> usize {
        self.generator_losses.len()
    }

    pub fn record_epoch(&mut self, generator_loss: f32, discriminator_loss: f32) {
        self.generator_losses.push(generator_loss);
        self.discriminator_losses.push(discriminator_loss);
    }

    pub fn push_snapshot(&mut self, snapshot: GrayImage) {
        self.snapshots.push(snapshot);
    }

    pub fn last_losses(&self) -> Option<(f32, f32)> {
        Some((
            *self.generator_losses.last()?,
            *self.discriminator_losses.last()?,
        ))
    }

    /// Replace the in-memory snapshots with the grids written for every
    /// completed epoch. Missing files are skipped.
    pub fn reload_snapshots(&mut self, output_dir: &Path) -> Result<usize, ArtifactError> {
        self.snapshots.clear();
        for epoch in 0..self.epochs_completed() {
            let path = snapshot_path(output_dir, epoch);
            if path.exists() {
                self.snapshots.push(load_png(&path)?);
            }
        }
        Ok(self.snapshots.len())
    }
}

/// Location of the sample grid for a given epoch.
pub fn snapshot_path(output_dir: &Path, epoch: usize) -> PathBuf {
    output_dir.join(format!("gen_img_{epoch}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::save_png;
    use image::Luma;

    #[test]
    fn test_record_epoch_keeps_sequences_aligned() {
        let mut history = TrainingHistory::new();
        assert_eq!(history.epochs_completed(), 0);
        assert!(history.last_losses().is_none());

        history.record_epoch(0.9, 1.3);
        history.record_epoch(1.1, 1.2);
        assert_eq!(history.epochs_completed(), 2);
        assert_eq!(history.discriminator_losses.len(), 2);
        assert_eq!(history.last_losses(), Some((1.1, 1.2)));
    }

    #[test]
    fn test_json_skips_snapshots() {
        let mut history = TrainingHistory::new();
        history.record_epoch(0.5, 1.5);
        history.push_snapshot(GrayImage::new(2, 2));

        let json = serde_json::to_string(&history).unwrap();
        assert!(!json.contains("snapshots"));
        let restored: TrainingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.generator_losses, vec![0.5]);
        assert!(restored.snapshots.is_empty());
    }

    #[test]
    fn test_json_keeps_fixed_noise() {
        let mut history = TrainingHistory::new();
        let json = serde_json::to_string(&history).unwrap();
        assert!(!json.contains("fixed_noise"));

        history.fixed_noise = Some(vec![0.25, -1.5, 3.0]);
        let json = serde_json::to_string(&history).unwrap();
        let restored: TrainingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.fixed_noise, Some(vec![0.25, -1.5, 3.0]));
    }

    #[test]
    fn test_reload_snapshots_in_epoch_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = TrainingHistory::new();
        for epoch in 0..3u8 {
            history.record_epoch(1.0, 1.0);
            let grid = GrayImage::from_pixel(4, 4, Luma([epoch * 50]));
            save_png(&grid, &snapshot_path(dir.path(), epoch as usize)).unwrap();
        }

        let loaded = history.reload_snapshots(dir.path()).unwrap();
        assert_eq!(loaded, 3);
        assert_eq!(history.snapshots[2].get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_reload_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = TrainingHistory::new();
        history.record_epoch(1.0, 1.0);
        history.record_epoch(1.0, 1.0);
        save_png(&GrayImage::new(2, 2), &snapshot_path(dir.path(), 1)).unwrap();

        assert_eq!(history.reload_snapshots(dir.path()).unwrap(), 1);
    }
}
