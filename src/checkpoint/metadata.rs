use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::gan::{GanConfig, NetworkConfig};
use crate::training::TrainingHistory;

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub learning_rate: f64,
    pub beta_1: f32,
    pub beta_2: f32,
    pub epsilon: f32,
    pub batch_size: usize,
    pub latent_dim: usize,
    pub discriminator_steps: usize,
    pub sample_size: usize,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Epochs completed when the checkpoint was written.
    pub epoch: usize,
    pub timestamp: u64,
    pub hyperparameters: CheckpointHyperparameters,
    /// Needed to rebuild the generator before loading its record.
    pub network: NetworkConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_loss: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_loss: Option<f32>,
}

impl CheckpointMetadata {
    pub fn new(
        gan: &GanConfig,
        network: &NetworkConfig,
        sample_size: usize,
        history: &TrainingHistory,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let last = history.last_losses();
        CheckpointMetadata {
            epoch: history.epochs_completed(),
            timestamp,
            hyperparameters: CheckpointHyperparameters {
                learning_rate: gan.learning_rate,
                beta_1: gan.beta_1,
                beta_2: gan.beta_2,
                epsilon: gan.epsilon,
                batch_size: gan.batch_size,
                latent_dim: gan.latent_dim,
                discriminator_steps: gan.discriminator_steps,
                sample_size,
            },
            network: network.clone(),
            generator_loss: last.map(|(g, _)| g),
            discriminator_loss: last.map(|(_, d)| d),
        }
    }
}
