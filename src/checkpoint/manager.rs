use std::fs;
use std::path::{Path, PathBuf};

use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::backend::AutodiffBackend;
use tracing::{debug, info};

use crate::checkpoint::metadata::CheckpointMetadata;
use crate::error::CheckpointError;
use crate::gan::{Adversary, Generator};
use crate::training::TrainingHistory;

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
    pub keep_last_n: usize,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_last_n: 5,
        }
    }
}

/// Contents of a checkpoint directory, minus the model records which are
/// loaded straight into an [`Adversary`] by [`CheckpointManager::restore`].
#[derive(Debug)]
pub struct CheckpointData {
    pub path: PathBuf,
    pub metadata: CheckpointMetadata,
    pub history: TrainingHistory,
}

/// Manages saving, loading, listing, and pruning resumable checkpoints.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Self {
        fs::create_dir_all(&config.checkpoint_dir).ok();
        CheckpointManager { config }
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.config.checkpoint_dir
    }

    /// Write both networks, both optimizer states, the loss history and
    /// metadata into `checkpoint_{epoch}`.
    pub fn save_checkpoint<B: AutodiffBackend>(
        &self,
        adversary: &Adversary<B>,
        history: &TrainingHistory,
        metadata: &CheckpointMetadata,
    ) -> Result<PathBuf, CheckpointError> {
        let dir_name = format!("checkpoint_{:04}", metadata.epoch);
        let tmp_dir = self.config.checkpoint_dir.join(format!("{dir_name}.tmp"));
        let final_dir = self.config.checkpoint_dir.join(&dir_name);

        fs::create_dir_all(&tmp_dir)?;

        adversary
            .save_to_dir(&tmp_dir)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;
        fs::write(
            tmp_dir.join("history.json"),
            serde_json::to_string_pretty(history)?,
        )?;
        fs::write(
            tmp_dir.join("metadata.json"),
            serde_json::to_string_pretty(metadata)?,
        )?;

        // Atomic rename
        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;

        self.update_latest_symlink(&dir_name)?;
        self.prune_old_checkpoints()?;

        Ok(final_dir)
    }

    /// Read metadata and loss history from a checkpoint directory.
    pub fn load_checkpoint(&self, dir: &Path) -> Result<CheckpointData, CheckpointError> {
        let metadata = read_metadata(dir)?;
        let history_path = dir.join("history.json");
        let history_json =
            fs::read_to_string(&history_path).map_err(|e| CheckpointError::MetadataRead {
                path: history_path.clone(),
                source: e,
            })?;
        let history: TrainingHistory =
            serde_json::from_str(&history_json).map_err(|e| CheckpointError::MetadataParse {
                path: history_path,
                source: e,
            })?;

        Ok(CheckpointData {
            path: dir.to_path_buf(),
            metadata,
            history,
        })
    }

    /// Load the checkpoint the `latest` symlink points at.
    pub fn load_latest(&self) -> Result<CheckpointData, CheckpointError> {
        let latest_link = self.config.checkpoint_dir.join("latest");
        if !latest_link.exists() {
            return Err(CheckpointError::NoLatestSymlink(
                self.config.checkpoint_dir.clone(),
            ));
        }
        let resolved = fs::read_link(&latest_link)?;
        let target = if resolved.is_relative() {
            self.config.checkpoint_dir.join(resolved)
        } else {
            resolved
        };
        self.load_checkpoint(&target)
    }

    /// Put a loaded checkpoint back into a live run: model and optimizer
    /// records into `adversary`, losses into `history`, and the per-epoch grids
    /// found in `samples_dir` as snapshots.
    pub fn restore<B: AutodiffBackend>(
        &self,
        adversary: &mut Adversary<B>,
        history: &mut TrainingHistory,
        data: CheckpointData,
        samples_dir: &Path,
    ) -> Result<(), CheckpointError> {
        adversary
            .load_from_dir(&data.path)
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
        *history = data.history;
        let reloaded = history.reload_snapshots(samples_dir)?;
        info!(
            checkpoint = %data.path.display(),
            epochs = history.epochs_completed(),
            snapshots = reloaded,
            "restored checkpoint"
        );
        Ok(())
    }

    /// List all checkpoints sorted by epoch (ascending).
    pub fn list_checkpoints(
        &self,
    ) -> Result<Vec<(PathBuf, CheckpointMetadata)>, CheckpointError> {
        let mut results = Vec::new();
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() || path.is_symlink() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if !name_str.starts_with("checkpoint_") || name_str.ends_with(".tmp") {
                continue;
            }
            if path.join("metadata.json").exists() {
                let metadata = read_metadata(&path)?;
                results.push((path, metadata));
            }
        }
        results.sort_by_key(|(_, m)| m.epoch);
        Ok(results)
    }

    /// Delete all but the newest `keep_last_n` checkpoints.
    fn prune_old_checkpoints(&self) -> Result<(), CheckpointError> {
        let checkpoints = self.list_checkpoints()?;
        let excess = checkpoints.len().saturating_sub(self.config.keep_last_n);
        for (path, _) in checkpoints.iter().take(excess) {
            debug!(path = %path.display(), "pruning checkpoint");
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    /// Update the `latest` symlink to point to the given checkpoint directory name.
    fn update_latest_symlink(&self, dir_name: &str) -> Result<(), CheckpointError> {
        let link_path = self.config.checkpoint_dir.join("latest");
        if link_path.symlink_metadata().is_ok() {
            fs::remove_file(&link_path)?;
        }
        std::os::unix::fs::symlink(dir_name, &link_path)?;
        Ok(())
    }
}

/// Write the trained generator record and its metadata into `dir`.
pub fn save_generator<B: Backend>(
    generator: &Generator<B>,
    dir: &Path,
    metadata: &CheckpointMetadata,
) -> Result<PathBuf, CheckpointError> {
    fs::create_dir_all(dir)?;
    let recorder = DefaultRecorder::default();
    generator
        .clone()
        .save_file(dir.join("generator"), &recorder)
        .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;
    fs::write(
        dir.join("metadata.json"),
        serde_json::to_string_pretty(metadata)?,
    )?;
    Ok(dir.join("generator.mpk"))
}

/// Rebuild a generator from `dir/metadata.json` and load its trained weights.
pub fn load_generator<B: Backend>(
    dir: &Path,
    device: &B::Device,
) -> Result<(Generator<B>, CheckpointMetadata), CheckpointError> {
    let metadata = read_metadata(dir)?;
    let generator = metadata
        .network
        .generator(metadata.hyperparameters.latent_dim)
        .init::<B>(device)
        .load_file(dir.join("generator"), &DefaultRecorder::default(), device)
        .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
    Ok((generator, metadata))
}

fn read_metadata(dir: &Path) -> Result<CheckpointMetadata, CheckpointError> {
    let meta_path = dir.join("metadata.json");
    let meta_json = fs::read_to_string(&meta_path).map_err(|e| CheckpointError::MetadataRead {
        path: meta_path.clone(),
        source: e,
    })?;
    serde_json::from_str(&meta_json).map_err(|e| CheckpointError::MetadataParse {
        path: meta_path,
        source: e,
    })
}
