use std::path::PathBuf;

use burn::module::AutodiffModule;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::artifacts::{grid_from_tensor, save_gif, save_loss_plot, save_png, GridLayout};
use crate::checkpoint::{save_generator, CheckpointManager, CheckpointMetadata};
use crate::config::AppConfig;
use crate::data::ImageDataset;
use crate::error::{ArtifactError, TrainingError};
use crate::gan::{Adversary, GanConfig, NetworkConfig, NoiseSource};
use crate::training::history::{snapshot_path, TrainingHistory};

/// Trainer configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub epochs: usize,
    /// Images rendered from the fixed noise after every epoch.
    pub sample_size: usize,
    pub output_dir: PathBuf,
    pub results_dir: PathBuf,
    pub grid_nrow: u32,
    pub grid_padding: u32,
    pub gif_frame_delay_ms: u32,
    pub show_progress: bool,
    /// Epochs between resumable checkpoints; 0 disables them.
    pub checkpoint_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            epochs: 200,
            sample_size: 64,
            output_dir: PathBuf::from("outputs"),
            results_dir: PathBuf::from("results"),
            grid_nrow: 8,
            grid_padding: 2,
            gif_frame_delay_ms: 200,
            show_progress: true,
            checkpoint_interval: 10,
        }
    }
}

/// Alternating discriminator/generator training over a dataset.
pub struct Trainer {
    config: TrainerConfig,
    gan: GanConfig,
    network: NetworkConfig,
    checkpoint_manager: CheckpointManager,
}

impl Trainer {
    pub fn new(config: &AppConfig) -> Self {
        Trainer {
            config: config.training.clone(),
            gan: config.gan.clone(),
            network: config.network.clone(),
            checkpoint_manager: CheckpointManager::new(config.checkpoint.clone()),
        }
    }

    pub fn checkpoint_manager(&self) -> &CheckpointManager {
        &self.checkpoint_manager
    }

    /// Run the remaining epochs, then write the final generator, the snapshot
    /// animation and the loss plot.
    ///
    /// Training starts at `history.epochs_completed()`, so a history restored
    /// from a checkpoint continues where it stopped.
    pub fn train<B: AutodiffBackend>(
        &self,
        adversary: &mut Adversary<B>,
        dataset: &ImageDataset,
        history: &mut TrainingHistory,
    ) -> Result<(), TrainingError> {
        if dataset.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }
        let expected = self.network.sample_dim();
        if dataset.sample_dim() != expected {
            return Err(TrainingError::SampleDim {
                expected,
                actual: dataset.sample_dim(),
            });
        }

        let device = adversary.device().clone();
        let fixed_noise = self.fixed_noise(adversary, history);
        let layout = GridLayout::new(dataset.width(), dataset.height())
            .with_nrow(self.config.grid_nrow)
            .with_padding(self.config.grid_padding);

        let epochs = self.config.epochs;
        let k = self.gan.discriminator_steps;
        let start = history.epochs_completed();
        info!(
            samples = dataset.len(),
            batch_size = self.gan.batch_size,
            discriminator_steps = k,
            start_epoch = start,
            epochs,
            "starting training"
        );

        for epoch in start..epochs {
            let mut rng = epoch_rng(self.gan.seed, epoch);
            let batches = dataset.batches::<B, _>(self.gan.batch_size, &mut rng, &device);
            let pb = self.progress_bar(batches.num_batches(), epoch);

            let mut loss_g = 0.0f64;
            let mut loss_d = 0.0f64;
            let mut batch_count = 0usize;

            for real in batches {
                let batch_size = real.dims()[0];

                for _ in 0..k {
                    let fake = adversary.synthesize(batch_size).detach();
                    loss_d += adversary.train_discriminator(real.clone(), fake) as f64;
                }

                let fake = adversary.synthesize(batch_size);
                let g = adversary.train_generator(fake);
                loss_g += g as f64;
                batch_count += 1;

                debug!(epoch, batch = batch_count, generator_loss = g, "batch complete");
                pb.set_message(format!(
                    "G: {:.4}, D: {:.4}",
                    loss_g / batch_count as f64,
                    loss_d / batch_count as f64
                ));
                pb.inc(1);
            }
            pb.finish_and_clear();

            let snapshot = grid_from_tensor(adversary.sample(fixed_noise.clone()), layout)?;
            save_png(&snapshot, &snapshot_path(&self.config.output_dir, epoch))?;
            history.push_snapshot(snapshot);

            let batches = batch_count.max(1) as f64;
            let mean_g = (loss_g / batches) as f32;
            let mean_d = (loss_d / batches) as f32;
            history.record_epoch(mean_g, mean_d);
            info!(
                "Epoch {} of {}: generator loss {:.8}, discriminator loss {:.8}",
                epoch + 1,
                epochs,
                mean_g,
                mean_d
            );

            let interval = self.config.checkpoint_interval;
            if interval > 0 && (epoch + 1) % interval == 0 {
                let metadata = self.metadata(history);
                match self
                    .checkpoint_manager
                    .save_checkpoint(adversary, history, &metadata)
                {
                    Ok(path) => info!(path = %path.display(), "checkpoint saved"),
                    Err(e) => warn!(error = %e, "checkpoint failed"),
                }
            }
        }

        self.finish(adversary, history)
    }

    fn finish<B: AutodiffBackend>(
        &self,
        adversary: &Adversary<B>,
        history: &TrainingHistory,
    ) -> Result<(), TrainingError> {
        let results = &self.config.results_dir;

        let metadata = self.metadata(history);
        let path = save_generator(&adversary.generator().valid(), results, &metadata)?;
        info!(path = %path.display(), epochs = metadata.epoch, "generator saved");

        let gif_path = results.join("generator_images.gif");
        match save_gif(&history.snapshots, &gif_path, self.config.gif_frame_delay_ms) {
            Ok(()) => info!(path = %gif_path.display(), frames = history.snapshots.len(), "animation saved"),
            Err(ArtifactError::Empty(reason)) => warn!(reason, "animation skipped"),
            Err(e) => return Err(e.into()),
        }

        let plot_path = results.join("loss.png");
        match save_loss_plot(
            &history.generator_losses,
            &history.discriminator_losses,
            &plot_path,
        ) {
            Ok(()) => info!(path = %plot_path.display(), "loss plot saved"),
            Err(ArtifactError::Empty(reason)) => warn!(reason, "loss plot skipped"),
            Err(e) => return Err(e.into()),
        }

        info!("training done");
        Ok(())
    }

    /// Noise rendered into every epoch snapshot. Drawn once per run and kept in
    /// the history so a resumed run keeps rendering the same latent vectors.
    fn fixed_noise<B: AutodiffBackend>(
        &self,
        adversary: &Adversary<B>,
        history: &mut TrainingHistory,
    ) -> Tensor<B::InnerBackend, 2> {
        let shape = [self.config.sample_size, adversary.latent_dim()];
        let device = adversary.device();
        if let Some(values) = &history.fixed_noise {
            if values.len() == shape[0] * shape[1] {
                return Tensor::from_data(TensorData::new(values.clone(), shape), device);
            }
            warn!(
                stored = values.len(),
                expected = shape[0] * shape[1],
                "stored fixed noise does not match the sample shape, drawing new noise"
            );
        }
        let noise = NoiseSource::<B::InnerBackend>::new(device.clone()).sample(shape[0], shape[1]);
        history.fixed_noise = noise.to_data().to_vec::<f32>().ok();
        noise
    }

    fn metadata(&self, history: &TrainingHistory) -> CheckpointMetadata {
        CheckpointMetadata::new(&self.gan, &self.network, self.config.sample_size, history)
    }

    fn progress_bar(&self, len: usize, epoch: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        ) {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.set_prefix(format!("epoch {}", epoch + 1));
        pb
    }
}

/// Shuffle RNG for one epoch. Seeded runs derive it from the seed and the epoch
/// index, so a resumed run shuffles exactly like an uninterrupted one.
fn epoch_rng(seed: Option<u64>, epoch: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(epoch as u64)),
        None => StdRng::from_os_rng(),
    }
}
