#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::backend::{Autodiff, NdArray, Wgpu};
use burn::tensor::backend::AutodiffBackend;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vanilla_gan::config::AppConfig;
use vanilla_gan::data::{DataSource, ImageDataset};
use vanilla_gan::gan::Adversary;
use vanilla_gan::training::{Trainer, TrainingHistory};

type GpuBackend = Autodiff<Wgpu<f32, i32>>;
type CpuBackend = Autodiff<NdArray>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendKind {
    Wgpu,
    Ndarray,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DataKind {
    Mnist,
    Synthetic,
}

/// Train a vanilla GAN on grayscale images.
#[derive(Parser)]
#[command(name = "train", about = "Train a vanilla GAN")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Override batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Override learning rate of both optimizers
    #[arg(long)]
    lr: Option<f64>,

    /// Override discriminator updates per generator update
    #[arg(long)]
    k: Option<usize>,

    /// Override the training data source
    #[arg(long, value_enum)]
    data: Option<DataKind>,

    /// Tensor backend
    #[arg(long, value_enum, default_value = "wgpu")]
    backend: BackendKind,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Disable the per-batch progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml().context("serializing default config")?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(epochs) = cli.epochs {
        config.training.epochs = epochs;
    }
    if let Some(batch_size) = cli.batch_size {
        config.gan.batch_size = batch_size;
    }
    if let Some(lr) = cli.lr {
        config.gan.learning_rate = lr;
    }
    if let Some(k) = cli.k {
        config.gan.discriminator_steps = k;
    }
    if let Some(data) = cli.data {
        config.data.source = match data {
            DataKind::Mnist => DataSource::Mnist,
            DataKind::Synthetic => DataSource::Synthetic,
        };
    }
    if cli.no_progress {
        config.training.show_progress = false;
    }
    config.validate().context("validating config")?;

    match cli.backend {
        BackendKind::Wgpu => run::<GpuBackend>(&config, cli.resume),
        BackendKind::Ndarray => run::<CpuBackend>(&config, cli.resume),
    }
}

fn run<B: AutodiffBackend>(config: &AppConfig, resume: bool) -> Result<()> {
    let device = B::Device::default();

    let mut rng = match config.gan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let dataset = ImageDataset::from_config(
        &config.data,
        config.network.image_width,
        config.network.image_height,
        &mut rng,
    );
    info!(samples = dataset.len(), source = ?config.data.source, "dataset ready");

    let mut adversary = Adversary::<B>::new(&config.gan, &config.network, &device);
    info!(generator = %adversary.generator(), "generator network");
    info!(discriminator = %adversary.discriminator(), "discriminator network");
    let mut history = TrainingHistory::new();
    let trainer = Trainer::new(config);

    if resume {
        match trainer.checkpoint_manager().load_latest() {
            Ok(data) => {
                let epoch = data.metadata.epoch;
                trainer
                    .checkpoint_manager()
                    .restore(&mut adversary, &mut history, data, &config.training.output_dir)
                    .context("restoring checkpoint")?;
                info!(epoch, "resumed from checkpoint");
            }
            Err(e) => info!(reason = %e, "no checkpoint found, starting fresh"),
        }
    }

    trainer
        .train(&mut adversary, &dataset, &mut history)
        .context("training")?;
    Ok(())
}
