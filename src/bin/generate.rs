#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::backend::{NdArray, Wgpu};
use burn::prelude::*;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vanilla_gan::artifacts::{grid_from_tensor, save_png, GridLayout};
use vanilla_gan::checkpoint::load_generator;
use vanilla_gan::gan::NoiseSource;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendKind {
    Wgpu,
    Ndarray,
}

/// Sample images from a trained generator.
#[derive(Parser)]
#[command(name = "generate", about = "Sample a grid of images from a trained generator")]
struct Cli {
    /// Directory holding generator.mpk and metadata.json
    #[arg(long, default_value = "results")]
    results: PathBuf,

    /// Number of images to sample
    #[arg(long, default_value_t = 64)]
    count: usize,

    /// Seed for the latent noise
    #[arg(long)]
    seed: Option<u64>,

    /// Images per grid row
    #[arg(long, default_value_t = 8)]
    nrow: u32,

    /// Output PNG path
    #[arg(long, default_value = "results/generated.png")]
    output: PathBuf,

    /// Tensor backend
    #[arg(long, value_enum, default_value = "wgpu")]
    backend: BackendKind,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(cli.count > 0, "--count must be > 0");

    match cli.backend {
        BackendKind::Wgpu => run::<Wgpu<f32, i32>>(&cli),
        BackendKind::Ndarray => run::<NdArray>(&cli),
    }
}

fn run<B: Backend>(cli: &Cli) -> Result<()> {
    let device = B::Device::default();
    if let Some(seed) = cli.seed {
        B::seed(seed);
    }

    let (generator, metadata) = load_generator::<B>(&cli.results, &device)
        .with_context(|| format!("loading generator from {}", cli.results.display()))?;
    info!(
        epochs = metadata.epoch,
        latent_dim = metadata.hyperparameters.latent_dim,
        "generator loaded"
    );

    let noise = NoiseSource::<B>::new(device).sample(cli.count, metadata.hyperparameters.latent_dim);
    let layout = GridLayout::new(metadata.network.image_width, metadata.network.image_height)
        .with_nrow(cli.nrow);
    let grid = grid_from_tensor(generator.forward(noise), layout).context("building grid")?;
    save_png(&grid, &cli.output).context("writing grid")?;

    info!(path = %cli.output.display(), count = cli.count, "samples written");
    Ok(())
}
