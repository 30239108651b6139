//! # Vanilla GAN
//!
//! Two small feed-forward networks trained adversarially with the Burn ML
//! framework to synthesize 28x28 grayscale digits. The discriminator is updated
//! `k` times per batch on real and detached fake samples, then the generator is
//! updated once to fool it.
//!
//! ## Modules
//!
//! - [`gan`]: Generator and discriminator networks, noise/label sources, loss, update steps
//! - [`data`]: Image datasets (MNIST or synthetic) and shuffled mini-batches
//! - [`training`]: Epoch driver and loss/snapshot history
//! - [`artifacts`]: Sample grids, training GIF, loss plot
//! - [`checkpoint`]: Generator export and resumable checkpoints
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

#![recursion_limit = "256"]

pub mod artifacts;
pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod gan;
pub mod training;
