use std::path::Path;

use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::{DefaultRecorder, Recorder, RecorderError};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use tracing::warn;

use crate::gan::loss::binary_cross_entropy;
use crate::gan::networks::{Discriminator, Generator, NetworkConfig};
use crate::gan::sources::{LabelSource, NoiseSource};

/// Optimization hyperparameters shared by both networks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GanConfig {
    pub batch_size: usize,
    pub latent_dim: usize,
    /// Discriminator updates per generator update (`k`).
    pub discriminator_steps: usize,
    pub learning_rate: f64,
    pub beta_1: f32,
    pub beta_2: f32,
    pub epsilon: f32,
    pub seed: Option<u64>,
}

impl Default for GanConfig {
    fn default() -> Self {
        GanConfig {
            batch_size: 512,
            latent_dim: 128,
            discriminator_steps: 1,
            learning_rate: 2e-4,
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-8,
            seed: None,
        }
    }
}

type AdamFor<M, B> = OptimizerAdaptor<Adam, M, B>;

/// Generator and discriminator with their Adam optimizers.
///
/// The discriminator is read by both update steps but only written by its
/// own; updates run strictly one after another.
pub struct Adversary<B: AutodiffBackend> {
    generator: Generator<B>,
    discriminator: Discriminator<B>,
    optim_g: AdamFor<Generator<B>, B>,
    optim_d: AdamFor<Discriminator<B>, B>,
    noise: NoiseSource<B>,
    labels: LabelSource<B>,
    learning_rate: f64,
    latent_dim: usize,
    device: B::Device,
    discriminator_steps: usize,
    generator_steps: usize,
}

impl<B: AutodiffBackend> Adversary<B> {
    pub fn new(config: &GanConfig, network: &NetworkConfig, device: &B::Device) -> Self {
        if let Some(seed) = config.seed {
            B::seed(seed);
        }

        let adam = AdamConfig::new()
            .with_beta_1(config.beta_1)
            .with_beta_2(config.beta_2)
            .with_epsilon(config.epsilon);

        Adversary {
            generator: network.generator(config.latent_dim).init(device),
            discriminator: network.discriminator().init(device),
            optim_g: adam.init(),
            optim_d: adam.init(),
            noise: NoiseSource::new(device.clone()),
            labels: LabelSource::new(device.clone()),
            learning_rate: config.learning_rate,
            latent_dim: config.latent_dim,
            device: device.clone(),
            discriminator_steps: 0,
            generator_steps: 0,
        }
    }

    /// Fresh fake batch of `n` samples with gradient tracking back into the generator.
    pub fn synthesize(&self, n: usize) -> Tensor<B, 2> {
        self.generator.forward(self.noise.sample(n, self.latent_dim))
    }

    /// One discriminator update from a real batch and a detached fake batch.
    /// Returns `L_real + L_fake`.
    pub fn train_discriminator(&mut self, real: Tensor<B, 2>, fake: Tensor<B, 2>) -> f32 {
        let batch_size = real.dims()[0];
        let real_label = self.labels.real(batch_size);
        let fake_label = self.labels.fake(batch_size);

        let loss_real = binary_cross_entropy(self.discriminator.forward(real), real_label);
        let loss_fake = binary_cross_entropy(self.discriminator.forward(fake), fake_label);

        // Gradients of the sum are the accumulated gradients of both terms.
        let loss = loss_real + loss_fake;
        let loss_val = scalar(&loss);

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.discriminator);
        self.discriminator =
            self.optim_d
                .step(self.learning_rate, self.discriminator.clone(), grads);

        self.discriminator_steps += 1;
        if !loss_val.is_finite() {
            warn!(step = self.discriminator_steps, loss = loss_val, "non-finite discriminator loss");
        }
        loss_val
    }

    /// One generator update from a fake batch that still carries its graph.
    pub fn train_generator(&mut self, fake: Tensor<B, 2>) -> f32 {
        let batch_size = fake.dims()[0];
        let real_label = self.labels.real(batch_size);

        let loss = binary_cross_entropy(self.discriminator.forward(fake), real_label);
        let loss_val = scalar(&loss);

        // Discriminator gradients from this pass are dropped here.
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.generator);
        self.generator = self
            .optim_g
            .step(self.learning_rate, self.generator.clone(), grads);

        self.generator_steps += 1;
        if !loss_val.is_finite() {
            warn!(step = self.generator_steps, loss = loss_val, "non-finite generator loss");
        }
        loss_val
    }

    /// Run the inference copy of the generator, without gradient tracking.
    pub fn sample(&self, latent: Tensor<B::InnerBackend, 2>) -> Tensor<B::InnerBackend, 2> {
        self.generator.valid().forward(latent)
    }

    pub fn generator(&self) -> &Generator<B> {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator<B> {
        &self.discriminator
    }

    pub fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn discriminator_steps(&self) -> usize {
        self.discriminator_steps
    }

    pub fn generator_steps(&self) -> usize {
        self.generator_steps
    }

    /// Save both networks and both optimizer states to a directory.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), RecorderError> {
        let recorder = DefaultRecorder::default();
        self.generator
            .clone()
            .save_file(dir.join("generator"), &recorder)?;
        self.discriminator
            .clone()
            .save_file(dir.join("discriminator"), &recorder)?;
        recorder.record(self.optim_g.to_record(), dir.join("optimizer_generator"))?;
        recorder.record(self.optim_d.to_record(), dir.join("optimizer_discriminator"))?;
        Ok(())
    }

    /// Load networks and optimizer states written by [`Adversary::save_to_dir`].
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<(), RecorderError> {
        let recorder = DefaultRecorder::default();
        self.generator = self
            .generator
            .clone()
            .load_file(dir.join("generator"), &recorder, &self.device)?;
        self.discriminator = self
            .discriminator
            .clone()
            .load_file(dir.join("discriminator"), &recorder, &self.device)?;

        let record = recorder.load(dir.join("optimizer_generator"), &self.device)?;
        self.optim_g = self.optim_g.clone().load_record(record);
        let record = recorder.load(dir.join("optimizer_discriminator"), &self.device)?;
        self.optim_d = self.optim_d.clone().load_record(record);
        Ok(())
    }
}

fn scalar<B: Backend>(loss: &Tensor<B, 1>) -> f32 {
    loss.clone().into_scalar().elem::<f32>()
}
