use burn::prelude::*;
use burn::tensor::Distribution;

/// Standard-normal latent vectors on a fixed device.
#[derive(Debug, Clone)]
pub struct NoiseSource<B: Backend> {
    device: B::Device,
}

impl<B: Backend> NoiseSource<B> {
    pub fn new(device: B::Device) -> Self {
        NoiseSource { device }
    }

    /// `[n, dim]` matrix of i.i.d. N(0, 1) draws from the backend RNG.
    pub fn sample(&self, n: usize, dim: usize) -> Tensor<B, 2> {
        Tensor::random([n, dim], Distribution::Normal(0.0, 1.0), &self.device)
    }
}

/// Constant supervision targets: 1.0 for real, 0.0 for fake.
#[derive(Debug, Clone)]
pub struct LabelSource<B: Backend> {
    device: B::Device,
}

impl<B: Backend> LabelSource<B> {
    pub fn new(device: B::Device) -> Self {
        LabelSource { device }
    }

    /// Column of `n` ones.
    pub fn real(&self, n: usize) -> Tensor<B, 2> {
        Tensor::ones([n, 1], &self.device)
    }

    /// Column of `n` zeros.
    pub fn fake(&self, n: usize) -> Tensor<B, 2> {
        Tensor::zeros([n, 1], &self.device)
    }
}
