use burn::nn::{LeakyRelu, LeakyReluConfig, Linear, LinearConfig, Tanh};
use burn::prelude::*;

/// Feed-forward generator mapping latent vectors to flattened images.
///
/// With the default widths:
/// ```text
/// Input:  [batch, nz]
/// FC1:    nz  -> 256,  LeakyReLU(0.2)
/// FC2:    256 -> 512,  LeakyReLU(0.2)
/// FC3:    512 -> 1024, LeakyReLU(0.2)
/// FC4:    1024 -> 784, Tanh  (pixels in [-1, 1])
/// ```
#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    activation: LeakyRelu,
    tanh: Tanh,
}

#[derive(Config, Debug)]
pub struct GeneratorConfig {
    pub latent_dim: usize,
    pub hidden: Vec<usize>,
    pub output_dim: usize,
    #[config(default = 0.2)]
    pub negative_slope: f64,
}

impl GeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        let mut hidden = Vec::with_capacity(self.hidden.len());
        let mut fan_in = self.latent_dim;
        for &width in &self.hidden {
            hidden.push(LinearConfig::new(fan_in, width).init(device));
            fan_in = width;
        }

        Generator {
            hidden,
            output: LinearConfig::new(fan_in, self.output_dim).init(device),
            activation: LeakyReluConfig::new()
                .with_negative_slope(self.negative_slope)
                .init(),
            tanh: Tanh::new(),
        }
    }
}

impl<B: Backend> Generator<B> {
    /// Forward pass: latent [batch, nz] -> samples [batch, output_dim].
    pub fn forward(&self, latent: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = latent;
        for layer in &self.hidden {
            x = self.activation.forward(layer.forward(x));
        }
        self.tanh.forward(self.output.forward(x))
    }

    /// Every weight and bias, flattened in layer order.
    #[cfg(test)]
    pub(crate) fn parameter_values(&self) -> Vec<f32> {
        super::flatten_linear_params(self.hidden.iter().chain(std::iter::once(&self.output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_generator_output_shape() {
        let device = Default::default();
        let config = GeneratorConfig::new(128, vec![256, 512, 1024], 784);
        let generator = config.init::<TestBackend>(&device);

        let latent = Tensor::zeros([2, 128], &device);
        let output = generator.forward(latent);
        assert_eq!(output.shape().dims, [2, 784]);
    }

    #[test]
    fn test_generator_output_within_tanh_range() {
        let device = Default::default();
        let config = GeneratorConfig::new(8, vec![16], 32);
        let generator = config.init::<TestBackend>(&device);

        let latent = Tensor::random([5, 8], burn::tensor::Distribution::Normal(0.0, 1.0), &device);
        let values: Vec<f32> = generator.forward(latent).into_data().to_vec().unwrap();
        assert_eq!(values.len(), 5 * 32);
        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_generator_without_hidden_layers() {
        let device = Default::default();
        let config = GeneratorConfig::new(4, vec![], 9);
        let generator = config.init::<TestBackend>(&device);

        let output = generator.forward(Tensor::ones([3, 4], &device));
        assert_eq!(output.shape().dims, [3, 9]);
    }
}
