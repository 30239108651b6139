use burn::nn::{Dropout, DropoutConfig, LeakyRelu, LeakyReluConfig, Linear, LinearConfig, Sigmoid};
use burn::prelude::*;

/// Feed-forward discriminator mapping flattened images to a realness probability.
///
/// With the default widths:
/// ```text
/// Input:  [batch, 784]
/// FC1:    784 -> 1024, LeakyReLU(0.2), Dropout(0.3)
/// FC2:    1024 -> 512, LeakyReLU(0.2), Dropout(0.3)
/// FC3:    512 -> 256,  LeakyReLU(0.2), Dropout(0.3)
/// FC4:    256 -> 1,    Sigmoid
/// ```
///
/// Dropout is only active on an autodiff backend, so the training copy always
/// runs in training mode and `valid()` copies run deterministically.
#[derive(Module, Debug)]
pub struct Discriminator<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    activation: LeakyRelu,
    dropout: Dropout,
    sigmoid: Sigmoid,
}

#[derive(Config, Debug)]
pub struct DiscriminatorConfig {
    pub input_dim: usize,
    pub hidden: Vec<usize>,
    #[config(default = 0.2)]
    pub negative_slope: f64,
    #[config(default = 0.3)]
    pub dropout: f64,
}

impl DiscriminatorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Discriminator<B> {
        let mut hidden = Vec::with_capacity(self.hidden.len());
        let mut fan_in = self.input_dim;
        for &width in &self.hidden {
            hidden.push(LinearConfig::new(fan_in, width).init(device));
            fan_in = width;
        }

        Discriminator {
            hidden,
            output: LinearConfig::new(fan_in, 1).init(device),
            activation: LeakyReluConfig::new()
                .with_negative_slope(self.negative_slope)
                .init(),
            dropout: DropoutConfig::new(self.dropout).init(),
            sigmoid: Sigmoid::new(),
        }
    }
}

impl<B: Backend> Discriminator<B> {
    /// Forward pass: samples [batch, input_dim] -> probabilities [batch, 1].
    pub fn forward(&self, samples: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = samples;
        for layer in &self.hidden {
            x = self.dropout.forward(self.activation.forward(layer.forward(x)));
        }
        self.sigmoid.forward(self.output.forward(x))
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
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray;

    #[test]
    fn test_discriminator_output_shape() {
        let device = Default::default();
        let config = DiscriminatorConfig::new(784, vec![1024, 512, 256]);
        let discriminator = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([2, 784], &device);
        let output = discriminator.forward(input);
        assert_eq!(output.shape().dims, [2, 1]);
    }

    #[test]
    fn test_discriminator_outputs_probabilities() {
        let device = Default::default();
        let config = DiscriminatorConfig::new(16, vec![8]);
        let discriminator = config.init::<Autodiff<TestBackend>>(&device);

        let input = Tensor::random([6, 16], burn::tensor::Distribution::Normal(0.0, 1.0), &device);
        let values: Vec<f32> = discriminator.forward(input).into_data().to_vec().unwrap();
        assert_eq!(values.len(), 6);
        assert!(values.iter().all(|p| *p > 0.0 && *p < 1.0));
    }

    #[test]
    fn test_default_dropout_probability() {
        let config = DiscriminatorConfig::new(784, vec![256]);
        assert!((config.dropout - 0.3).abs() < 1e-12);
        assert!((config.negative_slope - 0.2).abs() < 1e-12);
    }
}
