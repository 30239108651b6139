mod discriminator;
mod generator;

pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use generator::{Generator, GeneratorConfig};

/// Architecture of both networks plus the image geometry they agree on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub image_width: u32,
    pub image_height: u32,
    pub generator_hidden: Vec<usize>,
    pub discriminator_hidden: Vec<usize>,
    pub negative_slope: f64,
    pub dropout: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            image_width: 28,
            image_height: 28,
            generator_hidden: vec![256, 512, 1024],
            discriminator_hidden: vec![1024, 512, 256],
            negative_slope: 0.2,
            dropout: 0.3,
        }
    }
}

impl NetworkConfig {
    /// Number of values in one flattened sample.
    pub fn sample_dim(&self) -> usize {
        (self.image_width * self.image_height) as usize
    }

    pub fn generator(&self, latent_dim: usize) -> GeneratorConfig {
        GeneratorConfig::new(latent_dim, self.generator_hidden.clone(), self.sample_dim())
            .with_negative_slope(self.negative_slope)
    }

    pub fn discriminator(&self) -> DiscriminatorConfig {
        DiscriminatorConfig::new(self.sample_dim(), self.discriminator_hidden.clone())
            .with_negative_slope(self.negative_slope)
            .with_dropout(self.dropout)
    }
}

#[cfg(test)]
pub(crate) fn flatten_linear_params<'a, B, I>(layers: I) -> Vec<f32>
where
    B: burn::prelude::Backend,
    I: Iterator<Item = &'a burn::nn::Linear<B>>,
{
    let mut values = Vec::new();
    for layer in layers {
        values.extend(layer.weight.val().into_data().to_vec::<f32>().unwrap());
        if let Some(bias) = &layer.bias {
            values.extend(bias.val().into_data().to_vec::<f32>().unwrap());
        }
    }
    values
}
