use std::path::Path;

use tracing::warn;

use crate::checkpoint::CheckpointManagerConfig;
use crate::data::{DataConfig, DataSource};
use crate::error::ConfigError;
use crate::gan::{GanConfig, NetworkConfig};
use crate::training::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gan: GanConfig,
    pub network: NetworkConfig,
    pub data: DataConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gan = &self.gan;
        if gan.batch_size == 0 {
            return Err(invalid("gan.batch_size must be > 0"));
        }
        if gan.latent_dim == 0 {
            return Err(invalid("gan.latent_dim must be > 0"));
        }
        if gan.discriminator_steps == 0 {
            return Err(invalid("gan.discriminator_steps must be >= 1"));
        }
        if gan.learning_rate.is_nan() || gan.learning_rate <= 0.0 {
            return Err(invalid("gan.learning_rate must be > 0"));
        }
        if !(0.0..1.0).contains(&gan.beta_1) {
            return Err(invalid("gan.beta_1 must be in [0, 1)"));
        }
        if !(0.0..1.0).contains(&gan.beta_2) {
            return Err(invalid("gan.beta_2 must be in [0, 1)"));
        }
        if gan.epsilon.is_nan() || gan.epsilon <= 0.0 {
            return Err(invalid("gan.epsilon must be > 0"));
        }

        let network = &self.network;
        if network.image_width == 0 || network.image_height == 0 {
            return Err(invalid("network image dimensions must be > 0"));
        }
        if network.negative_slope < 0.0 {
            return Err(invalid("network.negative_slope must be >= 0"));
        }
        if !(0.0..1.0).contains(&network.dropout) {
            return Err(invalid("network.dropout must be in [0, 1)"));
        }
        if network.generator_hidden.contains(&0) || network.discriminator_hidden.contains(&0) {
            return Err(invalid("network hidden layer widths must be > 0"));
        }
        if self.data.source == DataSource::Mnist
            && (network.image_width, network.image_height) != (28, 28)
        {
            return Err(invalid("the mnist source requires 28x28 network geometry"));
        }

        if self.data.source == DataSource::Synthetic && self.data.synthetic_samples == 0 {
            return Err(invalid("data.synthetic_samples must be > 0"));
        }
        if self.data.max_samples == Some(0) {
            return Err(invalid("data.max_samples must be > 0 when set"));
        }

        let training = &self.training;
        if training.epochs == 0 {
            return Err(invalid("training.epochs must be > 0"));
        }
        if training.sample_size == 0 {
            return Err(invalid("training.sample_size must be > 0"));
        }
        if training.grid_nrow == 0 {
            return Err(invalid("training.grid_nrow must be > 0"));
        }

        if self.checkpoint.keep_last_n == 0 {
            return Err(invalid("checkpoint.keep_last_n must be >= 1"));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_defaults_match_reference_hyperparameters() {
        let config = AppConfig::default();
        assert_eq!(config.gan.batch_size, 512);
        assert_eq!(config.gan.latent_dim, 128);
        assert_eq!(config.gan.discriminator_steps, 1);
        assert!((config.gan.learning_rate - 2e-4).abs() < 1e-12);
        assert_eq!(config.training.epochs, 200);
        assert_eq!(config.training.sample_size, 64);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[gan]
learning_rate = 0.001
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!((config.gan.learning_rate - 0.001).abs() < 1e-9);
        assert_eq!(config.gan.batch_size, 512);
        assert_eq!(config.training.epochs, 200);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validation_rejects_zero_batch_size() {
        let mut config = AppConfig::default();
        config.gan.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_epochs() {
        let mut config = AppConfig::default();
        config.training.epochs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_discriminator_steps() {
        let mut config = AppConfig::default();
        config.gan.discriminator_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_positive_lr() {
        let mut config = AppConfig::default();
        config.gan.learning_rate = 0.0;
        assert!(config.validate().is_err());
        config.gan.learning_rate = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_betas_out_of_range() {
        let mut config = AppConfig::default();
        config.gan.beta_1 = 1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.gan.beta_2 = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_positive_epsilon() {
        let mut config = AppConfig::default();
        config.gan.epsilon = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_dropout_out_of_range() {
        let mut config = AppConfig::default();
        config.network.dropout = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_negative_slope() {
        let mut config = AppConfig::default();
        config.network.negative_slope = -0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_mnist_with_other_geometry() {
        let mut config = AppConfig::default();
        config.network.image_width = 16;
        config.network.image_height = 16;
        assert!(config.validate().is_err());

        config.data.source = DataSource::Synthetic;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_synthetic_source() {
        let mut config = AppConfig::default();
        config.data.source = DataSource::Synthetic;
        config.data.synthetic_samples = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.training.epochs, 200);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[training]
epochs = 5

[data]
source = "synthetic"
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.training.epochs, 5);
        assert_eq!(config.data.source, DataSource::Synthetic);
        assert_eq!(config.gan.latent_dim, 128);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[gan]\nbatch_size = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));

        std::fs::write(&path, "[gan\n").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
        assert_eq!(config, AppConfig::default());
    }
}
