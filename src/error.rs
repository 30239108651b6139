use std::path::PathBuf;

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("failed to reload snapshots: {0}")]
    Snapshot(#[from] ArtifactError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while rendering or writing image artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("sample buffer of {len} values is not a whole number of {width}x{height} images")]
    SampleShape { len: usize, width: u32, height: u32 },

    #[error("nothing to render: {0}")]
    Empty(&'static str),

    #[error("tensor data extraction failed: {0}")]
    Tensor(String),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("dataset is empty, nothing to train on")]
    EmptyDataset,

    #[error("dataset samples have {actual} values but the networks expect {expected}")]
    SampleDim { expected: usize, actual: usize },

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_error_display() {
        let err = CheckpointError::NoLatestSymlink(PathBuf::from("checkpoints"));
        assert_eq!(
            err.to_string(),
            "no 'latest' symlink found in checkpoints"
        );
    }

    #[test]
    fn test_training_error_display() {
        let err = TrainingError::SampleDim {
            expected: 784,
            actual: 64,
        };
        assert_eq!(
            err.to_string(),
            "dataset samples have 64 values but the networks expect 784"
        );
        assert_eq!(
            TrainingError::EmptyDataset.to_string(),
            "dataset is empty, nothing to train on"
        );
    }

    #[test]
    fn test_artifact_error_wraps_into_training_error() {
        let err: TrainingError = ArtifactError::Empty("no snapshots").into();
        assert_eq!(err.to_string(), "artifact error: nothing to render: no snapshots");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("gan.learning_rate must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: gan.learning_rate must be > 0"
        );
    }
}
