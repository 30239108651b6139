//! Model persistence: the final generator export and periodic resumable
//! checkpoints of the whole adversarial pair.

mod manager;
mod metadata;

pub use manager::{
    load_generator, save_generator, CheckpointData, CheckpointManager, CheckpointManagerConfig,
};
pub use metadata::{CheckpointHyperparameters, CheckpointMetadata};
