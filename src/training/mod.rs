//! Training infrastructure: the epoch driver and the loss/snapshot history it
//! accumulates.

pub mod history;
pub mod trainer;

pub use history::TrainingHistory;
pub use trainer::{Trainer, TrainerConfig};
