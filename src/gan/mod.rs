mod adversary;
pub mod loss;
pub mod networks;
pub mod sources;

pub use adversary::{Adversary, GanConfig};
pub use networks::{Discriminator, Generator, NetworkConfig};
pub use sources::{LabelSource, NoiseSource};
