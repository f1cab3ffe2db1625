// Animation system module

pub mod instance;
pub mod interpolation;
pub mod pose;
pub mod types;

pub use instance::{AnimatedInstance, PlaybackMode};
pub use interpolation::*;
pub use pose::BonePose;
pub use types::*;
