// glTF asset loading

pub mod load;
pub mod sampler;

pub use load::{load_model, load_model_animations};
