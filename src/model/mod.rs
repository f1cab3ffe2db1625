pub mod material;
pub mod mesh;
pub mod model;
pub mod skeleton;
mod texture;

pub use material::Material;
pub use mesh::{Mesh, SkinnedVertex};
pub use model::SkinnedModel;
pub use skeleton::{Bone, Skeleton, MAX_BONES};
pub use texture::*;
