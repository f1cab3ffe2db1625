// wgpu rendering: skinning pipeline, ground grid and egui overlay

pub mod camera;
pub mod egui_textures;
pub mod gpu_model;
pub mod grid;
pub mod line_vertex;
pub mod overlay;
pub mod pose_buffer;
pub mod render;
#[allow(clippy::module_inception)]
pub mod renderer;
pub mod shader;
mod vertex;

pub use render::FrameScene;
pub use renderer::Renderer;
