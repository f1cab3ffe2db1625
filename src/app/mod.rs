#[allow(clippy::module_inception)]
pub mod app;
pub mod frame_clock;
pub mod handler;
pub mod input;

pub use handler::AppHandler;
