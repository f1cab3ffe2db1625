use log::info;
use winit::event_loop::EventLoop;

mod animation;
mod app;
mod error;
mod model;
mod parser;
mod renderer;
mod settings;

use settings::Settings;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // First positional argument overrides the configured model path
    let args: Vec<String> = std::env::args().collect();
    let settings = Settings::load().with_args(&args);
    info!(
        "Model: {} (pass a .glb/.gltf path as the first argument to load another)",
        settings.assets.model_path
    );

    let event_loop = EventLoop::new()?;

    let mut handler = app::AppHandler::new(settings, tokio::runtime::Runtime::new()?);
    event_loop.run_app(&mut handler)?;

    if let Some(err) = handler.take_error() {
        return Err(err.into());
    }
    Ok(())
}
