use crate::app::app::App;
use crate::app::frame_clock::FrameClock;
use crate::error::SkinError;
use crate::settings::Settings;
use log::error;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

pub struct AppHandler {
    app: Option<App>,
    settings: Settings,
    runtime: Runtime,
    clock: Option<FrameClock>,
    error: Option<SkinError>,
}

impl AppHandler {
    pub fn new(settings: Settings, runtime: Runtime) -> Self {
        Self {
            app: None,
            settings,
            runtime,
            clock: None,
            error: None,
        }
    }

    /// Fatal error that stopped the loop, if any
    pub fn take_error(&mut self) -> Option<SkinError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SkinError) {
        error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<App, SkinError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.settings.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.window.width as f64,
                self.settings.window.height as f64,
            ));

        let window = event_loop.create_window(window_attrs)?;
        self.runtime
            .block_on(App::new(Arc::new(window), &self.settings))
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() || self.error.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(app) => {
                self.clock = Some(FrameClock::new(self.settings.window.target_fps, Instant::now()));
                self.app = Some(app);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = &mut self.app else {
            return;
        };

        if let WindowEvent::RedrawRequested = event {
            if let Err(e) = app.render() {
                self.fail(event_loop, e);
            }
            return;
        }

        let response = app.handle_event(&event);
        if response.repaint {
            app.window.request_redraw();
        }
        if response.exit {
            event_loop.exit();
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(app) = &mut self.app {
            app.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(app), Some(clock)) = (&mut self.app, &mut self.clock) else {
            return;
        };

        let now = Instant::now();
        if clock.poll(now) {
            let dt = clock.delta(now);
            app.tick(clock.elapsed(now).as_secs_f64(), dt);
            app.window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(clock.next_deadline()));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = self.app.take() {
            app.shutdown();
        }
    }
}
