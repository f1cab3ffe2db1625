use crate::animation::{AnimatedInstance, AnimationClip, PlaybackMode};
use crate::app::input::{ClipSwitch, InputState};
use crate::error::SkinError;
use crate::model::SkinnedModel;
use crate::parser::{load_model, load_model_animations};
use crate::renderer::camera::{CameraController, CameraState};
use crate::renderer::gpu_model::GpuModel;
use crate::renderer::overlay::draw_overlay;
use crate::renderer::pose_buffer::{GpuPose, InstanceUniform};
use crate::renderer::shader::ShaderSources;
use crate::renderer::{FrameScene, Renderer};
use crate::settings::Settings;
use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use log::{debug, info, warn};
use nalgebra_glm as glm;
use std::sync::Arc;
use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window};

const INSTANCE_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// Pixels of trackpad scroll per wheel notch
const PIXELS_PER_LINE: f32 = 50.0;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

impl EventResponse {
    fn keep() -> Self {
        Self {
            repaint: false,
            exit: false,
        }
    }

    fn exit() -> Self {
        Self {
            repaint: false,
            exit: true,
        }
    }
}

/// Application context: everything the loop reads and writes, owned in one place
pub struct App {
    pub window: Arc<Window>,
    renderer: Renderer,
    egui_state: State,
    camera_controller: CameraController,
    input: InputState,
    model: SkinnedModel,
    gpu_model: GpuModel,
    clips: Vec<AnimationClip>,
    instances: [AnimatedInstance; 2],
    gpu_poses: [GpuPose; 2],
}

impl App {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> Result<Self, SkinError> {
        let shaders = ShaderSources::load(&settings.assets.shader_dir);
        let renderer = Renderer::new(window.clone(), &shaders).await?;

        let model = load_model(&settings.assets.model_path)?;
        let gpu_model = renderer.upload_model(&model);

        let clips = load_model_animations(&settings.assets.model_path)?;
        let bone_count = model.skeleton.len();
        if let Some(clip) = clips.iter().find(|c| c.bone_count() != bone_count) {
            return Err(SkinError::new("clip-bone-mismatch")
                .with_arg("clip", &clip.name)
                .with_arg("clip_bones", clip.bone_count())
                .with_arg("skeleton_bones", bone_count));
        }

        let instances = [
            AnimatedInstance::new(
                &model.skeleton,
                0,
                glm::vec3(0.0, 0.0, 0.0),
                PlaybackMode::Discrete,
            ),
            AnimatedInstance::new(
                &model.skeleton,
                1 % clips.len(),
                glm::vec3(0.0, 0.0, 2.0),
                PlaybackMode::interpolated(),
            ),
        ];
        let gpu_poses = [
            renderer.create_pose_buffer("Discrete"),
            renderer.create_pose_buffer("Interpolated"),
        ];

        let egui_state = State::new(
            renderer.egui_context(),
            egui::viewport::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        // Third-person camera: grab and hide the cursor
        if let Err(e) = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
        {
            warn!("Cursor grab unavailable: {}", e);
        }
        window.set_cursor_visible(false);

        info!(
            "Ready: {} clips, instances on clips {} and {}",
            clips.len(),
            instances[0].clip_index(),
            instances[1].clip_index()
        );

        let app = Self {
            window,
            renderer,
            egui_state,
            camera_controller: CameraController::new(CameraState::default()),
            input: InputState::new(),
            model,
            gpu_model,
            clips,
            instances,
            gpu_poses,
        };
        app.upload_poses();
        Ok(app)
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        let egui_response = self.egui_state.on_window_event(&self.window, event);

        match event {
            WindowEvent::CloseRequested => return EventResponse::exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return EventResponse::keep();
                };
                if code == KeyCode::Escape && event.state == ElementState::Pressed {
                    return EventResponse::exit();
                }
                if !self.input.on_key(code, event.state, event.repeat) {
                    self.camera_controller
                        .on_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => self.camera_controller.on_scroll(*y),
                MouseScrollDelta::PixelDelta(pos) => {
                    self.camera_controller.on_scroll(pos.y as f32 / PIXELS_PER_LINE)
                }
            },
            _ => {}
        }

        EventResponse {
            repaint: egui_response.repaint,
            exit: false,
        }
    }

    /// Raw device input; mouse motion keeps arriving while the cursor is grabbed
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.camera_controller.on_mouse_motion(delta.0, delta.1);
        }
    }

    /// One fixed-rate update: clip switching, per-instance playback, pose upload
    pub fn tick(&mut self, elapsed_seconds: f64, dt: f32) {
        if let Some(switch) = self.input.take_switch() {
            let count = self.clips.len();
            for instance in &mut self.instances {
                match switch {
                    ClipSwitch::Next => instance.next_clip(count),
                    ClipSwitch::Previous => instance.previous_clip(count),
                }
            }
            debug!(
                "Switched clips to {} / {}",
                self.clips[self.instances[0].clip_index()].name,
                self.clips[self.instances[1].clip_index()].name
            );
        }

        for instance in &mut self.instances {
            instance.tick(&self.model.skeleton, &self.clips, elapsed_seconds);
        }

        self.camera_controller.update(dt);
        self.upload_poses();
    }

    fn upload_poses(&self) {
        for (instance, gpu_pose) in self.instances.iter().zip(&self.gpu_poses) {
            let uniform = InstanceUniform::new(&instance.position, INSTANCE_TINT, instance.pose());
            self.renderer.write_pose(gpu_pose, &uniform);
        }
    }

    /// Blend parameter of the interpolated instance, shown in the overlay
    pub fn blend_param(&self) -> f32 {
        self.instances
            .iter()
            .find_map(|instance| instance.blend())
            .unwrap_or(0.0)
    }

    pub fn render(&mut self) -> Result<(), SkinError> {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();
        let param = self.blend_param();

        let full_output = egui_ctx.run(raw_input, |ctx| {
            draw_overlay(ctx, param);
        });

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = self.window.inner_size();
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let poses = [&self.gpu_poses[0], &self.gpu_poses[1]];
        let scene = FrameScene {
            camera: self.camera_controller.state(),
            model: &self.gpu_model,
            poses: &poses,
        };

        match self
            .renderer
            .render(&scene, paint_jobs, full_output.textures_delta, screen_descriptor)
        {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.renderer.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(SkinError::new("surface-out-of-memory").push_std(wgpu::SurfaceError::OutOfMemory))
            }
            Err(e) => {
                warn!("Skipping frame: {}", e);
                Ok(())
            }
        }
    }

    /// Release everything in reverse order of acquisition
    pub fn shutdown(self) {
        let App {
            window,
            renderer,
            egui_state,
            camera_controller,
            input,
            model,
            gpu_model,
            clips,
            instances,
            gpu_poses,
        } = self;

        drop(gpu_poses);
        drop(instances);
        debug!("Released bone poses");
        drop(clips);
        debug!("Released animation clips");
        drop(gpu_model);
        drop(model);
        debug!("Released model");
        drop(egui_state);
        drop(camera_controller);
        drop(input);
        drop(renderer);
        debug!("Released shaders and GPU context");

        if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            debug!("Cursor release failed: {}", e);
        }
        window.set_cursor_visible(true);
        drop(window);
        info!("Shutdown complete");
    }
}
