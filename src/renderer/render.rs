use crate::renderer::camera::CameraState;
use crate::renderer::egui_textures::{EguiTextures, release_textures, upload_textures};
use crate::renderer::gpu_model::GpuModel;
use crate::renderer::pose_buffer::GpuPose;
use crate::renderer::renderer::Renderer;
use egui_wgpu::ScreenDescriptor;

/// Off-white background, (245, 245, 245) sRGB in linear space
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.913,
    g: 0.913,
    b: 0.913,
    a: 1.0,
};

/// Everything drawn in one frame
pub struct FrameScene<'a> {
    pub camera: &'a CameraState,
    pub model: &'a GpuModel,
    pub poses: &'a [&'a GpuPose],
}

impl Renderer {
    pub fn render(
        &mut self,
        scene: &FrameScene,
        paint_jobs: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        screen_descriptor: ScreenDescriptor,
    ) -> Result<(), wgpu::SurfaceError> {
        upload_textures(&mut self.egui_textures(), &textures_delta);
        let result = self.draw_frame(scene, &paint_jobs, &screen_descriptor);
        release_textures(&mut self.egui_textures(), &textures_delta);
        result
    }

    fn egui_textures(&mut self) -> EguiTextures<'_> {
        EguiTextures {
            renderer: &mut self.egui_renderer,
            device: &self.device,
            queue: &self.queue,
        }
    }

    fn draw_frame(
        &mut self,
        scene: &FrameScene,
        paint_jobs: &[egui::ClippedPrimitive],
        screen_descriptor: &ScreenDescriptor,
    ) -> Result<(), wgpu::SurfaceError> {
        // Skip rendering if window size is invalid (minimized, not ready, etc.)
        if self.config.width == 0 || self.config.height == 0 {
            return Ok(());
        }

        let aspect = self.config.width as f32 / self.config.height as f32;
        let view_proj: [[f32; 4]; 4] = scene.camera.view_proj(aspect).into();
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&view_proj));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
            render_pass.draw(0..self.num_grid_vertices, 0..1);

            render_pass.set_pipeline(&self.skin_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for pose in scene.poses {
                render_pass.set_bind_group(1, &pose.bind_group, &[]);
                for mesh in &scene.model.meshes {
                    let material = &scene.model.materials[mesh.material];
                    render_pass.set_bind_group(2, &material.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
                }
            }
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            paint_jobs,
            screen_descriptor,
        );

        {
            let mut egui_rpass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut egui_rpass, paint_jobs, screen_descriptor);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    pub fn write_pose(&self, pose: &GpuPose, uniform: &crate::renderer::pose_buffer::InstanceUniform) {
        pose.write(&self.queue, uniform);
    }
}
