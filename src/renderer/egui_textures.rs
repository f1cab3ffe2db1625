// egui texture bookkeeping, applied every frame whether or not the frame is drawn

use egui::TextureId;
use egui::epaint::ImageDelta;

/// Receiver of egui texture allocations and partial updates
pub trait TextureSink {
    fn set_texture(&mut self, id: TextureId, delta: &ImageDelta);
    fn free_texture(&mut self, id: &TextureId);
}

/// The egui-wgpu renderer together with the queue and device it uploads through
pub struct EguiTextures<'a> {
    pub renderer: &'a mut egui_wgpu::Renderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl TextureSink for EguiTextures<'_> {
    fn set_texture(&mut self, id: TextureId, delta: &ImageDelta) {
        self.renderer.update_texture(self.device, self.queue, id, delta);
    }

    fn free_texture(&mut self, id: &TextureId) {
        self.renderer.free_texture(id);
    }
}

/// Allocations and partial updates; must run before anything can skip the frame.
/// Later deltas patch earlier allocations, so dropping one breaks the next frame.
pub fn upload_textures(sink: &mut impl TextureSink, delta: &egui::TexturesDelta) {
    for (id, image_delta) in &delta.set {
        sink.set_texture(*id, image_delta);
    }
}

/// Frees requested by egui; run after the frame is drawn or skipped
pub fn release_textures(sink: &mut impl TextureSink, delta: &egui::TexturesDelta) {
    for id in &delta.free {
        sink.free_texture(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::overlay::draw_overlay;
    use std::collections::HashSet;

    /// Mirrors egui-wgpu: partial updates need an earlier full allocation
    #[derive(Default)]
    struct RecordingSink {
        allocated: HashSet<TextureId>,
        partial_updates: usize,
    }

    impl TextureSink for RecordingSink {
        fn set_texture(&mut self, id: TextureId, delta: &ImageDelta) {
            if delta.pos.is_some() {
                assert!(
                    self.allocated.contains(&id),
                    "partial update of unallocated texture {id:?}"
                );
                self.partial_updates += 1;
            } else {
                self.allocated.insert(id);
            }
        }

        fn free_texture(&mut self, id: &TextureId) {
            self.allocated.remove(id);
        }
    }

    fn overlay_frame(ctx: &egui::Context, param: f32) -> egui::TexturesDelta {
        ctx.run(egui::RawInput::default(), |ctx| draw_overlay(ctx, param))
            .textures_delta
    }

    #[test]
    fn skipped_frame_still_allocates_font_atlas() {
        let ctx = egui::Context::default();
        let mut sink = RecordingSink::default();

        // First frame is uploaded but not drawn (minimized or surface outdated)
        let first = overlay_frame(&ctx, 0.5);
        assert!(!first.set.is_empty());
        upload_textures(&mut sink, &first);
        release_textures(&mut sink, &first);
        assert!(!sink.allocated.is_empty());

        // New digits patch the atlas the first frame allocated
        let second = overlay_frame(&ctx, 0.987654);
        upload_textures(&mut sink, &second);
        release_textures(&mut sink, &second);
        assert!(!sink.allocated.is_empty());
    }

    #[test]
    fn frees_drop_allocations() {
        let mut sink = RecordingSink::default();
        let id = TextureId::Managed(7);
        let mut delta = egui::TexturesDelta::default();
        delta.set.push((
            id,
            ImageDelta::full(egui::ColorImage::filled([1, 1], egui::Color32::WHITE), Default::default()),
        ));
        upload_textures(&mut sink, &delta);
        assert!(sink.allocated.contains(&id));

        let freed = egui::TexturesDelta {
            set: Vec::new(),
            free: vec![id],
        };
        release_textures(&mut sink, &freed);
        assert!(sink.allocated.is_empty());
    }
}
