// Screen-space text drawn with egui on top of the 3D scene

use egui::{Color32, Pos2, RichText};

const FONT_SIZE: f32 = 20.0;
const HELP_COLOR: Color32 = Color32::from_rgb(130, 130, 130);
const PARAM_COLOR: Color32 = Color32::from_rgb(230, 41, 55);

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine {
    pub text: String,
    pub pos: Pos2,
    pub color: Color32,
}

/// Help text and the current blend parameter
pub fn overlay_lines(param: f32) -> Vec<OverlayLine> {
    vec![
        OverlayLine {
            text: "Use the T/G to switch animation".to_string(),
            pos: Pos2::new(10.0, 10.0),
            color: HELP_COLOR,
        },
        OverlayLine {
            text: format!("param {:.6}", param),
            pos: Pos2::new(20.0, 40.0),
            color: PARAM_COLOR,
        },
    ]
}

pub fn draw_overlay(ctx: &egui::Context, param: f32) {
    for (i, line) in overlay_lines(param).into_iter().enumerate() {
        egui::Area::new(egui::Id::new(("overlay", i)))
            .fixed_pos(line.pos)
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(RichText::new(line.text).size(FONT_SIZE).color(line.color));
            });
    }
}
