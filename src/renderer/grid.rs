use crate::renderer::line_vertex::LineVertex;

const CENTER_COLOR: [f32; 3] = [0.5, 0.5, 0.5];
const LINE_COLOR: [f32; 3] = [0.75, 0.75, 0.75];

/// Ground grid on the XZ plane centred at the origin: `slices` cells per side, `spacing` apart
pub fn grid_lines(slices: u32, spacing: f32) -> Vec<LineVertex> {
    let half = (slices / 2) as i32;
    let extent = half as f32 * spacing;
    let mut vertices = Vec::with_capacity(((2 * half + 1) * 4) as usize);

    for i in -half..=half {
        let color = if i == 0 { CENTER_COLOR } else { LINE_COLOR };
        let offset = i as f32 * spacing;

        vertices.push(LineVertex::new([offset, 0.0, -extent], color));
        vertices.push(LineVertex::new([offset, 0.0, extent], color));

        vertices.push(LineVertex::new([-extent, 0.0, offset], color));
        vertices.push(LineVertex::new([extent, 0.0, offset], color));
    }

    vertices
}
