//! Line helpers drawn around the map: a floor grid and the world axes.
//!
//! They live outside the scene graph, so clicks never land on them.

use wgpu::util::DeviceExt;

/// Vertex of a line list, colour carries its own alpha.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

const GRID_CENTER_COLOR: [f32; 3] = [0x44 as f32 / 255.0; 3];
const GRID_COLOR: [f32; 3] = [0x88 as f32 / 255.0; 3];

/// Square grid on the y = 0 plane centred on the origin, `size` wide and cut
/// into `divisions` cells per side. The two centre lines are darker.
pub fn grid_lines(size: f32, divisions: u32, opacity: f32) -> Vec<LineVertex> {
    let half = size / 2.0;
    let step = size / divisions.max(1) as f32;
    let centre = divisions / 2;

    let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let [r, g, b] = if i == centre { GRID_CENTER_COLOR } else { GRID_COLOR };
        let color = [r, g, b, opacity];

        vertices.push(LineVertex::new([-half, 0.0, k], color));
        vertices.push(LineVertex::new([half, 0.0, k], color));
        vertices.push(LineVertex::new([k, 0.0, -half], color));
        vertices.push(LineVertex::new([k, 0.0, half], color));
    }
    vertices
}

/// X, Y and Z axes from the origin, coloured red, green and blue.
pub fn axes_lines(length: f32) -> Vec<LineVertex> {
    let origin = [0.0, 0.0, 0.0];
    [
        ([length, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]),
        ([0.0, length, 0.0], [0.0, 1.0, 0.0, 1.0]),
        ([0.0, 0.0, length], [0.0, 0.0, 1.0, 1.0]),
    ]
    .into_iter()
    .flat_map(|(end, color)| [LineVertex::new(origin, color), LineVertex::new(end, color)])
    .collect()
}

/// Static line list uploaded once.
pub struct LineBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl LineBuffer {
    pub fn new(device: &wgpu::Device, label: &str, vertices: &[LineVertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            count: vertices.len() as u32,
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.buffer.slice(..));
        render_pass.draw(0..self.count, 0..1);
    }
}
