//! Global uniform bindings for camera and scene data
//!
//! Manages GPU uniform buffers and bind groups for global rendering state
//! that is shared across all meshes in a scene: the camera matrices and the
//! two directional lights that shade the warehouse.

use cgmath::{InnerSpace, Vector3};

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// Unit vectors pointing from the scene towards each light.
    light_directions: [[f32; 4]; 2],
    /// Light colour in rgb, intensity in w.
    light_color: [f32; 4],
    /// Ambient colour in rgb, intensity in w.
    ambient: [f32; 4],
}

/// Directional lighting setup
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightConfig {
    /// Positions the lights shine from; only their direction matters.
    pub positions: [[f32; 3]; 2],
    pub color: [f32; 3],
    pub intensity: f32,
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            positions: [[-1000.0, 1000.0, -1000.0], [1000.0, 1000.0, 1000.0]],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            ambient: 0.2,
        }
    }
}

impl LightConfig {
    fn direction(position: [f32; 3]) -> [f32; 4] {
        let dir = Vector3::from(position).normalize();
        [dir.x, dir.y, dir.z, 0.0]
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Updates the global uniform buffer with camera and light data
///
/// # Arguments
/// * `ubo` - The global uniform buffer to update
/// * `queue` - WGPU command queue for buffer updates
/// * `camera` - Updated camera uniform data
/// * `light` - Light configuration
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: &LightConfig,
) {
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        light_directions: [
            LightConfig::direction(light.positions[0]),
            LightConfig::direction(light.positions[1]),
        ],
        light_color: [light.color[0], light.color[1], light.color[2], light.intensity],
        ambient: [light.color[0], light.color[1], light.color[2], light.ambient],
    };

    ubo.update_content(queue, content);
}

/// Manages bind group layouts and bind groups for global uniforms
///
/// This is bound to slot 0 in all render pipelines.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    /// Creates a new global bindings manager
    ///
    /// Sets up the bind group layout for global uniforms but doesn't
    /// create the actual bind group until `create_bind_group()` is called.
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // camera + lights
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// `None` until `create_bind_group()` has run.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}
