//! Per-mesh surface material
//!
//! Each mesh owns its material so the selection manager can recolour or fade
//! one mesh without touching the others. The style a mesh was drawn with is
//! kept as `base` so every change can be undone.

use wgpu::Device;

use crate::{
    theme::{Color, MaterialStyle},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Layout shared by every material bind group (slot 2 of the mesh pipelines).
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Material Bind Group");

        MaterialBindings { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    fn create_bind_group(&self, device: &Device, ubo: &MaterialUBO) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Material Bind Group")
    }
}

struct MaterialGpu {
    ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
}

/// Material of a single mesh
pub struct Material {
    /// Style the mesh was drawn with.
    pub base: MaterialStyle,
    color: Color,
    opacity: f32,

    gpu: Option<MaterialGpu>,
}

impl Material {
    pub fn new(base: MaterialStyle) -> Self {
        Self {
            base,
            color: base.color,
            opacity: base.opacity,
            gpu: None,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn restore(&mut self) {
        self.restore_color();
        self.restore_opacity();
    }

    pub fn restore_color(&mut self) {
        self.color = self.base.color;
    }

    pub fn restore_opacity(&mut self) {
        self.opacity = self.base.opacity;
    }

    /// Opaque materials ignore their opacity entirely.
    pub fn is_transparent(&self) -> bool {
        self.base.transparent && self.opacity < 1.0
    }

    pub fn uniform(&self) -> MaterialUniform {
        let alpha = if self.base.transparent {
            self.opacity
        } else {
            1.0
        };
        MaterialUniform {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Creates the GPU buffer on first use and uploads the current colour.
    pub fn sync_gpu(&mut self, device: &Device, queue: &wgpu::Queue, bindings: &MaterialBindings) {
        let uniform = self.uniform();
        match &mut self.gpu {
            Some(gpu) => gpu.ubo.update_content(queue, uniform),
            None => {
                let ubo = MaterialUBO::new_with_data(device, &uniform);
                let bind_group = bindings.create_bind_group(device, &ubo);
                self.gpu = Some(MaterialGpu { ubo, bind_group });
            }
        }
    }

    /// Gets the bind group for rendering, `None` before the first sync.
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("base", &self.base)
            .field("color", &self.color)
            .field("opacity", &self.opacity)
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}
