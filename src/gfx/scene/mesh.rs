use cgmath::Matrix4;
use wgpu::{util::DeviceExt, Device};

use crate::{
    gfx::{
        geometry::GeometryData,
        resources::material::{Material, MaterialBindings},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Model matrix of one mesh, bound at slot 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
}

impl From<Matrix4<f32>> for TransformUniform {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self {
            model: matrix.into(),
        }
    }
}

pub struct TransformBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl TransformBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Transform Bind Group");

        Self { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

/// Bind group layouts a mesh needs to upload itself.
pub struct MeshLayouts<'a> {
    pub transform: &'a TransformBindings,
    pub material: &'a MaterialBindings,
}

/// GPU side of a mesh, created on first upload.
pub struct MeshGpu {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    transform: UniformBuffer<TransformUniform>,
    transform_bind_group: wgpu::BindGroup,
}

/// Geometry plus its own material
pub struct MeshNode {
    pub geometry: GeometryData,
    pub material: Material,
    gpu: Option<MeshGpu>,
}

impl MeshNode {
    pub fn new(geometry: GeometryData, material: Material) -> Self {
        Self {
            geometry,
            material,
            gpu: None,
        }
    }

    /// Uploads buffers on first call, afterwards only refreshes the world
    /// transform and material colour.
    pub fn sync_gpu(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layouts: &MeshLayouts,
        world: Matrix4<f32>,
    ) {
        match &mut self.gpu {
            Some(gpu) => gpu.transform.update_content(queue, world.into()),
            None => {
                let vertices = self.geometry.to_vertices();
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Index Buffer"),
                    contents: bytemuck::cast_slice(&self.geometry.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

                let transform = UniformBuffer::new_with_data(device, &world.into());
                let transform_bind_group = BindGroupBuilder::new(&layouts.transform.bind_group_layout)
                    .resource(transform.binding_resource())
                    .create(device, "Transform Bind Group");

                self.gpu = Some(MeshGpu {
                    vertex_buffer,
                    index_buffer,
                    index_count: self.geometry.indices.len() as u32,
                    transform,
                    transform_bind_group,
                });
            }
        }

        self.material.sync_gpu(device, queue, layouts.material);
    }
}

impl std::fmt::Debug for MeshNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshNode")
            .field("vertices", &self.geometry.vertex_count())
            .field("triangles", &self.geometry.triangle_count())
            .field("material", &self.material)
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}

pub trait DrawMesh<'a> {
    /// Binds slots 1 and 2 and draws; meshes not yet uploaded are skipped.
    fn draw_mesh(&mut self, mesh: &'a MeshNode);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b MeshNode) {
        let (Some(gpu), Some(material)) = (&mesh.gpu, mesh.material.bind_group()) else {
            return;
        };

        self.set_bind_group(1, &gpu.transform_bind_group, &[]);
        self.set_bind_group(2, material, &[]);
        self.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        self.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..gpu.index_count, 0, 0..1);
    }
}
