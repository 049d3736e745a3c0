//! Named render pipelines, built on first use.
//!
//! The viewer needs three pipelines that differ only in blending, depth
//! writes and vertex layout, so a [`PipelineConfig`] describes just those
//! knobs and [`PipelineManager`] turns it into a `wgpu::RenderPipeline`.

use std::{collections::HashMap, sync::Arc};

use log::{debug, error};
use wgpu::*;

use super::helpers::LineVertex;
use crate::{
    error::{Result, WarehouseError},
    gfx::{resources::DepthTexture, scene::vertex::Vertex3D},
};

/// Vertex buffer layout a pipeline consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// [`Vertex3D`]: position and normal
    Mesh,
    /// [`LineVertex`]: position and colour
    Line,
}

impl VertexLayout {
    fn desc(self) -> VertexBufferLayout<'static> {
        match self {
            VertexLayout::Mesh => Vertex3D::desc(),
            VertexLayout::Line => LineVertex::desc(),
        }
    }
}

/// What a pipeline draws and how it blends.
///
/// Every pipeline tests against the shared depth buffer with `LessEqual`;
/// `depth_write` decides whether it also updates it.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth_write: bool,
    pub target_format: TextureFormat,
    pub blend: BlendState,
    pub vertex_layout: VertexLayout,
}

impl PipelineConfig {
    /// Opaque back-face culled triangles using `shader` (its `vs_main` and
    /// `fs_main` entry points).
    pub fn new(label: &str, shader: &str, target_format: TextureFormat) -> Self {
        Self {
            label: label.to_owned(),
            shader: shader.to_owned(),
            bind_group_layouts: Vec::new(),
            topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth_write: true,
            target_format,
            blend: BlendState::REPLACE,
            vertex_layout: VertexLayout::Mesh,
        }
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Alpha blended, reading depth but leaving it untouched so meshes
    /// behind still show through.
    pub fn translucent(mut self) -> Self {
        self.blend = BlendState::ALPHA_BLENDING;
        self.depth_write = false;
        self
    }

    /// Unculled line list of [`LineVertex`].
    pub fn lines(mut self) -> Self {
        self.topology = PrimitiveTopology::LineList;
        self.cull_mode = None;
        self.vertex_layout = VertexLayout::Line;
        self
    }
}

/// Shader modules and pipelines by name.
pub struct PipelineManager {
    device: Arc<Device>,
    shaders: HashMap<String, ShaderModule>,
    configs: HashMap<String, PipelineConfig>,
    pipelines: HashMap<String, RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            configs: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL module and stores it under `name`.
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shaders.insert(name.to_owned(), module);
    }

    /// Registers `config` under `name`, dropping any pipeline already built
    /// for that name.
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipelines.remove(name);
        self.configs.insert(name.to_owned(), config);
    }

    /// The pipeline registered as `name`, building it if needed.
    pub fn get_pipeline(&mut self, name: &str) -> Option<&RenderPipeline> {
        if !self.pipelines.contains_key(name) {
            let config = self.configs.get(name)?;
            match self.build(name, config) {
                Ok(pipeline) => {
                    self.pipelines.insert(name.to_owned(), pipeline);
                }
                Err(e) => {
                    error!("{e}");
                    return None;
                }
            }
        }
        self.pipelines.get(name)
    }

    /// Builds every registered pipeline that doesn't exist yet, so shader
    /// mistakes surface at start-up instead of on the first frame.
    pub fn create_all_pipelines(&mut self) -> Result<()> {
        let mut failures = Vec::new();
        for (name, config) in &self.configs {
            if self.pipelines.contains_key(name) {
                continue;
            }
            match self.build(name, config) {
                Ok(pipeline) => {
                    self.pipelines.insert(name.clone(), pipeline);
                }
                Err(e) => failures.push(e.to_string()),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(WarehouseError::Gpu(failures.join("; ")))
        }
    }

    fn build(&self, name: &str, config: &PipelineConfig) -> Result<RenderPipeline> {
        let shader = self.shaders.get(&config.shader).ok_or_else(|| {
            WarehouseError::Gpu(format!(
                "pipeline '{name}' needs shader '{}', which was never loaded",
                config.shader
            ))
        })?;

        let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", config.label)),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let targets = [Some(ColorTargetState {
            format: config.target_format,
            blend: Some(config.blend),
            write_mask: ColorWrites::ALL,
        })];

        let pipeline = self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[config.vertex_layout.desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: config.topology,
                cull_mode: config.cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DepthTexture::FORMAT,
                depth_write_enabled: config.depth_write,
                depth_compare: CompareFunction::LessEqual,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        debug!("built pipeline '{name}'");
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_meshes_keep_depth_read_only() {
        let config = PipelineConfig::new("TRANSPARENT", "mesh", TextureFormat::Bgra8Unorm)
            .translucent();
        assert!(!config.depth_write);
        assert_eq!(config.blend, BlendState::ALPHA_BLENDING);
        assert_eq!(config.cull_mode, Some(Face::Back));
        assert_eq!(config.vertex_layout, VertexLayout::Mesh);
    }

    #[test]
    fn line_pipelines_use_line_vertices() {
        let config = PipelineConfig::new("LINES", "line", TextureFormat::Bgra8Unorm)
            .lines()
            .translucent();
        assert_eq!(config.topology, PrimitiveTopology::LineList);
        assert_eq!(config.cull_mode, None);
        assert_eq!(config.vertex_layout, VertexLayout::Line);
        assert_eq!(config.vertex_layout.desc().array_stride, 28);
    }
}
