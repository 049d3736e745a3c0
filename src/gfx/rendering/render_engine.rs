//! WGPU-based rendering engine for the warehouse map
//!
//! Owns the surface, device and pipelines. A frame draws opaque meshes first,
//! then transparent meshes back to front, then the grid and axes helpers, and
//! finally hands the encoder to the UI overlay.

use std::sync::Arc;

use cgmath::Vector3;
use log::{error, info, warn};
use wgpu::{Device, TextureFormat};

use crate::{
    error::{Result, WarehouseError},
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig},
            material::MaterialBindings,
            texture_resource::DepthTexture,
        },
        scene::{DrawMesh, MeshLayouts, Scene, TransformBindings},
    },
    theme::Color,
};

use super::{
    helpers::{axes_lines, grid_lines, LineBuffer},
    pipeline_manager::{PipelineConfig, PipelineManager},
};

const OPAQUE: &str = "Opaque";
const TRANSPARENT: &str = "Transparent";
const LINES: &str = "Lines";

/// Outcome of [`RenderEngine::render_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The surface was busy or had to be reconfigured.
    Retry,
    /// The surface failed in a way another attempt won't fix.
    Failed,
}

impl FrameStatus {
    fn from_error(error: &wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Lost
            | wgpu::SurfaceError::Outdated
            | wgpu::SurfaceError::Timeout => FrameStatus::Retry,
            _ => FrameStatus::Failed,
        }
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_bindings: TransformBindings,
    material_bindings: MaterialBindings,
    light_config: LightConfig,
    background: wgpu::Color,
    grid: LineBuffer,
    axes: LineBuffer,
    pub show_helpers: bool,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    ///
    /// # Errors
    /// [`WarehouseError::Gpu`] when no surface, adapter or device is available.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| WarehouseError::Gpu(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| WarehouseError::Gpu(e.to_string()))?;
        info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| WarehouseError::Gpu(e.to_string()))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| WarehouseError::Gpu("surface reports no formats".into()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            // Frames are only drawn when the scene changed
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::new(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);
        let transform_bindings = TransformBindings::new(&device);
        let material_bindings = MaterialBindings::new(&device);

        let grid = LineBuffer::new(&device, "Grid Vertex Buffer", &grid_lines(2000.0, 200, 0.25));
        let axes = LineBuffer::new(&device, "Axes Vertex Buffer", &axes_lines(1200.0));

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("mesh", include_str!("mesh.wgsl"));
        pipeline_manager.load_shader("line", include_str!("line.wgsl"));

        let mesh_layouts = vec![
            global_bindings.bind_group_layout().clone(),
            transform_bindings.bind_group_layout().clone(),
            material_bindings.bind_group_layout().clone(),
        ];

        pipeline_manager.register_pipeline(
            OPAQUE,
            PipelineConfig::new("OPAQUE", "mesh", format)
                .with_bind_group_layouts(mesh_layouts.clone()),
        );

        pipeline_manager.register_pipeline(
            TRANSPARENT,
            PipelineConfig::new("TRANSPARENT", "mesh", format)
                .translucent()
                .with_bind_group_layouts(mesh_layouts),
        );

        pipeline_manager.register_pipeline(
            LINES,
            PipelineConfig::new("LINES", "line", format)
                .lines()
                .translucent()
                .with_bind_group_layouts(vec![global_bindings.bind_group_layout().clone()]),
        );

        pipeline_manager.create_all_pipelines()?;

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            pipeline_manager,
            global_bindings,
            global_ubo,
            transform_bindings,
            material_bindings,
            light_config: LightConfig::default(),
            background: wgpu::Color::BLACK,
            grid,
            axes,
            show_helpers: true,
        })
    }

    /// Uploads pending meshes and draws one frame seen from `eye`
    ///
    /// The optional `ui_callback` records the overlay into the same encoder
    /// after the scene. A [`FrameStatus::Retry`] means nothing was drawn and
    /// the caller should ask for another redraw.
    pub fn render_frame<F>(
        &mut self,
        scene: &mut Scene,
        eye: Vector3<f32>,
        ui_callback: Option<F>,
    ) -> FrameStatus
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e) => {
                match e {
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                        warn!("surface lost, reconfiguring");
                        self.surface.configure(&self.device, &self.config);
                    }
                    wgpu::SurfaceError::Timeout => warn!("timed out waiting for the next frame"),
                    _ => error!("failed to acquire the next frame: {e}"),
                }
                return FrameStatus::from_error(&e);
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        scene.prepare_gpu(
            &self.device,
            &self.queue,
            &MeshLayouts {
                transform: &self.transform_bindings,
                material: &self.material_bindings,
            },
        );
        let scene: &Scene = scene;
        let (opaque, transparent) = scene.draw_order(eye);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(globals) = self.global_bindings.bind_group() {
                render_pass.set_bind_group(0, globals, &[]);
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(OPAQUE) {
                render_pass.set_pipeline(pipeline);
                for id in &opaque {
                    if let Some(mesh) = scene.node(*id).mesh() {
                        render_pass.draw_mesh(mesh);
                    }
                }
            }

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(TRANSPARENT) {
                render_pass.set_pipeline(pipeline);
                for id in &transparent {
                    if let Some(mesh) = scene.node(*id).mesh() {
                        render_pass.draw_mesh(mesh);
                    }
                }
            }

            if self.show_helpers {
                if let Some(pipeline) = self.pipeline_manager.get_pipeline(LINES) {
                    render_pass.set_pipeline(pipeline);
                    self.grid.draw(&mut render_pass);
                    self.axes.draw(&mut render_pass);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        FrameStatus::Presented
    }

    /// Pushes the camera matrices and lights to the GPU.
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            camera_uniform,
            &self.light_config,
        );
    }

    /// Clear colour behind the scene.
    pub fn set_background(&mut self, color: Color) {
        self.background = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: 1.0,
        };
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = DepthTexture::new(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
