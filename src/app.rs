//! Native window and event loop around a [`WarehouseMap`].
//!
//! Frames are rendered on demand: input that moves the camera or changes the
//! selection marks the map dirty, and the loop only asks for a redraw then.

use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    error::EventLoopError,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::MapOptions,
    error::{Result, WarehouseError},
    gfx::rendering::{FrameStatus, RenderEngine},
    map::{DrawSummary, WarehouseMap},
    model::Warehouse,
    performance::PerformanceMonitor,
    ui::{default_map_panel, draw_labels, UiManager},
};

// UI callback type
pub type UiCallback = Box<dyn FnMut(&imgui::Ui, &mut WarehouseMap)>;

pub struct WarehouseApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    map: WarehouseMap,
    ui_callback: Option<UiCallback>,
    cursor: PhysicalPosition<f64>,
    performance: PerformanceMonitor,
    show_ui: bool,
    show_stats: bool,
    error: Option<WarehouseError>,
}

impl WarehouseApp {
    /// Creates the event loop and an empty map. The window and GPU come up
    /// once the loop is running.
    pub fn new(options: MapOptions) -> Result<Self> {
        let event_loop = EventLoop::new()?;

        Ok(Self {
            event_loop,
            app_state: AppState {
                window: None,
                render_engine: None,
                ui_manager: None,
                map: WarehouseMap::new(options),
                ui_callback: None,
                cursor: PhysicalPosition::new(0.0, 0.0),
                performance: PerformanceMonitor::new(),
                show_ui: true,
                show_stats: false,
                error: None,
            },
        })
    }

    pub fn map(&self) -> &WarehouseMap {
        &self.app_state.map
    }

    pub fn map_mut(&mut self) -> &mut WarehouseMap {
        &mut self.app_state.map
    }

    /// Draws a parsed warehouse into the map.
    pub fn load(&mut self, warehouse: &Warehouse) -> Result<DrawSummary> {
        self.app_state.map.draw_warehouse(warehouse)
    }

    /// Extra UI built every frame after the default panels
    pub fn set_ui<F>(&mut self, ui_fn: F)
    where
        F: FnMut(&imgui::Ui, &mut WarehouseMap) + 'static,
    {
        self.app_state.ui_callback = Some(Box::new(ui_fn));
    }

    /// Shows or hides the panels; area labels are always drawn.
    pub fn set_show_ui(&mut self, show: bool) {
        self.app_state.show_ui = show;
    }

    /// Runs until the window closes. Fails if the window or GPU could not
    /// be set up.
    pub fn run(self) -> Result<()> {
        let WarehouseApp {
            event_loop,
            mut app_state,
        } = self;

        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut app_state)?;

        match app_state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: WarehouseError) {
        error!("{e}");
        self.error = Some(e);
        event_loop.exit();
    }

    fn draw_frame(&mut self) {
        let AppState {
            window,
            render_engine,
            ui_manager,
            map,
            ui_callback,
            performance,
            show_ui,
            show_stats,
            ..
        } = self;
        let (Some(window), Some(render_engine)) = (window.as_ref(), render_engine.as_mut()) else {
            return;
        };

        performance.begin_frame();
        render_engine.update(map.camera.camera.uniform);

        if let Some(ui_manager) = ui_manager.as_mut() {
            let show_ui = *show_ui;
            let show_stats = *show_stats;
            let monitor: &PerformanceMonitor = performance;
            ui_manager.update_logic(window, |ui| {
                draw_labels(ui, map);
                if show_ui {
                    default_map_panel(ui, map);
                    if show_stats {
                        monitor.render_ui(ui);
                    } else {
                        monitor.render_overlay(ui);
                    }
                    if let Some(callback) = ui_callback.as_mut() {
                        callback(ui, map);
                    }
                }
            });
        }

        let eye = map.camera.camera.eye;
        let status = match ui_manager.as_mut() {
            Some(ui_manager) => render_engine.render_frame(
                &mut map.scene,
                eye,
                Some(
                    |device: &wgpu::Device,
                     queue: &wgpu::Queue,
                     encoder: &mut wgpu::CommandEncoder,
                     color_attachment: &wgpu::TextureView| {
                        ui_manager.render_display_only(
                            device,
                            queue,
                            encoder,
                            window,
                            color_attachment,
                        );
                    },
                ),
            ),
            None => render_engine.render_frame(
                &mut map.scene,
                eye,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };
        // The change that asked for this frame was already consumed. A
        // minimised window keeps reporting an outdated surface, so wait for
        // it to come back instead.
        let size = window.inner_size();
        if status == FrameStatus::Retry && size.width > 0 && size.height > 0 {
            map.redraw();
        }

        let vertex_count: usize = map
            .scene
            .meshes()
            .map(|(_, mesh)| mesh.geometry.vertex_count())
            .sum();
        performance.update_render_stats(map.scene.mesh_count() as u32, vertex_count as u32);
        performance.end_frame();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("warehouse3d")
            .with_inner_size(LogicalSize::new(1200, 800));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, EventLoopError::Os(e).into());
                return;
            }
        };

        let PhysicalSize { width, height } = window.inner_size();
        let mut renderer = match pollster::block_on(RenderEngine::new(window.clone(), width, height)) {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };
        info!("window ready at {width}x{height}");

        renderer.set_background(self.map.theme.background);
        self.map.resize(width, height);

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );

        window.request_redraw();
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        // Clicks are resolved at the last known cursor position
        if let WindowEvent::CursorMoved { position, .. } = event {
            self.cursor = position;
        }

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.map.pointer_down(button, self.cursor),
                ElementState::Released => {
                    self.map.pointer_up(button, self.cursor, window.inner_size());
                }
            },
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match key_event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                    PhysicalKey::Code(KeyCode::F1)
                        if key_event.state == ElementState::Pressed && !key_event.repeat =>
                    {
                        self.show_ui = !self.show_ui;
                        self.map.redraw();
                    }
                    PhysicalKey::Code(KeyCode::F2)
                        if key_event.state == ElementState::Pressed && !key_event.repeat =>
                    {
                        self.show_stats = !self.show_stats;
                        self.map.redraw();
                    }
                    _ => {
                        self.map.process_keyboard_event(&key_event);
                    }
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width > 0 && height > 0 {
                    render_engine.resize(width, height);
                    self.map.resize(width, height);
                }
            }
            WindowEvent::Focused(false) => self.map.camera.controller.release(),
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.draw_frame(),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.window.is_none() {
            return;
        }

        // Don't move the camera while the UI has the mouse or keyboard
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            let io = ui_manager.context.io();
            if io.want_capture_mouse || io.want_capture_keyboard {
                return;
            }
        }

        self.map.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            if self.map.take_scene_changed() {
                window.request_redraw();
            }
        }
    }
}
