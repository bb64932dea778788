//! vkframe demo - Main Entry Point
//!
//! Opens a window, draws a cube and a Sierpinski triangle, and flies the
//! camera with WASD/QE plus the arrow keys. Escape quits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use ash::vk;
use glam::Vec3;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use vkframe_core::{CameraConfig, ConfigSource, EngineConfig, FrameClock, SceneConfig, init_logging};
use vkframe_platform::{InputState, KeyCode, KeyMappings, Window};
use vkframe_renderer::{
    FrameInfo, GlobalResources, GlobalUbo, Model, RenderContext, Renderer, SceneRenderSystem,
    present_mode_for,
};
use vkframe_resources::{MeshData, primitives};
use vkframe_rhi::command::CommandPool;
use vkframe_rhi::device::Device;
use vkframe_scene::{Camera, CameraRig, GameObjects, KeyboardMovementController};

const DEFAULT_CONFIG_PATH: &str = "vkframe.toml";

/// GPU state. Dropping waits for the device to go idle, then fields drop
/// top to bottom so everything created from the device is released before
/// the context.
struct Engine {
    scene_system: SceneRenderSystem,
    global: GlobalResources,
    objects: GameObjects<Model>,
    renderer: Renderer,
    context: RenderContext,
}

impl Engine {
    fn new(window: &Window, config: &EngineConfig) -> Result<Self> {
        let context = RenderContext::new(window, config.renderer.validation_enabled())
            .context("failed to initialise Vulkan")?;
        let device = context.device().clone();

        let renderer = Renderer::new(
            &context,
            window.extent(),
            present_mode_for(config.renderer.present_mode),
            config.renderer.clear_color,
        )
        .context("failed to create the renderer")?;

        let global = GlobalResources::new(device.clone())?;
        let scene_system = SceneRenderSystem::new(
            device.clone(),
            renderer.render_pass(),
            renderer.render_pass_epoch(),
            global.set_layout().handle(),
            &config.shaders.vertex,
            &config.shaders.fragment,
        )
        .context("failed to build the scene pipeline")?;

        let objects = load_objects(&device, renderer.command_pool(), &config.scene)
            .context("failed to upload the scene")?;

        Ok(Self {
            scene_system,
            global,
            objects,
            renderer,
            context,
        })
    }

    fn draw_frame(
        &mut self,
        window_extent: vk::Extent2D,
        frame_time: f32,
        camera: &mut Camera,
        camera_config: &CameraConfig,
    ) -> Result<()> {
        let Some(command_buffer) = self.renderer.begin_frame(window_extent)? else {
            return Ok(());
        };
        self.scene_system
            .ensure_render_pass(self.renderer.render_pass(), self.renderer.render_pass_epoch())?;

        camera.set_perspective_projection(
            camera_config.fov_degrees.to_radians(),
            self.renderer.aspect_ratio(),
            camera_config.near,
            camera_config.far,
        );

        let frame_index = self.renderer.frame_index();
        self.global
            .update(frame_index, &GlobalUbo::new(camera.projection_view()))?;

        let frame_info = FrameInfo {
            frame_index,
            frame_time,
            command_buffer: &command_buffer,
            camera,
            global_descriptor_set: self.global.descriptor_set(frame_index),
        };

        self.renderer.begin_swap_chain_render_pass(&command_buffer);
        self.scene_system.render(&frame_info, &self.objects);
        self.renderer.end_swap_chain_render_pass(&command_buffer);
        self.renderer.end_frame()?;
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // The last frames may still be executing; pipelines, buffers and
        // descriptor sets below must not be destroyed under them.
        if let Err(e) = self.context.device().wait_idle() {
            error!("Failed to wait for device idle during shutdown: {:?}", e);
        }
    }
}

fn load_objects(
    device: &Arc<Device>,
    pool: &CommandPool,
    scene: &SceneConfig,
) -> Result<GameObjects<Model>> {
    let mut objects = GameObjects::new();

    let cube = Arc::new(Model::new(
        device.clone(),
        pool,
        &primitives::cube(Vec3::ZERO),
    )?);
    let object = objects.spawn();
    object.model = Some(cube);
    object.transform.translation = Vec3::new(0.8, 0.0, 2.5);
    object.transform.scale = Vec3::splat(0.5);

    if scene.sierpinski_depth == 0 {
        warn!("Sierpinski depth 0 produces no geometry, skipping");
    } else {
        let mut vertices = Vec::new();
        primitives::sierpinski(
            scene.sierpinski_depth,
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
            &mut vertices,
        );
        let mesh = MeshData::new(vertices).deduplicate()?;
        let triangle = Arc::new(Model::new(device.clone(), pool, &mesh)?);

        let object = objects.spawn();
        object.model = Some(triangle);
        object.transform.translation = Vec3::new(-0.8, 0.0, 2.5);
        object.transform.scale = Vec3::splat(1.2);
    }

    info!("Scene loaded with {} object(s)", objects.len());
    Ok(objects)
}

struct App {
    config: EngineConfig,
    // Dropped before the window so the surface never outlives it.
    engine: Option<Engine>,
    window: Option<Window>,
    input: InputState,
    key_mappings: KeyMappings,
    controller: KeyboardMovementController,
    rig: CameraRig,
    camera: Camera,
    clock: FrameClock,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: EngineConfig) -> Self {
        let controller =
            KeyboardMovementController::new(config.camera.move_speed, config.camera.look_speed);
        Self {
            config,
            engine: None,
            window: None,
            input: InputState::new(),
            key_mappings: KeyMappings::default(),
            controller,
            rig: CameraRig::default(),
            camera: Camera::new(),
            clock: FrameClock::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(window), Some(engine)) = (self.window.as_mut(), self.engine.as_mut()) else {
            return Ok(());
        };

        if window.take_resized() {
            engine.renderer.notify_resized();
        }

        let frame_time = self.clock.tick();
        let axes = self.key_mappings.axes(&self.input);
        self.controller
            .move_in_plane_xz(&axes, frame_time, &mut self.rig);
        self.camera.set_view_yxz(self.rig.position, self.rig.rotation);
        self.input.end_frame();

        engine.draw_frame(
            window.extent(),
            frame_time,
            &mut self.camera,
            &self.config.camera,
        )
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match Window::new(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                let err = anyhow::Error::new(e).context("failed to open window");
                return self.fail(event_loop, err);
            }
        };
        match Engine::new(&window, &self.config) {
            Ok(engine) => {
                info!("Initialization complete, entering main loop");
                self.engine = Some(engine);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = self.window.as_mut() {
                    window.mark_resized(size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state.is_pressed() {
                        self.input.on_key_pressed(key);
                    } else {
                        self.input.on_key_released(key);
                    }
                }
                if self.input.is_key_just_pressed(KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e.context("frame failed"));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH).to_path_buf())
}

fn main() -> Result<()> {
    let path = config_path();
    let (config, source) = EngineConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config {}", path.display()))?;

    init_logging(Some(&config.log_filter));
    match source {
        ConfigSource::File => info!("Starting vkframe with config {}", path.display()),
        ConfigSource::Defaults => {
            warn!("Config {} not found, using defaults", path.display())
        }
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
