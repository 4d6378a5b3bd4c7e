//! Application management for the engine

use crate::config::EngineConfig;
use crate::core::entity::{Entity, NodeKind};
use crate::error::SceneError;
use crate::graphics::{Blitter, Renderer2D};
use crate::input::InputEvent;
use crate::scene::SceneContext;
use glam::Vec2;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

/// Failures that end the run
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Main engine application struct that implements ApplicationHandler
pub struct EngineApp<B: Blitter> {
    config: EngineConfig,
    scene: SceneContext,
    root: Entity,
    renderer: Renderer2D,
    blitter: B,
    window: Option<Arc<Window>>,
    pending_input: Vec<InputEvent>,
    last_frame: Instant,
    next_frame: Instant,
    frames: u64,
    fatal: Option<AppError>,
}

impl<B: Blitter> EngineApp<B> {
    pub fn scene(&self) -> &SceneContext {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneContext {
        &mut self.scene
    }

    /// The root node the main script is attached to
    pub fn root(&self) -> Entity {
        self.root
    }

    pub fn blitter(&self) -> &B {
        &self.blitter
    }

    pub fn renderer(&self) -> &Renderer2D {
        &self.renderer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Queue a key event for the next frame
    pub fn queue_input(&mut self, event: InputEvent) {
        self.pending_input.push(event);
    }

    /// Run one frame: reload edited scripts, deliver queued input, process
    /// the tree, then render. Returns the number of sprites drawn.
    pub fn step(&mut self, delta: f32) -> usize {
        self.scene.reload_changed_scripts();

        for event in std::mem::take(&mut self.pending_input) {
            self.scene.input_event(self.root, &event);
        }

        self.scene.process(self.root, delta);
        let drawn = self.scene.render(&mut self.renderer, &mut self.blitter, delta);

        self.frames += 1;
        trace!(frame = self.frames, delta, drawn, "Frame finished");
        drawn
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(self.config.frame_duration())
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.viewport_width,
                self.config.viewport_height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        self.renderer
            .set_viewport(Vec2::new(size.width as f32, size.height as f32));
        info!(width = size.width, height = size.height, "Window created");
        self.window = Some(window);
        Ok(())
    }

    /// Run the windowed frame loop until the window is closed
    pub fn run(mut self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;
        match self.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<B: Blitter> ApplicationHandler for EngineApp<B> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            error!(error = %e, "Could not create window");
            self.fatal = Some(e);
            event_loop.exit();
            return;
        }
        self.last_frame = Instant::now();
        self.next_frame = self.last_frame;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Main window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                debug!(width = size.width, height = size.height, "Window resized");
                self.renderer
                    .set_viewport(Vec2::new(size.width as f32, size.height as f32));
            }
            WindowEvent::Focused(false) => {
                debug!("Window lost focus, releasing held keys");
                self.scene.clear_input();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(event) = InputEvent::from_key_event(&event) {
                    self.queue_input(event);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta = (now - self.last_frame).as_secs_f32();
                self.last_frame = now;
                self.step(delta);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };
        let now = Instant::now();
        if now >= self.next_frame {
            window.request_redraw();
            self.next_frame = now + self.frame_interval();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}

/// Builder pattern for EngineApp configuration
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Set the window title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.window_title = title.into();
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn main_script(mut self, name: impl Into<String>) -> Self {
        self.config.main_script = name.into();
        self
    }

    pub fn hot_reload(mut self, enabled: bool) -> Self {
        self.config.hot_reload = enabled;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create the scene, attach the main script to a fresh root node and
    /// wrap it all in an app. A main script that fails to load is logged and
    /// the app starts with an empty root.
    pub fn build<B: Blitter>(self, blitter: B) -> EngineApp<B> {
        let config = self.config;
        info!(title = config.window_title.as_str(), "Building engine");

        let mut scene = SceneContext::new(config.assets.clone());
        if config.hot_reload {
            if let Err(e) = scene.enable_hot_reload() {
                warn!(error = %e, "Hot reload unavailable");
            }
        }

        let root = scene.create_node(NodeKind::Generic);
        if let Err(e) = scene.set_script(root, &config.main_script) {
            error!(script = config.main_script.as_str(), error = %e, "Failed to run main script");
        }

        let now = Instant::now();
        EngineApp {
            renderer: Renderer2D::new(config.viewport()),
            config,
            scene,
            root,
            blitter,
            window: None,
            pending_input: Vec::new(),
            last_frame: now,
            next_frame: now,
            frames: 0,
            fatal: None,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
