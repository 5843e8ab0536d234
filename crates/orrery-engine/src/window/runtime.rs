use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};

use super::{WindowEvents, WindowSurface};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Give surfaces their own size-change registry. When false, hosts only
    /// learn about resizes through [`WindowEvents`].
    pub observe_surface_resize: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "orrery".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            observe_surface_resize: true,
        }
    }
}

/// Requests an app can make from inside a frame.
///
/// Applied once the frame callback has returned.
#[derive(Default)]
pub struct RuntimeCtx {
    close: Vec<WindowId>,
    exit: bool,
}

impl RuntimeCtx {
    pub fn close_window(&mut self, id: WindowId) {
        self.close.push(id);
    }

    pub fn exit(&mut self) {
        self.exit = true;
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window described by `config` and drives `app` until every
    /// window is gone or the app asks to exit.
    pub fn run<A: App + 'static>(config: RuntimeConfig, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = Host {
            config,
            app,
            surfaces: HashMap::new(),
            window_events: WindowEvents::new(),
            exiting: false,
        };

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")
    }
}

/// The `ApplicationHandler` behind [`Runtime::run`].
struct Host<A: App> {
    config: RuntimeConfig,
    app: A,
    surfaces: HashMap<WindowId, WindowSurface>,
    window_events: WindowEvents,
    exiting: bool,
}

impl<A: App> Host<A> {
    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let surface = WindowSurface::new(Arc::new(window), self.config.observe_surface_resize);
        self.surfaces.insert(surface.id(), surface.clone());
        log::debug!("window {:?} opened", surface.id());

        self.exiting |= self.app.on_surface(&surface, &self.window_events) == AppControl::Exit;
        surface.window().request_redraw();
        Ok(())
    }

    /// The app hears about the loss while the window still exists.
    fn close(&mut self, id: WindowId) {
        if self.surfaces.contains_key(&id) {
            self.app.on_surface_lost(id);
            self.surfaces.remove(&id);
            log::debug!("window {id:?} closed");
        }
    }

    fn resized(&mut self, id: WindowId, size: PhysicalSize<u32>) {
        let Some(surface) = self.surfaces.get(&id).cloned() else {
            return;
        };
        surface.notify_resized(size);
        self.window_events.notify_resized();
        surface.window().request_redraw();
    }

    fn frame(&mut self, id: WindowId) {
        let Some(window) = self.surfaces.get(&id).map(|s| Arc::clone(s.window())) else {
            return;
        };

        let mut runtime = RuntimeCtx::default();
        let mut ctx = FrameCtx {
            window: WindowCtx { id, window: &window },
            runtime: &mut runtime,
        };
        if self.app.on_frame(&mut ctx) == AppControl::Exit {
            runtime.exit();
        }

        for id in runtime.close {
            self.close(id);
        }
        self.exiting |= runtime.exit;
    }

    /// Exits once asked to, or once the last window is gone.
    fn settle(&mut self, event_loop: &ActiveEventLoop) {
        if self.surfaces.is_empty() {
            self.exiting = true;
        }
        if self.exiting {
            event_loop.exit();
        }
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.surfaces.is_empty() {
            return;
        }

        if let Err(e) = self.open(event_loop) {
            log::error!("failed to create initial window: {e:#}");
            self.exiting = true;
        }
        self.settle(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            event_loop.exit();
            return;
        }

        // Render loops run continuously: one redraw per display refresh.
        event_loop.set_control_flow(ControlFlow::Wait);
        for surface in self.surfaces.values() {
            surface.window().request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.exiting || !self.surfaces.contains_key(&window_id) {
            self.settle(event_loop);
            return;
        }

        if self.app.on_window_event(window_id, &event) == AppControl::Exit {
            self.exiting = true;
            self.settle(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.close(window_id),
            WindowEvent::Resized(size) => self.resized(window_id, size),
            WindowEvent::ScaleFactorChanged { .. } => {
                self.window_events.notify_resized();
                if let Some(surface) = self.surfaces.get(&window_id) {
                    surface.window().request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.frame(window_id),
            _ => {}
        }

        self.settle(event_loop);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let ids: Vec<WindowId> = self.surfaces.keys().copied().collect();
        for id in ids {
            self.close(id);
        }
    }
}
