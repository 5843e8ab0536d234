use anyhow::{Context, Result};
use winit::dpi::LogicalSize;
use winit::window::WindowId;

use orrery_engine::core::{App as EngineApp, AppControl, FrameCtx};
use orrery_engine::scene::{Camera, GpuScene};
use orrery_engine::window::{Runtime, RuntimeConfig, WindowEvents, WindowSurface};

use crate::component::{Component, Element};
use crate::props::ViewportProps;
use crate::viewport::Viewport;

// ── Application ───────────────────────────────────────────────────────────

/// Top-level builder: one window hosting one GPU viewport.
///
/// ```rust,ignore
/// Application::new()
///     .title("Orrery")
///     .props(ViewportProps::new(|scene: &GpuScene| {
///         scene.set_active_camera(Some(Camera::default()));
///     }).antialias(true))
///     .child(use_before_render(|scene: &GpuScene, _| tint(scene)))
///     .run()?;
/// ```
pub struct Application {
    title:    String,
    width:    f64,
    height:   f64,
    props:    ViewportProps<GpuScene>,
    children: Vec<Box<dyn Component<GpuScene>>>,
}

impl Application {
    pub fn new() -> Self {
        Self {
            title:    "orrery".to_string(),
            width:    1280.0,
            height:   720.0,
            props:    default_props(),
            children: Vec::new(),
        }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width  = width;
        self.height = height;
        self
    }

    /// Replace the viewport props. The default props give a ready scene a
    /// camera if it has none.
    pub fn props(mut self, props: ViewportProps<GpuScene>) -> Self {
        self.props = props;
        self
    }

    /// Add a descendant of the viewport.
    pub fn child<C: Component<GpuScene>>(mut self, component: C) -> Self {
        self.children.push(Box::new(component));
        self
    }

    /// Opens the window and runs until it is closed.
    pub fn run(self) -> Result<()> {
        let config = RuntimeConfig {
            title:        self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
            ..RuntimeConfig::default()
        };

        Runtime::run(config, UiAppState::new(self)).context("orrery runtime error")
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

fn default_props() -> ViewportProps<GpuScene> {
    ViewportProps::new(|scene: &GpuScene| {
        if scene.active_camera().is_none() {
            scene.set_active_camera(Some(Camera::default()));
        }
    })
}

// ── UiAppState ────────────────────────────────────────────────────────────

/// Bridges the runtime's callbacks to a [`Viewport`].
///
/// User code never sees this type.
struct UiAppState {
    props:    ViewportProps<GpuScene>,
    /// Handed to the viewport when the first surface arrives.
    pending:  Vec<Box<dyn Component<GpuScene>>>,
    viewport: Option<Viewport<GpuScene>>,
}

impl UiAppState {
    fn new(app: Application) -> Self {
        Self {
            props:    app.props,
            pending:  app.children,
            viewport: None,
        }
    }

    fn owns(&self, id: WindowId) -> bool {
        self.viewport
            .as_ref()
            .and_then(Viewport::surface)
            .is_some_and(|surface| surface.id() == id)
    }
}

impl EngineApp for UiAppState {
    fn on_surface(&mut self, surface: &WindowSurface, window_events: &WindowEvents) -> AppControl {
        if self.viewport.is_some() {
            log::warn!("viewport already attached; ignoring surface of window {:?}", surface.id());
            return AppControl::Continue;
        }

        let mut viewport = Viewport::new(self.props.clone(), window_events);
        for child in self.pending.drain(..) {
            viewport.push_child(child);
        }

        let attached = viewport.attach(surface.clone());
        self.viewport = Some(viewport);

        match attached {
            Ok(()) => AppControl::Continue,
            Err(e) => {
                log::error!("failed to set up viewport: {e:#}");
                AppControl::Exit
            }
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if !self.owns(ctx.window.id) {
            return AppControl::Continue;
        }
        let Some(viewport) = self.viewport.as_mut() else {
            return AppControl::Continue;
        };

        viewport.reconcile();
        if let Some(engine) = viewport.controller().engine() {
            engine.run_frame();
        }
        // Readiness may have flipped during the frame.
        viewport.reconcile();

        AppControl::Continue
    }

    /// The children go back to `pending` so a later surface gets them again.
    fn on_surface_lost(&mut self, window_id: WindowId) {
        if !self.owns(window_id) {
            return;
        }
        if let Some(mut viewport) = self.viewport.take() {
            viewport.unmount();
            self.pending = viewport.take_children().into_iter().map(Element::into_inner).collect();
        }
    }
}
