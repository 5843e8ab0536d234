use std::rc::Rc;

use orrery_engine::core::{EngineOptionsOf, RenderScene};

/// Callback receiving the viewport's scene.
pub type SceneCallback<S> = Rc<dyn Fn(&S)>;

/// Viewport configuration.
///
/// Every field except `render_children_when_ready` is a setup input:
/// changing one tears the current engine and scene down and builds fresh
/// ones. Values compare with `PartialEq`, callbacks by `Rc` identity, so
/// keep a callback's `Rc` around to update props without a rebuild.
pub struct ViewportProps<S: RenderScene> {
    /// `None` keeps the engine's default.
    pub antialias:                  Option<bool>,
    pub engine_options:             EngineOptionsOf<S>,
    pub adapt_to_device_ratio:      bool,
    pub scene_options:              S::Options,
    /// Runs right before every render, including resize-triggered ones.
    pub on_render:                  Option<SceneCallback<S>>,
    /// Runs exactly once per setup, as soon as the scene is ready.
    pub on_scene_ready:             SceneCallback<S>,
    /// Resize the engine when the surface reports a size change (default: true).
    pub observe_canvas_resize:      bool,
    /// Withhold children until the scene is ready.
    pub render_children_when_ready: bool,
}

impl<S: RenderScene> ViewportProps<S> {
    pub fn new(on_scene_ready: impl Fn(&S) + 'static) -> Self {
        Self::with_ready_callback(Rc::new(on_scene_ready))
    }

    pub fn with_ready_callback(on_scene_ready: SceneCallback<S>) -> Self {
        Self {
            antialias:                  None,
            engine_options:             Default::default(),
            adapt_to_device_ratio:      false,
            scene_options:              Default::default(),
            on_render:                  None,
            on_scene_ready,
            observe_canvas_resize:      true,
            render_children_when_ready: false,
        }
    }

    pub fn antialias(mut self, on: bool) -> Self {
        self.antialias = Some(on);
        self
    }

    pub fn engine_options(mut self, options: EngineOptionsOf<S>) -> Self {
        self.engine_options = options;
        self
    }

    pub fn adapt_to_device_ratio(mut self, on: bool) -> Self {
        self.adapt_to_device_ratio = on;
        self
    }

    pub fn scene_options(mut self, options: S::Options) -> Self {
        self.scene_options = options;
        self
    }

    pub fn on_render(self, f: impl Fn(&S) + 'static) -> Self {
        self.on_render_shared(Rc::new(f))
    }

    pub fn on_render_shared(mut self, f: SceneCallback<S>) -> Self {
        self.on_render = Some(f);
        self
    }

    pub fn observe_canvas_resize(mut self, on: bool) -> Self {
        self.observe_canvas_resize = on;
        self
    }

    pub fn render_children_when_ready(mut self, on: bool) -> Self {
        self.render_children_when_ready = on;
        self
    }

    /// `true` when `other` would produce the same setup cycle.
    pub fn same_cycle_inputs(&self, other: &Self) -> bool {
        let same_render = match (&self.on_render, &other.on_render) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };

        self.antialias == other.antialias
            && self.engine_options == other.engine_options
            && self.adapt_to_device_ratio == other.adapt_to_device_ratio
            && self.scene_options == other.scene_options
            && same_render
            && Rc::ptr_eq(&self.on_scene_ready, &other.on_scene_ready)
            && self.observe_canvas_resize == other.observe_canvas_resize
    }
}

impl<S: RenderScene> Clone for ViewportProps<S> {
    fn clone(&self) -> Self {
        Self {
            antialias:                  self.antialias,
            engine_options:             self.engine_options.clone(),
            adapt_to_device_ratio:      self.adapt_to_device_ratio,
            scene_options:              self.scene_options.clone(),
            on_render:                  self.on_render.clone(),
            on_scene_ready:             Rc::clone(&self.on_scene_ready),
            observe_canvas_resize:      self.observe_canvas_resize,
            render_children_when_ready: self.render_children_when_ready,
        }
    }
}
