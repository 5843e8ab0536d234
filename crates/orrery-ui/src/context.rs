//! Shared state a viewport publishes for its descendants.
//!
//! The viewport controller is the only writer. Descendants read snapshots
//! through [`ViewportCtx`]; every field is absent (and `ready` is false)
//! before the first setup and after teardown.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use orrery_engine::core::{EngineOf, RenderEngine, RenderScene, SurfaceOf};

/// Engine and surface of the enclosing viewport.
pub struct EngineContext<E: RenderEngine> {
    pub engine:  Option<E>,
    pub surface: Option<E::Surface>,
}

impl<E: RenderEngine> Clone for EngineContext<E> {
    fn clone(&self) -> Self {
        Self { engine: self.engine.clone(), surface: self.surface.clone() }
    }
}

impl<E: RenderEngine> Default for EngineContext<E> {
    fn default() -> Self {
        Self { engine: None, surface: None }
    }
}

/// Scene of the enclosing viewport and whether it finished loading.
pub struct SceneContext<S: RenderScene> {
    pub engine: Option<S::Engine>,
    pub scene:  Option<S>,
    pub ready:  bool,
}

impl<S: RenderScene> Clone for SceneContext<S> {
    fn clone(&self) -> Self {
        Self { engine: self.engine.clone(), scene: self.scene.clone(), ready: self.ready }
    }
}

impl<S: RenderScene> Default for SceneContext<S> {
    fn default() -> Self {
        Self { engine: None, scene: None, ready: false }
    }
}

/// A value plus a counter bumped on every publish.
struct Published<T> {
    value:      RefCell<T>,
    generation: Cell<u64>,
}

impl<T: Clone + Default> Published<T> {
    fn new() -> Self {
        Self { value: RefCell::new(T::default()), generation: Cell::new(0) }
    }

    fn get(&self) -> T {
        self.value.borrow().clone()
    }

    fn publish(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.generation.set(self.generation.get() + 1);
    }
}

/// Read access to the state published by the enclosing viewport.
///
/// Cheap to clone; clones observe the same viewport.
pub struct ViewportCtx<S: RenderScene> {
    engine: Rc<Published<EngineContext<EngineOf<S>>>>,
    scene:  Rc<Published<SceneContext<S>>>,
}

impl<S: RenderScene> Clone for ViewportCtx<S> {
    fn clone(&self) -> Self {
        Self { engine: Rc::clone(&self.engine), scene: Rc::clone(&self.scene) }
    }
}

impl<S: RenderScene> ViewportCtx<S> {
    pub(crate) fn new() -> Self {
        Self { engine: Rc::new(Published::new()), scene: Rc::new(Published::new()) }
    }

    pub fn engine_context(&self) -> EngineContext<EngineOf<S>> {
        self.engine.get()
    }

    pub fn scene_context(&self) -> SceneContext<S> {
        self.scene.get()
    }

    pub fn engine(&self) -> Option<EngineOf<S>> {
        self.engine.value.borrow().engine.clone()
    }

    pub fn surface(&self) -> Option<SurfaceOf<S>> {
        self.engine.value.borrow().surface.clone()
    }

    pub fn scene(&self) -> Option<S> {
        self.scene.value.borrow().scene.clone()
    }

    pub fn scene_ready(&self) -> bool {
        self.scene.value.borrow().ready
    }

    /// Total number of publishes so far. Changes whenever either snapshot does.
    pub fn revision(&self) -> u64 {
        self.engine.generation.get() + self.scene.generation.get()
    }

    pub(crate) fn publish_engine(&self, value: EngineContext<EngineOf<S>>) {
        self.engine.publish(value);
    }

    pub(crate) fn publish_scene(&self, value: SceneContext<S>) {
        self.scene.publish(value);
    }

    /// Back to the pre-mount state.
    pub(crate) fn reset(&self) {
        self.engine.publish(EngineContext::default());
        self.scene.publish(SceneContext::default());
    }
}
