use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use anyhow::Result;

use crate::core::{RenderEngine, RenderScene};
use crate::engine::GpuEngine;
use crate::observable::{Observable, ObserverOptions, Subscription, MASK_ALL};
use crate::paint::Color;

use super::Camera;

/// Scene construction options.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    pub clear_color: Color,
    /// Name used in diagnostics.
    pub label: Option<String>,
    /// Frames the scene spends loading before it reports ready. 0 makes it
    /// ready on creation.
    pub load_frames: u32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            clear_color: Color::from_u8(51, 51, 76, 255),
            label: None,
            load_frames: 0,
        }
    }
}

/// Pending resource count plus a readiness latch.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Loading {
    pending: usize,
    ready:   bool,
}

impl Loading {
    /// Ready right away when nothing is pending.
    fn new(pending: usize) -> Self {
        Self { pending, ready: pending == 0 }
    }

    fn add(&mut self) {
        self.pending += 1;
    }

    /// `None` when nothing was pending, `Some(true)` when this made the
    /// scene ready.
    fn finish_one(&mut self) -> Option<bool> {
        self.pending = self.pending.checked_sub(1)?;
        let became_ready = self.pending == 0 && !self.ready;
        self.ready |= self.pending == 0;
        Some(became_ready)
    }
}

struct SceneInner {
    engine: GpuEngine,
    label: String,
    clear_color: Cell<Color>,
    camera: Cell<Option<Camera>>,
    loading: Cell<Loading>,
    rendered_frames: Cell<u64>,
    disposed: Cell<bool>,

    on_ready: Observable<GpuScene>,
    on_before_render: Observable<GpuScene>,
    on_after_render: Observable<GpuScene>,

    engine_disposed: RefCell<Option<Subscription<()>>>,
}

/// Shared handle to a scene. Clones refer to the same scene.
#[derive(Clone)]
pub struct GpuScene {
    inner: Rc<SceneInner>,
}

impl GpuScene {
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn clear_color(&self) -> Color {
        self.inner.clear_color.get()
    }

    pub fn set_clear_color(&self, color: Color) {
        self.inner.clear_color.set(color);
    }

    pub fn active_camera(&self) -> Option<Camera> {
        self.inner.camera.get()
    }

    /// Sets or clears the camera. Rendering is skipped while there is none.
    pub fn set_active_camera(&self, camera: Option<Camera>) {
        self.inner.camera.set(camera);
    }

    /// Marks one more resource as loading. Before the scene is ready this
    /// delays readiness; afterwards readiness stays.
    pub fn add_pending_resource(&self) {
        let mut loading = self.inner.loading.get();
        loading.add();
        self.inner.loading.set(loading);
    }

    /// Reports one pending resource as loaded. The last one before the
    /// scene is ready makes it ready and notifies `on_ready`.
    pub fn resource_loaded(&self) {
        let mut loading = self.inner.loading.get();
        let step = loading.finish_one();
        self.inner.loading.set(loading);

        match step {
            None => log::warn!("scene '{}': resource_loaded without a pending resource", self.label()),
            Some(true) if !self.is_disposed() => {
                log::debug!("scene '{}' is ready", self.label());
                self.inner.on_ready.notify(self, MASK_ALL);
            }
            Some(_) => {}
        }
    }

    pub fn pending_resources(&self) -> usize {
        self.inner.loading.get().pending
    }

    pub fn rendered_frames(&self) -> u64 {
        self.inner.rendered_frames.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Releases the pending resource taken at creation after `frames`
    /// engine frames.
    fn load_over(&self, engine: &GpuEngine, frames: u32) {
        let weak = Rc::downgrade(&self.inner);
        let mut left = frames;
        engine.run_render_loop(Box::new(move || {
            if left == 0 {
                return;
            }
            left -= 1;
            if left == 0 {
                if let Some(inner) = weak.upgrade() {
                    GpuScene { inner }.resource_loaded();
                }
            }
        }));
    }

    /// Called through the engine's dispose notification only.
    fn release(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        self.inner.on_ready.clear();
        self.inner.on_before_render.clear();
        self.inner.on_after_render.clear();
        self.inner.engine_disposed.borrow_mut().take();
        log::debug!("scene '{}' disposed with its engine", self.label());
    }
}

impl RenderScene for GpuScene {
    type Engine = GpuEngine;
    type Options = SceneOptions;

    fn create(engine: &GpuEngine, options: &SceneOptions) -> Result<Self> {
        anyhow::ensure!(!engine.is_disposed(), "cannot create a scene on a disposed engine");

        let label = options.label.clone().unwrap_or_else(|| "scene".to_string());

        let inner = Rc::new_cyclic(|weak: &std::rc::Weak<SceneInner>| {
            let weak = weak.clone();
            let engine_disposed = engine.on_dispose().subscribe(ObserverOptions::once(), move |_, _| {
                if let Some(inner) = weak.upgrade() {
                    GpuScene { inner }.release();
                }
            });

            SceneInner {
                engine: engine.clone(),
                label,
                clear_color: Cell::new(options.clear_color),
                camera: Cell::new(None),
                loading: Cell::new(Loading::new(usize::from(options.load_frames > 0))),
                rendered_frames: Cell::new(0),
                disposed: Cell::new(false),
                on_ready: Observable::new(),
                on_before_render: Observable::new(),
                on_after_render: Observable::new(),
                engine_disposed: RefCell::new(Some(engine_disposed)),
            }
        });

        let scene = Self { inner };
        if options.load_frames > 0 {
            scene.load_over(engine, options.load_frames);
        }
        Ok(scene)
    }

    fn engine(&self) -> GpuEngine {
        self.inner.engine.clone()
    }

    fn is_ready(&self) -> bool {
        !self.is_disposed() && self.inner.loading.get().ready
    }

    fn on_ready(&self) -> Observable<Self> {
        self.inner.on_ready.clone()
    }

    fn on_before_render(&self) -> Observable<Self> {
        self.inner.on_before_render.clone()
    }

    fn on_after_render(&self) -> Observable<Self> {
        self.inner.on_after_render.clone()
    }

    fn has_active_camera(&self) -> bool {
        self.inner.camera.get().is_some()
    }

    fn render(&self) {
        if self.is_disposed() {
            return;
        }

        if !self.has_active_camera() {
            log::trace!("scene '{}' has no active camera; render skipped", self.label());
            return;
        }

        self.inner.on_before_render.notify(self, MASK_ALL);
        self.inner.engine.present_clear(self.clear_color());
        self.inner.rendered_frames.set(self.inner.rendered_frames.get() + 1);
        self.inner.on_after_render.notify(self, MASK_ALL);
    }
}

impl PartialEq for GpuScene {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for GpuScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuScene")
            .field("label", &self.inner.label)
            .field("camera", &self.inner.camera.get())
            .field("loading", &self.inner.loading.get())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}
