//! Recording engine/scene doubles for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{bail, Result};
use winit::dpi::PhysicalSize;

use orrery_engine::core::{DrawSurface, RenderEngine, RenderScene};
use orrery_engine::observable::{Observable, MASK_ALL};
use orrery_engine::window::WindowEvents;

/// Ordered log of backend calls shared by every double built from it.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Rc<RefCell<Vec<String>>>,
    next_id: Rc<Cell<u32>>,
    live_engines: Rc<Cell<usize>>,
    max_live_engines: Rc<Cell<usize>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.entries.borrow().iter().filter(|e| e.contains(needle)).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries.borrow().iter().position(|e| e == entry)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn live_engines(&self) -> usize {
        self.live_engines.get()
    }

    pub fn max_live_engines(&self) -> usize {
        self.max_live_engines.get()
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

// ── surface ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct FakeSurface {
    pub journal: Journal,
    resized: Option<Observable<PhysicalSize<u32>>>,
    window: Option<WindowEvents>,
}

impl FakeSurface {
    pub fn new(journal: &Journal) -> Self {
        Self { journal: journal.clone(), resized: Some(Observable::new()), window: None }
    }

    /// A surface whose host cannot observe size changes.
    pub fn unobservable(journal: &Journal) -> Self {
        Self { journal: journal.clone(), resized: None, window: None }
    }

    /// Lets engines report the window's resize registrations when disposed.
    pub fn in_window(mut self, window_events: &WindowEvents) -> Self {
        self.window = Some(window_events.clone());
        self
    }

    pub fn window_observers(&self) -> usize {
        self.window.as_ref().map_or(0, |w| w.resized().len())
    }

    pub fn resize_to(&self, width: u32, height: u32) {
        if let Some(resized) = &self.resized {
            resized.notify(&PhysicalSize::new(width, height), MASK_ALL);
        }
    }

    pub fn resize_observers(&self) -> usize {
        self.resized.as_ref().map_or(0, Observable::len)
    }
}

impl DrawSurface for FakeSurface {
    fn resize_events(&self) -> Option<Observable<PhysicalSize<u32>>> {
        self.resized.clone()
    }
}

// ── engine ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeEngineOptions {
    pub tag: u32,
}

struct EngineInner {
    id: u32,
    journal: Journal,
    surface: FakeSurface,
    antialias: Option<bool>,
    adapt_to_device_ratio: bool,
    loops: RefCell<Vec<Box<dyn FnMut()>>>,
    scenes: RefCell<Vec<FakeScene>>,
    disposed: Cell<bool>,
}

#[derive(Clone)]
pub struct FakeEngine {
    inner: Rc<EngineInner>,
}

impl FakeEngine {
    pub fn id(&self) -> u32 {
        self.inner.id
    }

    pub fn antialias(&self) -> Option<bool> {
        self.inner.antialias
    }

    pub fn adapt_to_device_ratio(&self) -> bool {
        self.inner.adapt_to_device_ratio
    }

    pub fn render_loops(&self) -> usize {
        self.inner.loops.borrow().len()
    }

    /// One display refresh: runs every render-loop callback.
    pub fn tick(&self) {
        let mut loops = std::mem::take(&mut *self.inner.loops.borrow_mut());
        for frame in loops.iter_mut() {
            frame();
        }
        if !self.is_disposed() {
            let mut slot = self.inner.loops.borrow_mut();
            loops.append(&mut *slot);
            *slot = loops;
        }
    }
}

impl RenderEngine for FakeEngine {
    type Surface = FakeSurface;
    type Options = FakeEngineOptions;

    fn create(
        surface: &FakeSurface,
        antialias: Option<bool>,
        options: &FakeEngineOptions,
        adapt_to_device_ratio: bool,
    ) -> Result<Self> {
        let journal = surface.journal.clone();
        let id = journal.next_id();
        journal.push(format!("engine#{id} create antialias={antialias:?} tag={}", options.tag));

        let live = journal.live_engines.get() + 1;
        journal.live_engines.set(live);
        journal.max_live_engines.set(journal.max_live_engines.get().max(live));

        Ok(Self {
            inner: Rc::new(EngineInner {
                id,
                journal,
                surface: surface.clone(),
                antialias,
                adapt_to_device_ratio,
                loops: RefCell::new(Vec::new()),
                scenes: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        })
    }

    fn resize(&self) {
        self.inner.journal.push(format!("engine#{} resize", self.inner.id));
    }

    fn run_render_loop(&self, frame: Box<dyn FnMut()>) {
        self.inner.loops.borrow_mut().push(frame);
    }

    fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let journal = &self.inner.journal;
        let surface = &self.inner.surface;
        let ready: usize = self.inner.scenes.borrow().iter().map(|s| s.inner.on_ready.len()).sum();
        journal.push(format!(
            "engine#{} disposing surface_observers={} window_observers={} ready_observers={}",
            self.inner.id,
            surface.resize_observers(),
            surface.window_observers(),
            ready
        ));
        journal.push(format!("engine#{} dispose", self.inner.id));
        journal.live_engines.set(journal.live_engines.get() - 1);

        self.inner.loops.borrow_mut().clear();
        for scene in self.inner.scenes.borrow_mut().drain(..) {
            scene.release();
        }
    }

    fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl PartialEq for FakeEngine {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

// ── scene ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FakeSceneOptions {
    pub start_ready: bool,
    pub with_camera: bool,
    pub fail: bool,
}

impl Default for FakeSceneOptions {
    fn default() -> Self {
        Self { start_ready: true, with_camera: true, fail: false }
    }
}

struct SceneInner {
    id: u32,
    engine: FakeEngine,
    ready: Cell<bool>,
    camera: Cell<bool>,
    renders: Cell<u32>,
    disposed: Cell<bool>,
    on_ready: Observable<FakeScene>,
    on_before_render: Observable<FakeScene>,
    on_after_render: Observable<FakeScene>,
}

#[derive(Clone)]
pub struct FakeScene {
    inner: Rc<SceneInner>,
}

impl FakeScene {
    pub fn id(&self) -> u32 {
        self.inner.id
    }

    pub fn renders(&self) -> u32 {
        self.inner.renders.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    pub fn set_camera(&self, on: bool) {
        self.inner.camera.set(on);
    }

    /// Finishes loading and raises the ready notification.
    pub fn mark_ready(&self) {
        self.inner.ready.set(true);
        self.inner.on_ready.notify(self, MASK_ALL);
    }

    fn release(&self) {
        self.inner.disposed.set(true);
        self.inner.on_ready.clear();
        self.inner.on_before_render.clear();
        self.inner.on_after_render.clear();
    }
}

impl RenderScene for FakeScene {
    type Engine = FakeEngine;
    type Options = FakeSceneOptions;

    fn create(engine: &FakeEngine, options: &FakeSceneOptions) -> Result<Self> {
        let journal = &engine.inner.journal;
        if options.fail {
            journal.push("scene create failed");
            bail!("scene options rejected");
        }

        let id = journal.next_id();
        journal.push(format!("scene#{id} create"));

        let scene = Self {
            inner: Rc::new(SceneInner {
                id,
                engine: engine.clone(),
                ready: Cell::new(options.start_ready),
                camera: Cell::new(options.with_camera),
                renders: Cell::new(0),
                disposed: Cell::new(false),
                on_ready: Observable::new(),
                on_before_render: Observable::new(),
                on_after_render: Observable::new(),
            }),
        };
        engine.inner.scenes.borrow_mut().push(scene.clone());
        Ok(scene)
    }

    fn engine(&self) -> FakeEngine {
        self.inner.engine.clone()
    }

    fn is_ready(&self) -> bool {
        self.inner.ready.get()
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
        self.inner.camera.get()
    }

    fn render(&self) {
        assert!(self.inner.camera.get(), "scene#{} rendered without an active camera", self.inner.id);
        assert!(!self.is_disposed(), "scene#{} rendered after dispose", self.inner.id);

        self.inner.on_before_render.notify(self, MASK_ALL);
        self.inner.renders.set(self.inner.renders.get() + 1);
        self.inner.engine.inner.journal.push(format!("scene#{} render", self.inner.id));
        self.inner.on_after_render.notify(self, MASK_ALL);
    }
}

impl PartialEq for FakeScene {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

// ── component ─────────────────────────────────────────────────────────────

/// Component that journals its lifecycle as `"<name> mount ready=<bool>"`,
/// `"<name> update ready=<bool>"` and `"<name> unmount"`.
pub struct Tracer {
    name: &'static str,
    journal: Journal,
}

impl Tracer {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self { name, journal: journal.clone() }
    }
}

impl crate::component::Component<FakeScene> for Tracer {
    fn mount(&mut self, ctx: &crate::context::ViewportCtx<FakeScene>) {
        self.journal.push(format!("{} mount ready={}", self.name, ctx.scene_ready()));
    }

    fn update(&mut self, ctx: &crate::context::ViewportCtx<FakeScene>) {
        self.journal.push(format!("{} update ready={}", self.name, ctx.scene_ready()));
    }

    fn unmount(&mut self) {
        self.journal.push(format!("{} unmount", self.name));
    }
}
