//! wgpu-backed rendering engine.
//!
//! [`GpuEngine`] binds a [`Gpu`] to a [`WindowSurface`], keeps the list of
//! render-loop callbacks and the frame clock, and cascades disposal to every
//! scene created on it. The host drives it by calling [`GpuEngine::run_frame`]
//! once per redraw.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::core::RenderEngine;
use crate::device::{render_size, EngineOptions, Gpu, SurfaceErrorAction, MSAA_SAMPLES};
use crate::observable::{Observable, MASK_ALL};
use crate::paint::Color;
use crate::time::{FrameClock, FrameTime};
use crate::window::WindowSurface;

struct EngineInner {
    surface: WindowSurface,
    adapt_to_device_ratio: bool,
    gpu: RefCell<Option<Gpu>>,
    render_loops: RefCell<Vec<Box<dyn FnMut()>>>,
    clock: RefCell<FrameClock>,
    last_frame: Cell<Option<FrameTime>>,
    on_dispose: Observable<()>,
    disposed: Cell<bool>,
}

/// Shared handle to one GPU engine. Clones refer to the same engine.
#[derive(Clone)]
pub struct GpuEngine {
    inner: Rc<EngineInner>,
}

impl GpuEngine {
    pub fn surface(&self) -> &WindowSurface {
        &self.inner.surface
    }

    /// Current render-target size, or `None` once disposed.
    pub fn render_size(&self) -> Option<PhysicalSize<u32>> {
        self.inner.gpu.borrow().as_ref().map(Gpu::size)
    }

    /// 1 without antialiasing; `None` once disposed.
    pub fn sample_count(&self) -> Option<u32> {
        self.inner.gpu.borrow().as_ref().map(Gpu::sample_count)
    }

    /// Clamped duration of the previous frame, in seconds.
    pub fn delta_time(&self) -> f32 {
        self.inner.last_frame.get().map_or(0.0, |ft| ft.dt)
    }

    pub fn frame_time(&self) -> Option<FrameTime> {
        self.inner.last_frame.get()
    }

    /// Fires once when the engine is disposed.
    pub fn on_dispose(&self) -> &Observable<()> {
        &self.inner.on_dispose
    }

    /// Runs every render-loop callback once.
    ///
    /// Callbacks registered during the frame join from the next frame on.
    /// If a callback disposes the engine, the rest of the frame is dropped.
    pub fn run_frame(&self) {
        if self.is_disposed() {
            return;
        }

        let ft = self.inner.clock.borrow_mut().tick();
        self.inner.last_frame.set(Some(ft));

        let mut loops = std::mem::take(&mut *self.inner.render_loops.borrow_mut());
        for frame in loops.iter_mut() {
            frame();
            if self.is_disposed() {
                return;
            }
        }

        let mut slot = self.inner.render_loops.borrow_mut();
        loops.append(&mut *slot);
        *slot = loops;
    }

    /// Clears the render target to `color` and presents it.
    pub fn present_clear(&self, color: Color) {
        let gpu = self.inner.gpu.borrow();
        let Some(gpu) = gpu.as_ref() else {
            return;
        };

        self.inner.surface.window().pre_present_notify();
        if let Err(err) = gpu.present_clear(color) {
            let reason = err.to_string();
            match gpu.recover(err) {
                SurfaceErrorAction::Fatal => log::error!("surface error is fatal; frame dropped: {reason}"),
                action => log::debug!("frame dropped ({reason}): {action:?}"),
            }
        }
    }
}

impl RenderEngine for GpuEngine {
    type Surface = WindowSurface;
    type Options = EngineOptions;

    fn create(
        surface: &WindowSurface,
        antialias: Option<bool>,
        options: &EngineOptions,
        adapt_to_device_ratio: bool,
    ) -> Result<Self> {
        let size = render_size(surface.physical_size(), surface.scale_factor(), adapt_to_device_ratio);
        let sample_count = if antialias.unwrap_or(false) { MSAA_SAMPLES } else { 1 };

        let gpu = pollster::block_on(Gpu::new(
            Arc::clone(surface.window()),
            size,
            sample_count,
            options.clone(),
        ))
        .context("failed to initialize GPU engine")?;

        Ok(Self {
            inner: Rc::new(EngineInner {
                surface: surface.clone(),
                adapt_to_device_ratio,
                gpu: RefCell::new(Some(gpu)),
                render_loops: RefCell::new(Vec::new()),
                clock: RefCell::new(FrameClock::new()),
                last_frame: Cell::new(None),
                on_dispose: Observable::new(),
                disposed: Cell::new(false),
            }),
        })
    }

    fn resize(&self) {
        let surface = &self.inner.surface;
        let size = render_size(
            surface.physical_size(),
            surface.scale_factor(),
            self.inner.adapt_to_device_ratio,
        );

        if let Some(gpu) = self.inner.gpu.borrow_mut().as_mut() {
            gpu.resize(size);
        }
    }

    fn run_render_loop(&self, frame: Box<dyn FnMut()>) {
        if self.is_disposed() {
            log::debug!("render loop registered on a disposed engine; ignored");
            return;
        }
        self.inner.render_loops.borrow_mut().push(frame);
    }

    fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }

        self.inner.on_dispose.notify(&(), MASK_ALL);
        self.inner.on_dispose.clear();
        self.inner.render_loops.borrow_mut().clear();
        self.inner.gpu.borrow_mut().take();
        self.inner.clock.borrow_mut().reset();

        log::debug!("engine disposed");
    }

    fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl PartialEq for GpuEngine {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for GpuEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuEngine")
            .field("window", &self.inner.surface.id())
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}
