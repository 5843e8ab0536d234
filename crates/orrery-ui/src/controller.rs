//! Engine/scene lifecycle for one viewport.
//!
//! A *cycle* is everything [`ViewportController::setup`] acquires: the
//! engine, the scene, the surface and window resize registrations, the
//! pending readiness registration and the render loop. [`teardown`]
//! releases a cycle in a fixed order:
//!
//! 1. surface resize registration
//! 2. window resize registration
//! 3. pending readiness registration
//! 4. engine (which takes the scene and the render loop with it)
//!
//! and then resets the published context.
//!
//! [`teardown`]: ViewportController::teardown

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use orrery_engine::core::{DrawSurface, EngineOf, RenderEngine, RenderScene, SurfaceOf};
use orrery_engine::observable::{ObserverOptions, Subscription};
use orrery_engine::window::WindowEvents;

use crate::context::{EngineContext, SceneContext, ViewportCtx};
use crate::props::{SceneCallback, ViewportProps};

struct Cycle<S: RenderScene> {
    engine: EngineOf<S>,
    scene: S,
    surface_resize: Option<Subscription<PhysicalSize<u32>>>,
    window_resize: Subscription<()>,
    ready: Option<Subscription<S>>,
}

pub struct ViewportController<S: RenderScene> {
    window_events: WindowEvents,
    ctx: ViewportCtx<S>,
    cycle: Option<Cycle<S>>,
    cycles: u64,
}

impl<S: RenderScene> ViewportController<S> {
    pub fn new(window_events: &WindowEvents) -> Self {
        Self {
            window_events: window_events.clone(),
            ctx: ViewportCtx::new(),
            cycle: None,
            cycles: 0,
        }
    }

    /// Context handle shared with descendants. Stays valid across cycles.
    pub fn context(&self) -> &ViewportCtx<S> {
        &self.ctx
    }

    pub fn is_active(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn engine(&self) -> Option<EngineOf<S>> {
        self.cycle.as_ref().map(|c| c.engine.clone())
    }

    pub fn scene(&self) -> Option<S> {
        self.cycle.as_ref().map(|c| c.scene.clone())
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Starts a new cycle on `surface`, tearing the current one down first.
    ///
    /// Without a surface the viewport is simply not mounted yet: nothing is
    /// created and nothing is published.
    pub fn setup(&mut self, surface: Option<&SurfaceOf<S>>, props: &ViewportProps<S>) -> Result<()> {
        self.teardown();

        let Some(surface) = surface else {
            log::debug!("viewport has no surface yet; setup deferred");
            return Ok(());
        };

        let engine = <EngineOf<S> as RenderEngine>::create(
            surface,
            props.antialias,
            &props.engine_options,
            props.adapt_to_device_ratio,
        )
        .context("failed to create engine")?;

        let scene = match S::create(&engine, &props.scene_options) {
            Ok(scene) => scene,
            Err(err) => {
                engine.dispose();
                return Err(err.context("failed to create scene"));
            }
        };

        let surface_resize = self.observe_surface(surface, &engine, &scene, props);

        let ready_flag = Rc::new(Cell::new(scene.is_ready()));
        let ready = if ready_flag.get() {
            (props.on_scene_ready)(&scene);
            None
        } else {
            Some(self.await_ready(&scene, &ready_flag, props))
        };

        engine.run_render_loop(render_loop(scene.clone(), props.on_render.clone()));

        let window_resize = self.window_events.resized().subscribe(ObserverOptions::default(), {
            let engine = engine.clone();
            move |_, _| engine.resize()
        });

        self.ctx.publish_engine(EngineContext {
            engine: Some(engine.clone()),
            surface: Some(surface.clone()),
        });
        self.ctx.publish_scene(SceneContext {
            engine: Some(engine.clone()),
            scene: Some(scene.clone()),
            ready: ready_flag.get(),
        });

        self.cycles += 1;
        log::debug!("viewport cycle {} started (scene ready: {})", self.cycles, ready_flag.get());

        self.cycle = Some(Cycle { engine, scene, surface_resize, window_resize, ready });
        Ok(())
    }

    /// Releases the current cycle. No-op when nothing is mounted.
    pub fn teardown(&mut self) {
        let Some(mut cycle) = self.cycle.take() else {
            return;
        };

        if let Some(sub) = cycle.surface_resize.as_mut() {
            sub.cancel();
        }
        cycle.window_resize.cancel();
        if let Some(sub) = cycle.ready.as_mut() {
            sub.cancel();
        }
        cycle.engine.dispose();

        self.ctx.reset();
        log::debug!("viewport cycle {} torn down", self.cycles);
    }

    fn observe_surface(
        &self,
        surface: &SurfaceOf<S>,
        engine: &EngineOf<S>,
        scene: &S,
        props: &ViewportProps<S>,
    ) -> Option<Subscription<PhysicalSize<u32>>> {
        if !props.observe_canvas_resize {
            return None;
        }

        let Some(events) = surface.resize_events() else {
            log::debug!("surface reports no size changes; relying on window resize");
            return None;
        };

        let engine = engine.clone();
        let scene = scene.clone();
        let on_render = props.on_render.clone();

        Some(events.subscribe(ObserverOptions::default(), move |_, _| {
            engine.resize();
            if !scene.has_active_camera() {
                log::trace!("resize render skipped: no active camera");
                return;
            }
            if let Some(on_render) = &on_render {
                on_render(&scene);
            }
            scene.render();
        }))
    }

    fn await_ready(&self, scene: &S, ready_flag: &Rc<Cell<bool>>, props: &ViewportProps<S>) -> Subscription<S> {
        let ready_flag = Rc::clone(ready_flag);
        let on_scene_ready = Rc::clone(&props.on_scene_ready);
        let ctx = self.ctx.clone();

        scene.on_ready().subscribe(ObserverOptions::once(), move |scene: &S, _| {
            if ready_flag.replace(true) {
                return;
            }
            on_scene_ready(scene);
            ctx.publish_scene(SceneContext {
                engine: Some(scene.engine()),
                scene: Some(scene.clone()),
                ready: true,
            });
        })
    }
}

impl<S: RenderScene> Drop for ViewportController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Per-frame callback: render when the scene has a camera, otherwise skip.
///
/// The first skipped frame of a streak warns; the rest only trace.
fn render_loop<S: RenderScene>(scene: S, on_render: Option<SceneCallback<S>>) -> Box<dyn FnMut()> {
    let mut skipped: u64 = 0;

    Box::new(move || {
        if !scene.has_active_camera() {
            if skipped == 0 {
                log::warn!("no active camera; frame skipped");
            } else {
                log::trace!("no active camera; {} frames skipped", skipped + 1);
            }
            skipped += 1;
            return;
        }

        skipped = 0;
        if let Some(on_render) = &on_render {
            on_render(&scene);
        }
        scene.render();
    })
}
