//! Per-frame callbacks for viewport descendants.
//!
//! ```rust,ignore
//! Viewport::new(props, &events)
//!     .child(use_before_render(|scene: &GpuScene, _| spin(scene)))
//!     .child(use_after_render(|_, _| frames += 1).insert_first());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use orrery_engine::core::RenderScene;
use orrery_engine::observable::{EventState, Observable, ObserverOptions, Subscription};

use crate::component::Component;
use crate::context::ViewportCtx;

/// Which scene notification a hook listens to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderPhase {
    BeforeRender,
    AfterRender,
}

type HookCallback<S> = Rc<RefCell<dyn FnMut(&S, &mut EventState)>>;

/// Component that keeps one callback registered on the current scene's
/// before- or after-render notifications.
///
/// The registration follows the scene: it is made on mount, moved when a
/// new cycle publishes a different scene, dropped when the scene goes away
/// and cancelled on unmount. A `call_once` hook fires at most once per
/// scene.
pub struct RenderHook<S: RenderScene> {
    phase:        RenderPhase,
    callback:     HookCallback<S>,
    options:      ObserverOptions,
    registration: Option<(S, Subscription<S>)>,
}

impl<S: RenderScene> RenderHook<S> {
    pub fn new(phase: RenderPhase, callback: impl FnMut(&S, &mut EventState) + 'static) -> Self {
        Self {
            phase,
            callback: Rc::new(RefCell::new(callback)),
            options: ObserverOptions::default(),
            registration: None,
        }
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Only receive notifications raised with an overlapping mask.
    pub fn mask(mut self, mask: u32) -> Self {
        self.options.mask = mask;
        self
    }

    /// Run ahead of the callbacks already registered on the scene.
    pub fn insert_first(mut self) -> Self {
        self.options.insert_first = true;
        self
    }

    /// Unregister after the first delivery.
    pub fn call_once(mut self) -> Self {
        self.options.call_once = true;
        self
    }

    /// `true` while the callback is registered on a scene.
    pub fn is_registered(&self) -> bool {
        self.registration.as_ref().is_some_and(|(_, sub)| sub.is_active())
    }

    fn observable(&self, scene: &S) -> Observable<S> {
        match self.phase {
            RenderPhase::BeforeRender => scene.on_before_render(),
            RenderPhase::AfterRender => scene.on_after_render(),
        }
    }

    fn sync(&mut self, ctx: &ViewportCtx<S>) {
        let scene = ctx.scene();
        let unchanged = match (&self.registration, &scene) {
            (Some((current, _)), Some(scene)) => current == scene,
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.release();

        if let Some(scene) = scene {
            let callback = Rc::clone(&self.callback);
            let sub = self.observable(&scene).subscribe(self.options, move |scene, state| {
                (&mut *callback.borrow_mut())(scene, state)
            });
            self.registration = Some((scene, sub));
        }
    }

    fn release(&mut self) {
        if let Some((_, mut sub)) = self.registration.take() {
            sub.cancel();
        }
    }
}

impl<S: RenderScene> Component<S> for RenderHook<S> {
    fn mount(&mut self, ctx: &ViewportCtx<S>) {
        self.sync(ctx);
    }

    fn update(&mut self, ctx: &ViewportCtx<S>) {
        self.sync(ctx);
    }

    fn unmount(&mut self) {
        self.release();
    }
}

/// Runs `callback` right before every render of the enclosing viewport's scene.
pub fn use_before_render<S: RenderScene>(
    callback: impl FnMut(&S, &mut EventState) + 'static,
) -> RenderHook<S> {
    RenderHook::new(RenderPhase::BeforeRender, callback)
}

/// Runs `callback` right after every render of the enclosing viewport's scene.
pub fn use_after_render<S: RenderScene>(
    callback: impl FnMut(&S, &mut EventState) + 'static,
) -> RenderHook<S> {
    RenderHook::new(RenderPhase::AfterRender, callback)
}
