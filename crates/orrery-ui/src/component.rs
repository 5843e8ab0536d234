use orrery_engine::core::RenderScene;

use crate::context::ViewportCtx;

// ── Component trait ───────────────────────────────────────────────────────

/// A descendant of a viewport.
///
/// Components never receive the engine or scene directly; they read them
/// from the [`ViewportCtx`] they are mounted with. Every method has a no-op
/// default, so a component only overrides the phases it cares about.
///
/// ```rust,ignore
/// struct FrameCounter { frames: Rc<Cell<u64>>, hook: Option<Subscription<GpuScene>> }
///
/// impl Component<GpuScene> for FrameCounter {
///     fn mount(&mut self, ctx: &ViewportCtx<GpuScene>) {
///         let frames = self.frames.clone();
///         self.hook = ctx.scene().map(|scene| {
///             scene.on_after_render().subscribe(Default::default(), move |_, _| {
///                 frames.set(frames.get() + 1)
///             })
///         });
///     }
///     fn unmount(&mut self) {
///         self.hook = None;
///     }
/// }
/// ```
pub trait Component<S: RenderScene>: 'static {
    /// Called when the component becomes visible.
    fn mount(&mut self, _ctx: &ViewportCtx<S>) {}

    /// Called after the viewport publishes a new context while mounted.
    fn update(&mut self, _ctx: &ViewportCtx<S>) {}

    /// Called when the component is withheld again or the viewport goes away.
    fn unmount(&mut self) {}
}

// ── Element ───────────────────────────────────────────────────────────────

/// A type-erased component plus its mount state.
///
/// `mount` and `unmount` are edge-triggered: mounting an already mounted
/// element, or unmounting one that is not mounted, does nothing.
pub struct Element<S: RenderScene> {
    inner:   Box<dyn Component<S>>,
    mounted: bool,
}

impl<S: RenderScene> Element<S> {
    pub fn new<C: Component<S>>(component: C) -> Self {
        Self::boxed(Box::new(component))
    }

    pub fn boxed(inner: Box<dyn Component<S>>) -> Self {
        Self { inner, mounted: false }
    }

    /// The wrapped component, e.g. to move it to another viewport.
    pub fn into_inner(self) -> Box<dyn Component<S>> {
        self.inner
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn mount(&mut self, ctx: &ViewportCtx<S>) {
        if !self.mounted {
            self.mounted = true;
            self.inner.mount(ctx);
        }
    }

    #[inline]
    pub fn update(&mut self, ctx: &ViewportCtx<S>) {
        if self.mounted {
            self.inner.update(ctx);
        }
    }

    pub fn unmount(&mut self) {
        if self.mounted {
            self.mounted = false;
            self.inner.unmount();
        }
    }
}
