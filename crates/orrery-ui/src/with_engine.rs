use orrery_engine::core::{EngineOf, RenderScene};

use crate::component::Component;
use crate::context::{EngineContext, ViewportCtx};

/// A component that wants the enclosing viewport's engine and surface
/// handed to it rather than reading them from the context itself.
pub trait EngineContextConsumer<S: RenderScene>: Component<S> {
    fn set_engine_context(&mut self, engine_context: EngineContext<EngineOf<S>>);
}

/// Wraps a consumer, injecting the current [`EngineContext`] before every
/// `mount` and `update`.
pub struct WithEngineContext<C> {
    inner: C,
}

impl<C> WithEngineContext<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<S, C> Component<S> for WithEngineContext<C>
where
    S: RenderScene,
    C: EngineContextConsumer<S>,
{
    fn mount(&mut self, ctx: &ViewportCtx<S>) {
        self.inner.set_engine_context(ctx.engine_context());
        self.inner.mount(ctx);
    }

    fn update(&mut self, ctx: &ViewportCtx<S>) {
        self.inner.set_engine_context(ctx.engine_context());
        self.inner.update(ctx);
    }

    fn unmount(&mut self) {
        self.inner.unmount();
    }
}

pub fn with_engine_context<C>(inner: C) -> WithEngineContext<C> {
    WithEngineContext::new(inner)
}
