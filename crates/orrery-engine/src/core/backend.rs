use std::fmt::Debug;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::observable::Observable;

/// Drawable target a viewport binds an engine to.
///
/// Owned by the host; engines only hold a cheap clone of the handle.
pub trait DrawSurface: Clone + 'static {
    /// Size-change notifications for this surface, if the host can observe them.
    fn resize_events(&self) -> Option<Observable<PhysicalSize<u32>>>;
}

/// Rendering engine bound to one surface.
///
/// Implementations are shared handles: clones refer to the same engine and
/// `PartialEq` compares instance identity.
pub trait RenderEngine: Clone + PartialEq + 'static {
    type Surface: DrawSurface;
    type Options: Clone + PartialEq + Default + Debug + 'static;

    fn create(
        surface: &Self::Surface,
        antialias: Option<bool>,
        options: &Self::Options,
        adapt_to_device_ratio: bool,
    ) -> Result<Self>;

    /// Matches the render target to the surface's current size.
    fn resize(&self);

    /// Registers a callback run once per frame until the engine is disposed.
    fn run_render_loop(&self, frame: Box<dyn FnMut()>);

    /// Releases the engine, its render loop and every scene created on it.
    ///
    /// Must be idempotent.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// Render graph owned by an engine.
pub trait RenderScene: Clone + PartialEq + 'static {
    type Engine: RenderEngine;
    type Options: Clone + PartialEq + Default + Debug + 'static;

    fn create(engine: &Self::Engine, options: &Self::Options) -> Result<Self>;

    fn engine(&self) -> Self::Engine;

    fn is_ready(&self) -> bool;

    /// Fires once when the scene transitions to ready.
    fn on_ready(&self) -> Observable<Self>;

    fn on_before_render(&self) -> Observable<Self>;

    fn on_after_render(&self) -> Observable<Self>;

    /// Rendering requires an active camera.
    fn has_active_camera(&self) -> bool;

    fn render(&self);
}

pub type EngineOf<S> = <S as RenderScene>::Engine;
pub type SurfaceOf<S> = <<S as RenderScene>::Engine as RenderEngine>::Surface;
pub type EngineOptionsOf<S> = <<S as RenderScene>::Engine as RenderEngine>::Options;
