//! Orrery UI: hosts an engine and scene inside a component tree.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use orrery_ui::prelude::*;
//!
//! Application::new()
//!     .title("Orrery")
//!     .props(ViewportProps::new(|scene: &GpuScene| {
//!         scene.set_active_camera(Some(Camera::default()));
//!     }))
//!     .child(use_before_render(|scene: &GpuScene, _| {
//!         scene.set_clear_color(Color::rgb(0.1, 0.1, 0.2));
//!     }))
//!     .run()?;
//! ```
//!
//! # Reading the engine from a component
//!
//! Every descendant is mounted with the viewport's [`ViewportCtx`]:
//!
//! ```rust,ignore
//! impl Component<GpuScene> for Hud {
//!     fn update(&mut self, ctx: &ViewportCtx<GpuScene>) {
//!         self.visible = ctx.scene_ready();
//!     }
//! }
//! ```

pub mod app;
pub mod component;
pub mod context;
pub mod controller;
pub mod hooks;
pub mod props;
pub mod viewport;
pub mod with_engine;

#[cfg(test)]
mod testing;

// Top-level re-exports for the common entry point (`use orrery_ui::Application`)
pub use app::Application;
pub use context::ViewportCtx;

/// Everything needed to build a viewport and its descendants.
pub mod prelude {
    pub use crate::app::Application;
    pub use crate::component::{Component, Element};
    pub use crate::context::{EngineContext, SceneContext, ViewportCtx};
    pub use crate::controller::ViewportController;
    pub use crate::hooks::{use_after_render, use_before_render, RenderHook, RenderPhase};
    pub use crate::props::{SceneCallback, ViewportProps};
    pub use crate::viewport::Viewport;
    pub use crate::with_engine::{with_engine_context, EngineContextConsumer, WithEngineContext};

    // Engine primitives components usually touch.
    pub use orrery_engine::core::{RenderEngine, RenderScene};
    pub use orrery_engine::engine::GpuEngine;
    pub use orrery_engine::observable::{EventState, MASK_ALL};
    pub use orrery_engine::paint::Color;
    pub use orrery_engine::scene::{Camera, GpuScene, SceneOptions};
}
