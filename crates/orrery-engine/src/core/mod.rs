//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform
//! loop), the rendering backend and higher layers (viewport, studio). The
//! viewport layer only talks to engines and scenes through the traits in
//! [`backend`], which keeps it testable without a GPU.

mod app;
pub mod backend;
mod ctx;

pub use app::{App, AppControl};
pub use backend::{DrawSurface, EngineOf, EngineOptionsOf, RenderEngine, RenderScene, SurfaceOf};
pub use ctx::{FrameCtx, WindowCtx};
