//! Scenes rendered by [`crate::engine::GpuEngine`].
//!
//! A scene here is deliberately thin: a clear color, an optional active
//! camera, readiness tracking and the before/after-render registries that
//! per-frame hooks attach to.

mod camera;
mod gpu_scene;

pub use camera::Camera;
pub use gpu_scene::{GpuScene, SceneOptions};
