//! Orrery engine crate.
//!
//! Owns the rendering-side pieces a viewport binds to: the engine/scene
//! contracts, notification registries, the wgpu engine and scene, and the
//! winit runtime that feeds them surfaces, resize events and redraws.

pub mod core;
pub mod device;
pub mod engine;
pub mod observable;
pub mod scene;
pub mod time;
pub mod window;

pub mod logging;
pub mod paint;
