//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and windows, and turns platform events into
//! surface-resize, window-resize and redraw notifications.

mod events;
mod runtime;
mod surface;

pub use events::WindowEvents;
pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
pub use surface::WindowSurface;
