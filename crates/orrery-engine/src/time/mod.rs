//! Time subsystem.
//!
//! One `FrameClock` per render loop; the engine ticks it once per frame and
//! exposes the clamped delta to per-frame callbacks.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
