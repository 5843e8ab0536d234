//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and the optional MSAA target
//! - acquiring frames and recording the clear pass

mod gpu;
mod init;
mod surface;

pub use gpu::Gpu;
pub use init::{EngineOptions, MSAA_SAMPLES};
pub use surface::{render_size, SurfaceErrorAction};
