use winit::window::{Window, WindowId};

use crate::window::RuntimeCtx;

/// The window a frame is being produced for.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Engines draw on their own; the frame only says which window is due and
/// lets the app queue runtime requests.
pub struct FrameCtx<'a> {
    pub window:  WindowCtx<'a>,
    pub runtime: &'a mut RuntimeCtx,
}
