use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::window::{WindowEvents, WindowSurface};

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once a window and its drawable surface exist.
    ///
    /// `window_events` carries window-level notifications (resize, scale
    /// factor changes) for every window the runtime owns.
    fn on_surface(&mut self, surface: &WindowSurface, window_events: &WindowEvents) -> AppControl;

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called right before a window and its surface are destroyed.
    fn on_surface_lost(&mut self, window_id: WindowId) {
        let _ = window_id;
    }
}
