use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::core::DrawSurface;
use crate::observable::{Observable, MASK_ALL};

/// Drawable surface backed by a winit window.
///
/// Cloning is cheap; clones share the window and its resize registry.
#[derive(Debug, Clone)]
pub struct WindowSurface {
    window:  Arc<Window>,
    resized: Option<Observable<PhysicalSize<u32>>>,
}

impl WindowSurface {
    /// Wraps `window`. When `observe_resize` is false the surface reports no
    /// size-change notifications and consumers fall back to window events.
    pub fn new(window: Arc<Window>, observe_resize: bool) -> Self {
        Self {
            window,
            resized: observe_resize.then(Observable::new),
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    /// Current drawable size in physical pixels.
    pub fn physical_size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    pub(crate) fn notify_resized(&self, size: PhysicalSize<u32>) {
        if let Some(resized) = &self.resized {
            resized.notify(&size, MASK_ALL);
        }
    }
}

impl DrawSurface for WindowSurface {
    fn resize_events(&self) -> Option<Observable<PhysicalSize<u32>>> {
        self.resized.clone()
    }
}
