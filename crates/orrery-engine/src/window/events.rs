use crate::observable::{Observable, MASK_ALL};

/// Window-level notifications shared by every viewport of a runtime.
///
/// This is the fallback resize channel: it fires on any window resize or
/// scale-factor change, whether or not the surface itself reports sizes.
#[derive(Debug, Clone, Default)]
pub struct WindowEvents {
    resized: Observable<()>,
}

impl WindowEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resized(&self) -> &Observable<()> {
        &self.resized
    }

    /// Raises a window resize notification.
    pub fn notify_resized(&self) {
        self.resized.notify(&(), MASK_ALL);
    }
}
