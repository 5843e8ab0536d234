use super::{Observable, ObserverId};

/// Scoped registration.
///
/// Removes its registration on [`cancel`](Self::cancel) or drop. Cancelling
/// twice, or cancelling a one-shot registration that already fired, is a no-op.
pub struct Subscription<T> {
    observable: Observable<T>,
    id: Option<ObserverId>,
}

impl<T> Subscription<T> {
    pub fn new(observable: &Observable<T>, id: ObserverId) -> Self {
        Self { observable: observable.clone(), id: Some(id) }
    }

    pub fn id(&self) -> Option<ObserverId> {
        self.id
    }

    /// `true` while the registration is still present in its registry.
    pub fn is_active(&self) -> bool {
        self.id.is_some_and(|id| self.observable.contains(id))
    }

    /// Returns `true` if this call removed the registration.
    pub fn cancel(&mut self) -> bool {
        match self.id.take() {
            Some(id) => self.observable.remove(id),
            None => false,
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
