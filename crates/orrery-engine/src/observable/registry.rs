use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Subscription;

/// Mask matching every notification category.
pub const MASK_ALL: u32 = u32::MAX;

/// Stable handle for one registration.
///
/// Ids are never reused within a registry, so a stale id can only ever miss.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Registration options.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ObserverOptions {
    /// Categories this registration listens to. Delivery requires
    /// `mask & notification_mask != 0`.
    pub mask: u32,
    /// Place the registration ahead of every existing one.
    pub insert_first: bool,
    /// Remove the registration after its first delivery.
    pub call_once: bool,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            mask: MASK_ALL,
            insert_first: false,
            call_once: false,
        }
    }
}

impl ObserverOptions {
    /// Options for a one-shot registration.
    pub fn once() -> Self {
        Self { call_once: true, ..Self::default() }
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }

    pub fn first(mut self) -> Self {
        self.insert_first = true;
        self
    }
}

/// Per-notification state shared by all callbacks of one `notify` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EventState {
    /// Mask the notification was raised with.
    pub mask: u32,
    /// Set by a callback to stop delivery to the remaining registrations.
    pub skip_next_observers: bool,
}

type Callback<T> = Rc<RefCell<dyn FnMut(&T, &mut EventState)>>;

struct Registration<T> {
    id: ObserverId,
    mask: u32,
    call_once: bool,
    callback: Callback<T>,
}

struct Registry<T> {
    next_id: u64,
    entries: Vec<Registration<T>>,
}

/// Ordered registry of callbacks for values of type `T`.
///
/// `Observable` is a shared handle: clones refer to the same registry. All
/// access is single-threaded; callbacks may add or remove registrations
/// (including their own) while a notification is in flight.
pub struct Observable<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Observable<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry { next_id: 0, entries: Vec::new() })),
        }
    }

    /// Registers `callback` and returns its id.
    pub fn add<F>(&self, options: ObserverOptions, callback: F) -> ObserverId
    where
        F: FnMut(&T, &mut EventState) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = ObserverId(registry.next_id);
        registry.next_id += 1;

        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        let entry = Registration {
            id,
            mask: options.mask,
            call_once: options.call_once,
            callback,
        };

        if options.insert_first {
            registry.entries.insert(0, entry);
        } else {
            registry.entries.push(entry);
        }

        id
    }

    /// Registers a one-shot callback.
    pub fn add_once<F>(&self, callback: F) -> ObserverId
    where
        F: FnMut(&T, &mut EventState) + 'static,
    {
        self.add(ObserverOptions::once(), callback)
    }

    /// Registers `callback` and returns a guard that removes it on cancel or drop.
    pub fn subscribe<F>(&self, options: ObserverOptions, callback: F) -> Subscription<T>
    where
        F: FnMut(&T, &mut EventState) + 'static,
    {
        let id = self.add(options, callback);
        Subscription::new(self, id)
    }

    /// Removes a registration. Returns `false` if it was already gone.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut registry = self.registry.borrow_mut();
        match registry.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                registry.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.registry.borrow().entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every registration.
    pub fn clear(&self) {
        self.registry.borrow_mut().entries.clear();
    }

    /// Returns `true` if both handles refer to the same registry.
    pub fn same_registry(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
    }

    /// Delivers `value` to every registration whose mask intersects `mask`.
    ///
    /// The set of candidates is fixed when the call starts; registrations
    /// removed meanwhile are skipped, registrations added meanwhile wait for
    /// the next notification. Returns `false` if a callback stopped delivery
    /// through [`EventState::skip_next_observers`].
    pub fn notify(&self, value: &T, mask: u32) -> bool {
        let pending: Vec<(ObserverId, bool, Callback<T>)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|e| e.mask & mask != 0)
            .map(|e| (e.id, e.call_once, Rc::clone(&e.callback)))
            .collect();

        let mut state = EventState { mask, skip_next_observers: false };

        for (id, call_once, callback) in pending {
            let live = if call_once { self.remove(id) } else { self.contains(id) };
            if !live {
                continue;
            }

            let Ok(mut callback) = callback.try_borrow_mut() else {
                log::warn!("observer {id:?} is already running; skipping re-entrant notification");
                continue;
            };
            (&mut *callback)(value, &mut state);

            if state.skip_next_observers {
                return false;
            }
        }

        true
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { registry: Rc::clone(&self.registry) }
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").field("observers", &self.len()).finish()
    }
}
