//! Notification registries.
//!
//! Every event stream in the engine (scene readiness, surface resize,
//! window resize, before/after render, engine disposal) is an
//! [`Observable`]: an ordered list of registrations with stable ids.
//!
//! - registrations are delivered in order; `insert_first` puts one at the front
//! - a registration only fires when its mask intersects the notification mask
//! - one-shot registrations are removed before their callback runs
//! - [`Subscription`] ties a registration to a scope and removes it on cancel/drop

mod registry;
mod subscription;

pub use registry::{EventState, Observable, ObserverId, ObserverOptions, MASK_ALL};
pub use subscription::Subscription;
