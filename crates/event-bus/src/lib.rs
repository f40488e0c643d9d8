//! Lifecycle Event Bus
//!
//! Explicit, typed replacement for window-level broadcast events. Components that
//! publish or observe rendering hook points share one [`EventBus`] by `Arc`.
//! Delivery is synchronous: every listener has returned before `publish` does.

mod bus;
mod event;

pub use bus::{EventBus, Listener, SubscriptionId};
pub use event::{Event, EventData, EventSource, LifecycleEvent, PresetsSnapshot, SurfaceRole};
