use std::fmt;
use uuid::Uuid;

use super::events::EventRecord;

/// Trait for components that receive bus events
///
/// Implemented for every `Fn(&EventRecord) + Send + Sync`, so plain closures
/// can be registered directly. Listeners run synchronously inside
/// `EventBus::send` and should not block.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &EventRecord);
}

impl<F> EventListener for F
where
    F: Fn(&EventRecord) + Send + Sync,
{
    fn on_event(&self, event: &EventRecord) {
        self(event)
    }
}

/// Handle returned on registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
