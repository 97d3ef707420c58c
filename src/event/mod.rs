// Event-driven communication between the orchestrator and its listeners
//
// Producers (room fetch, channel, poll fallback, heartbeat, client sends)
// publish on the bus; application listeners consume from it.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::{
    ConnectionStatus, Event, EventRecord, EventSource, WARNING_COMAPI, WARNING_REALTIME,
};
pub use listener::{EventListener, ListenerId};

// Internal modules
mod bus;
mod events;
mod listener;
