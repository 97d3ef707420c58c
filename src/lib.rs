// Connection and session lifecycle orchestrator for real-time rooms
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod event;
pub mod orchestrator;
pub mod realtime;
pub mod room;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::{Config, MediaEmbedCredentials, Timings};
pub use event::{ConnectionStatus, Event, EventBus, EventRecord, EventSource, ListenerId};
pub use orchestrator::{Orchestrator, TimerKind};
pub use realtime::{ChannelEvent, ConnectionWatcher, RealtimeChannel};
pub use room::{HttpRoomClient, RoomClient, RoomClientError, RoomResponse};
pub use session::{MediaOptions, MediaSession};
pub use shared::{Collaborators, CoreError};
