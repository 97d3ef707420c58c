use thiserror::Error;

use crate::realtime::{ChannelFactory, WatcherFactory};
use crate::room::RoomClientFactory;
use crate::session::SessionFactory;

/// External collaborators the orchestrator builds per connection lifecycle
#[derive(Clone)]
pub struct Collaborators {
    pub room_client: RoomClientFactory,
    pub channel: ChannelFactory,
    pub watcher: WatcherFactory,
    pub session: SessionFactory,
}

impl Collaborators {
    pub fn new(
        room_client: RoomClientFactory,
        channel: ChannelFactory,
        watcher: WatcherFactory,
        session: SessionFactory,
    ) -> Self {
        Self {
            room_client,
            channel,
            watcher,
            session,
        }
    }
}

/// Misuse of the public API; reported, never panicked on
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("No live channel: wait for connection status ready before joining")]
    NotConnected,

    #[error("A session is already active for this connection")]
    AlreadyJoined,
}
