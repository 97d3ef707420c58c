use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use crate::room::RoomResponse;

/// Inbound signals a real-time channel pushes into the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Transport connected; the room is not necessarily ready yet
    Opened,
    /// Server announced the room as ready
    RoomReady(RoomResponse),
    /// Server pushed a new broadcast list
    BroadcastsUpdate(Value),
    /// Transport closed by either side
    Closed,
}

/// Sender half handed to a channel when its session starts
pub type ChannelEvents = mpsc::UnboundedSender<ChannelEvent>;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel closed")]
    Closed,

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Persistent real-time connection to the room
///
/// Implementations own the wire protocol. `start_session` must return
/// promptly; inbound traffic is reported through `events`.
pub trait RealtimeChannel: Send + Sync {
    fn start_session(&self, events: ChannelEvents);

    fn send(&self, message: Value) -> Result<(), ChannelError>;
}

/// Builds a channel for a websocket endpoint
pub type ChannelFactory = Arc<dyn Fn(&str) -> Arc<dyn RealtimeChannel> + Send + Sync>;

/// Channel that only logs outbound traffic and never reports readiness
///
/// Useful for dry runs where the readiness signal is expected to come from
/// the poll fallback.
pub struct LoggingChannel {
    url: String,
}

impl LoggingChannel {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }

    pub fn factory() -> ChannelFactory {
        Arc::new(|url: &str| Arc::new(LoggingChannel::new(url)) as Arc<dyn RealtimeChannel>)
    }
}

impl RealtimeChannel for LoggingChannel {
    fn start_session(&self, events: ChannelEvents) {
        info!(url = %self.url, "Channel session started (logging only)");
        let _ = events.send(ChannelEvent::Opened);
    }

    fn send(&self, message: Value) -> Result<(), ChannelError> {
        info!(url = %self.url, message = %message, "Channel send");
        Ok(())
    }
}
