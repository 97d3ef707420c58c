use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::room::RoomResponse;

/// Progress of a single connection attempt
///
/// Success runs `FetchRoom → ReceivedRoom → Ready`; `AccessDenied` ends an
/// attempt early. `ComApiError` names transport failures of the room API,
/// which surface as warnings rather than as a status change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionStatus {
    FetchRoom,
    ReceivedRoom,
    Ready,
    AccessDenied,
    #[serde(rename = "error:comapi")]
    #[strum(serialize = "error:comapi")]
    ComApiError,
}

impl ConnectionStatus {
    /// Whether no further status can follow within the same attempt
    ///
    /// Transport failures are not terminal: the attempt may still succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionStatus::Ready | ConnectionStatus::AccessDenied)
    }
}

/// Warning name for room API transport failures
pub const WARNING_COMAPI: &str = "error:comapi";

/// Warning name for a real-time channel that closed under us
pub const WARNING_REALTIME: &str = "error:realtime";

/// Events delivered to listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The connection attempt moved to a new status
    Connection {
        #[serde(rename = "connectionStatus")]
        connection_status: ConnectionStatus,
    },

    /// The room reported itself ready (channel push or poll fallback)
    RoomReady { content: RoomResponse },

    /// The set of live broadcasts changed
    BroadcastsUpdate { broadcasts: Value },

    /// Something went wrong that the caller may want to react to
    Warning { name: String },

    /// Free-form message published by the application itself
    Client { message: Value },
}

impl Event {
    pub fn connection(status: ConnectionStatus) -> Self {
        Event::Connection {
            connection_status: status,
        }
    }

    pub fn warning(name: impl Into<String>) -> Self {
        Event::Warning { name: name.into() }
    }

    /// Get the wire discriminator of the event
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Connection { .. } => "connection",
            Event::RoomReady { .. } => "room_ready",
            Event::BroadcastsUpdate { .. } => "broadcasts_update",
            Event::Warning { .. } => "warning",
            Event::Client { .. } => "client",
        }
    }
}

/// Who published a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Internal,
    Client,
}

/// An event plus its origin marker, as seen by listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub event: Event,
    #[serde(rename = "_src")]
    pub src: EventSource,
}

impl EventRecord {
    pub fn internal(event: Event) -> Self {
        Self {
            event,
            src: EventSource::Internal,
        }
    }

    pub fn client(message: Value) -> Self {
        Self {
            event: Event::Client { message },
            src: EventSource::Client,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    /// The status carried by a `connection` record
    pub fn connection_status(&self) -> Option<ConnectionStatus> {
        match self.event {
            Event::Connection { connection_status } => Some(connection_status),
            _ => None,
        }
    }

    pub fn is_client(&self) -> bool {
        self.src == EventSource::Client
    }
}
