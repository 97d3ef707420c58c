use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Room metadata as returned by the room API
///
/// Only the identifying fields are typed; everything else the API sends is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The user the access token belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Service links handed out with the room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    /// Endpoint of the real-time channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websocket: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a room fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomResponse {
    #[serde(default)]
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcasts: Option<Value>,
}

impl RoomResponse {
    /// A response signalling that the room is ready
    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Default::default()
        }
    }

    /// A not-yet-ready response pointing at the given channel endpoint
    pub fn pending(websocket: impl Into<String>) -> Self {
        Self {
            links: Some(Links {
                websocket: Some(websocket.into()),
                extra: Map::new(),
            }),
            ..Default::default()
        }
    }

    /// A response carrying an access error
    pub fn denied(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_broadcasts(mut self, broadcasts: Value) -> Self {
        self.broadcasts = Some(broadcasts);
        self
    }

    /// The real-time channel endpoint, if the API sent one
    pub fn websocket_url(&self) -> Option<&str> {
        self.links.as_ref()?.websocket.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_response() {
        let body = json!({
            "ready": false,
            "room": { "id": "r1", "name": "Standup", "shutdown": false },
            "user": { "id": "u1", "name": "Ada" },
            "links": { "websocket": "wss://x", "gui": "https://app/r1" },
            "broadcasts": [{ "platform": "youtube" }]
        });

        let response: RoomResponse = serde_json::from_value(body).unwrap();

        assert!(!response.ready);
        assert_eq!(response.websocket_url(), Some("wss://x"));
        assert_eq!(response.room.as_ref().unwrap().name.as_deref(), Some("Standup"));
        assert_eq!(
            response.room.as_ref().unwrap().extra.get("shutdown"),
            Some(&json!(false))
        );
        assert_eq!(
            response.links.as_ref().unwrap().extra.get("gui"),
            Some(&json!("https://app/r1"))
        );
        assert!(response.broadcasts.is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let response: RoomResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!response.ready);
        assert!(response.error.is_none());
        assert!(response.websocket_url().is_none());
    }

    #[test]
    fn test_error_response() {
        let response: RoomResponse =
            serde_json::from_value(json!({ "error": "access key expired" })).unwrap();
        assert_eq!(response.error.as_deref(), Some("access key expired"));
    }
}
