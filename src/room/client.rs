use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::models::RoomResponse;

/// Errors that can occur when fetching a room
#[derive(Debug, Error)]
pub enum RoomClientError {
    /// The request never got a response (DNS, connect, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status and no usable body
    #[error("Server error {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RoomClientError {
    /// Transport errors are reported as warnings; everything else denies access
    pub fn is_transport(&self) -> bool {
        matches!(self, RoomClientError::Transport(_))
    }
}

impl From<reqwest::Error> for RoomClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RoomClientError::InvalidResponse(e.to_string())
        } else {
            RoomClientError::Transport(e.to_string())
        }
    }
}

/// Room-fetch collaborator bound to one access token
#[async_trait]
pub trait RoomClient: Send + Sync {
    async fn get_room(&self) -> Result<RoomResponse, RoomClientError>;
}

/// Builds a room client for `(api base url, access token)`
pub type RoomClientFactory = Arc<dyn Fn(&str, &str) -> Arc<dyn RoomClient> + Send + Sync>;

/// Room client talking to the HTTP room API
pub struct HttpRoomClient {
    client: Client,
    url: String,
}

impl HttpRoomClient {
    pub fn new(api: &str, token: &str) -> Self {
        Self::with_client(Client::new(), api, token)
    }

    /// Reuses an existing reqwest client (connection pool, default headers)
    pub fn with_client(client: Client, api: &str, token: &str) -> Self {
        Self {
            client,
            url: format!("{}/rooms/{}", api.trim_end_matches('/'), token),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Factory producing `HttpRoomClient`s that share one connection pool
    pub fn factory() -> RoomClientFactory {
        let client = Client::new();
        Arc::new(move |api: &str, token: &str| {
            Arc::new(HttpRoomClient::with_client(client.clone(), api, token)) as Arc<dyn RoomClient>
        })
    }

    async fn handle_response(response: reqwest::Response) -> Result<RoomResponse, RoomClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();

        // Access failures come back as {"error": "..."} with a 4xx status
        if let Ok(parsed) = serde_json::from_str::<RoomResponse>(&body) {
            if parsed.error.is_some() {
                return Ok(parsed);
            }
        }

        let message = if status == StatusCode::NOT_FOUND {
            "Room not found".to_string()
        } else {
            body
        };

        Err(RoomClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RoomClient for HttpRoomClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn get_room(&self) -> Result<RoomResponse, RoomClientError> {
        debug!("Fetching room");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            warn!(error = %e, "Room fetch failed");
            RoomClientError::from(e)
        })?;

        Self::handle_response(response).await
    }
}
