use std::time::Duration;

/// Default room API endpoint
pub const DEFAULT_API_URL: &str = "https://api.eyeson.team";

/// Credentials for third-party media embeds (YouTube live streaming)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaEmbedCredentials {
    pub key: String,
    pub client: String,
}

/// Periods and bounds for the background tasks of a connection lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Period of the `user_joins` keep-alive sent before a session is joined
    pub heartbeat_interval: Duration,
    /// Period of the readiness poll fallback
    pub poll_interval: Duration,
    /// Tick on which the poll fallback gives up
    pub poll_max_ticks: u32,
    /// Coalescing window of `throttled_send`
    pub throttle_window: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            poll_max_ticks: 200, // ~1000 seconds
            throttle_window: Duration::from_millis(500),
        }
    }
}

/// Orchestrator configuration, overridable before `connect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the room API
    pub api: String,
    pub youtube: MediaEmbedCredentials,
    pub timings: Timings,
}

impl Config {
    /// Reads overrides from the environment, falling back to the defaults
    pub fn from_env() -> Self {
        let api = std::env::var("ROOMCORE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self {
            api,
            youtube: MediaEmbedCredentials {
                key: std::env::var("ROOMCORE_YOUTUBE_KEY").unwrap_or_default(),
                client: std::env::var("ROOMCORE_YOUTUBE_CLIENT").unwrap_or_default(),
            },
            timings: Timings::default(),
        }
    }

    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = api.into();
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: DEFAULT_API_URL.to_string(),
            youtube: MediaEmbedCredentials::default(),
            timings: Timings::default(),
        }
    }
}
