use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use super::types::MediaOptions;
use crate::realtime::{ConnectionWatcher, RealtimeChannel};

/// Media session attached to a confirmed real-time channel
///
/// Track acquisition and signalling are the implementation's business; the
/// orchestrator only constructs, wires and starts it.
pub trait MediaSession: Send + Sync {
    fn set_monitor(&self, watcher: Arc<dyn ConnectionWatcher>);

    fn start(&self);

    /// Tear down tracks and peer connections
    fn destroy(&self) {}
}

/// Builds a session bound to a channel
pub type SessionFactory =
    Arc<dyn Fn(Arc<dyn RealtimeChannel>, MediaOptions) -> Arc<dyn MediaSession> + Send + Sync>;

/// The session created by a successful join
#[derive(Clone)]
pub struct ActiveSession {
    pub session: Arc<dyn MediaSession>,
    pub options: MediaOptions,
    pub started_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn new(session: Arc<dyn MediaSession>, options: MediaOptions) -> Self {
        Self {
            session,
            options,
            started_at: Utc::now(),
        }
    }
}

impl fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSession")
            .field("options", &self.options)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
