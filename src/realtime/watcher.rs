use std::sync::Arc;

/// Tracks network quality and connection health of an active channel
///
/// The orchestrator only wires a watcher into the bus and, on join, into the
/// media session; what it measures is up to the implementation.
pub trait ConnectionWatcher: Send + Sync {
    /// Get a human-readable name for this watcher (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Builds a fresh watcher for every connection lifecycle
pub type WatcherFactory = Arc<dyn Fn() -> Arc<dyn ConnectionWatcher> + Send + Sync>;

/// A watcher that observes nothing
pub struct NoOpWatcher;

impl NoOpWatcher {
    pub fn factory() -> WatcherFactory {
        Arc::new(|| Arc::new(NoOpWatcher) as Arc<dyn ConnectionWatcher>)
    }
}

impl ConnectionWatcher for NoOpWatcher {
    fn name(&self) -> &'static str {
        "NoOpWatcher"
    }
}
