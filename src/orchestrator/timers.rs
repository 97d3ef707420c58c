use std::collections::HashMap;
use strum_macros::Display;
use tokio::task::JoinHandle;
use tracing::debug;

/// Background activities of a connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TimerKind {
    Heartbeat,
    PollFallback,
    ChannelPump,
}

/// Owns the task handles of one lifecycle
///
/// At most one task per kind. Replacing, cancelling or dropping the set
/// aborts the task.
#[derive(Debug, Default)]
pub struct TimerSet {
    handles: HashMap<TimerKind, JoinHandle<()>>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `handle`, aborting any task of the same kind
    pub fn insert(&mut self, kind: TimerKind, handle: JoinHandle<()>) {
        if let Some(previous) = self.handles.insert(kind, handle) {
            previous.abort();
            debug!(timer = %kind, "Replaced running timer");
        }
    }

    /// Aborts the task of `kind`; returns whether one was tracked
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.handles.remove(&kind) {
            Some(handle) => {
                handle.abort();
                debug!(timer = %kind, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (kind, handle) in self.handles.drain() {
            handle.abort();
            debug!(timer = %kind, "Timer cancelled");
        }
    }

    /// Whether a task of `kind` is tracked and still running
    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.handles
            .get(&kind)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
