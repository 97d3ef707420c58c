use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use roomcore::{
    realtime::{ChannelError, ChannelEvents},
    ChannelEvent, ConnectionWatcher, MediaOptions, MediaSession, RealtimeChannel, RoomClient,
    RoomClientError, RoomResponse,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// One scripted answer of the mock room API
#[derive(Debug, Clone)]
pub enum Step {
    Respond(RoomResponse),
    Delayed(Duration, RoomResponse),
    TransportFailure,
    ServerError(u16),
}

/// Room client replaying a script; the last step repeats forever
pub struct MockRoomClient {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicU32,
}

impl MockRoomClient {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    fn next_step(&self) -> Step {
        let mut script = self.script.lock();
        let step = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        step.unwrap_or(Step::Respond(RoomResponse::default()))
    }
}

#[async_trait]
impl RoomClient for MockRoomClient {
    async fn get_room(&self) -> Result<RoomResponse, RoomClientError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        match self.next_step() {
            Step::Respond(response) => Ok(response),
            Step::Delayed(delay, response) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Step::TransportFailure => Err(RoomClientError::Transport("connection refused".into())),
            Step::ServerError(status) => Err(RoomClientError::Status {
                status,
                message: "boom".into(),
            }),
        }
    }
}

/// Channel that records outbound messages and lets tests push inbound ones
pub struct MockChannel {
    pub url: String,
    sent: Mutex<Vec<Value>>,
    events: Mutex<Option<ChannelEvents>>,
}

impl MockChannel {
    pub fn new(url: &str) -> Arc<Self> {
        Arc::new(Self {
            url: url.to_string(),
            sent: Mutex::new(Vec::new()),
            events: Mutex::new(None),
        })
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_started(&self) -> bool {
        self.events.lock().is_some()
    }

    /// Data address, comparable with `MockSession::channel_addr`
    pub fn addr(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as *const () as usize
    }

    /// Simulates a server push
    pub fn push(&self, event: ChannelEvent) {
        if let Some(events) = self.events.lock().as_ref() {
            let _ = events.send(event);
        }
    }
}

impl RealtimeChannel for MockChannel {
    fn start_session(&self, events: ChannelEvents) {
        *self.events.lock() = Some(events);
    }

    fn send(&self, message: Value) -> Result<(), ChannelError> {
        self.sent.lock().push(message);
        Ok(())
    }
}

pub struct MockWatcher;

impl ConnectionWatcher for MockWatcher {
    fn name(&self) -> &'static str {
        "MockWatcher"
    }
}

/// Session recording how the orchestrator drove it
pub struct MockSession {
    pub options: MediaOptions,
    pub channel_addr: usize,
    monitor_set: AtomicBool,
    started: AtomicBool,
    destroyed: AtomicBool,
}

impl MockSession {
    pub fn new(options: MediaOptions, channel: &Arc<dyn RealtimeChannel>) -> Arc<Self> {
        Arc::new(Self {
            options,
            channel_addr: Arc::as_ptr(channel) as *const () as usize,
            monitor_set: AtomicBool::new(false),
            started: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        })
    }

    pub fn has_monitor(&self) -> bool {
        self.monitor_set.load(Ordering::Relaxed)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Relaxed)
    }
}

impl MediaSession for MockSession {
    fn set_monitor(&self, _watcher: Arc<dyn ConnectionWatcher>) {
        self.monitor_set.store(true, Ordering::Relaxed);
    }

    fn start(&self) {
        self.started.store(true, Ordering::Relaxed);
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::Relaxed);
    }
}
