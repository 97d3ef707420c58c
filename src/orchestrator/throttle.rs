use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Where a coalesced message ends up
pub type ThrottleSink = Arc<dyn Fn(Value) + Send + Sync>;

#[derive(Default)]
struct ThrottleState {
    pending: Option<Value>,
    window_open: bool,
    flush: Option<JoinHandle<()>>,
}

/// Coalesces client sends to at most one publish per window
///
/// The first submit opens a window; every submit inside it replaces the
/// pending message; the latest one is published when the window closes.
pub struct ThrottleGuard {
    window: Duration,
    sink: ThrottleSink,
    state: Arc<Mutex<ThrottleState>>,
}

impl ThrottleGuard {
    pub fn new(window: Duration, sink: ThrottleSink) -> Self {
        Self {
            window,
            sink,
            state: Arc::new(Mutex::new(ThrottleState::default())),
        }
    }

    /// Queues `message`; returns true if this call opened a new window
    pub fn submit(&self, message: Value) -> bool {
        let mut state = self.state.lock();
        state.pending = Some(message);

        if state.window_open {
            debug!("Throttled send coalesced");
            return false;
        }

        let Ok(runtime) = Handle::try_current() else {
            error!("Throttled send outside a tokio runtime; publishing immediately");
            let message = state.pending.take();
            drop(state);
            if let Some(message) = message {
                (self.sink)(message);
            }
            return true;
        };

        state.window_open = true;

        let window = self.window;
        let sink = self.sink.clone();
        let shared = self.state.clone();
        state.flush = Some(runtime.spawn(async move {
            tokio::time::sleep(window).await;

            let message = {
                let mut state = shared.lock();
                state.window_open = false;
                state.flush = None;
                state.pending.take()
            };

            if let Some(message) = message {
                sink(message);
            }
        }));

        true
    }

    /// Drops any pending message without publishing it
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        if let Some(flush) = state.flush.take() {
            flush.abort();
        }
        state.pending = None;
        state.window_open = false;
    }
}

impl Drop for ThrottleGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}
