use serde_json::{json, Value};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::event::EventBus;

/// Presence message sent while no session is attached
pub fn keep_alive_message() -> Value {
    json!({ "message": "user_joins" })
}

/// Sends one keep-alive over the channel held by `bus`
///
/// Returns whether a channel was there to send on.
pub fn send_keep_alive(bus: &EventBus) -> bool {
    let Some(channel) = bus.rt_connection() else {
        debug!("No channel for keep-alive");
        return false;
    };

    if let Err(e) = channel.send(keep_alive_message()) {
        warn!(error = %e, "Keep-alive send failed");
    }
    true
}

/// Spawns the repeating keep-alive; the first beat goes out after one period
pub(crate) fn spawn_heartbeat(bus: EventBus, period: Duration) -> JoinHandle<()> {
    debug!(period_secs = period.as_secs(), "Starting keep-alive heartbeat");

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if bus.is_destroyed() {
                break;
            }
            send_keep_alive(&bus);
        }
    })
}
