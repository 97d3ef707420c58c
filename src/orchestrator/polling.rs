use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::event::{Event, EventBus, WARNING_COMAPI};

/// Spawns the readiness poll that backs up the channel's own signal
pub(crate) fn spawn_poll_fallback(
    bus: EventBus,
    period: Duration,
    max_ticks: u32,
) -> JoinHandle<()> {
    tokio::spawn(poll_fallback(bus, period, max_ticks))
}

/// Polls the room until a live channel shows up or `max_ticks` is reached
///
/// A ready response publishes `room_ready` but does not stop the loop; the
/// live-channel check ends it on the following tick.
async fn poll_fallback(bus: EventBus, period: Duration, max_ticks: u32) {
    let mut counter: u32 = 1;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if counter >= max_ticks {
            debug!(counter, "Poll fallback: max count exceeded, stopping");
            return;
        }

        if bus.connection().is_some() {
            debug!("Poll fallback: connection set, stopping");
            return;
        }

        let Some(api) = bus.api() else {
            debug!("Poll fallback: no room client on bus, stopping");
            return;
        };

        match api.get_room().await {
            Ok(data) if data.ready => {
                debug!("Poll fallback: room ready");
                bus.emit(Event::RoomReady { content: data });
            }
            Ok(_) => {
                debug!(counter, "Poll fallback: room not ready");
                counter += 1;
            }
            Err(e) => {
                warn!(counter, error = %e, "Poll fallback: room fetch failed");
                if e.is_transport() {
                    bus.emit(Event::warning(WARNING_COMAPI));
                }
                counter += 1;
            }
        }
    }
}
