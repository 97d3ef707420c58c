// Connection state machine and the background tasks it owns

pub use heartbeat::{keep_alive_message, send_keep_alive};
pub use service::Orchestrator;
pub use throttle::{ThrottleGuard, ThrottleSink};
pub use timers::{TimerKind, TimerSet};

mod heartbeat;
mod polling;
mod service;
mod throttle;
mod timers;
