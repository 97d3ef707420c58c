// Real-time transport seam
//
// The wire protocol lives outside this crate; these traits are the contract
// the orchestrator needs from it.

pub use channel::{
    ChannelError, ChannelEvent, ChannelEvents, ChannelFactory, LoggingChannel, RealtimeChannel,
};
pub use watcher::{ConnectionWatcher, NoOpWatcher, WatcherFactory};

mod channel;
mod watcher;
