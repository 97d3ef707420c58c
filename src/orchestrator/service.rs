use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::{
    heartbeat::{send_keep_alive, spawn_heartbeat},
    polling::spawn_poll_fallback,
    throttle::ThrottleGuard,
    timers::{TimerKind, TimerSet},
};
use crate::{
    config::Config,
    event::{
        ConnectionStatus, Event, EventBus, EventListener, EventRecord, ListenerId, WARNING_COMAPI,
    },
    realtime::ChannelEvent,
    room::{Links, Room, RoomResponse, User},
    session::{ActiveSession, MediaOptions},
    shared::{Collaborators, CoreError},
};

/// Room data captured by the last successful fetch
#[derive(Debug, Clone, Default)]
struct Profile {
    room: Option<Room>,
    user: Option<User>,
    links: Option<Links>,
}

struct Inner {
    collaborators: Collaborators,
    config: RwLock<Config>,
    bus: RwLock<EventBus>,
    timers: Mutex<TimerSet>,
    profile: RwLock<Profile>,
    throttle: ThrottleGuard,
    /// Bumped by every `connect`; a fetch from an older cycle is discarded
    generation: AtomicU64,
}

/// Drives a room connection from access token to joined media session
///
/// Cloning yields another handle to the same orchestrator.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_config(collaborators, Config::default())
    }

    pub fn with_config(collaborators: Collaborators, config: Config) -> Self {
        let window = config.timings.throttle_window;

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            Inner {
                collaborators,
                config: RwLock::new(config),
                bus: RwLock::new(EventBus::new()),
                timers: Mutex::new(TimerSet::new()),
                profile: RwLock::new(Profile::default()),
                throttle: ThrottleGuard::new(
                    window,
                    Arc::new(move |message: Value| {
                        if let Some(inner) = weak.upgrade() {
                            let bus = inner.bus.read().clone();
                            bus.send(EventRecord::client(message));
                        }
                    }),
                ),
                generation: AtomicU64::new(0),
            }
        });

        Self { inner }
    }

    /// The bus of the current lifecycle
    pub fn event_bus(&self) -> EventBus {
        self.inner.bus.read().clone()
    }

    pub fn config(&self) -> Config {
        self.inner.config.read().clone()
    }

    /// Replaces the configuration; takes effect on the next `connect`
    pub fn set_config(&self, config: Config) {
        *self.inner.config.write() = config;
    }

    pub fn room(&self) -> Option<Room> {
        self.inner.profile.read().room.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.profile.read().user.clone()
    }

    pub fn links(&self) -> Option<Links> {
        self.inner.profile.read().links.clone()
    }

    pub fn session(&self) -> Option<ActiveSession> {
        self.event_bus().session()
    }

    pub fn is_timer_active(&self, kind: TimerKind) -> bool {
        self.inner.timers.lock().is_active(kind)
    }

    /// Attach an event listener
    pub fn on_event<L>(&self, listener: L) -> Option<ListenerId>
    where
        L: EventListener + 'static,
    {
        self.event_bus().on_receive(Arc::new(listener))
    }

    /// Remove an event listener
    pub fn off_event(&self, id: ListenerId) -> bool {
        self.event_bus().remove_listener(id)
    }

    /// Fetches the room for `token` and brings up the real-time channel
    ///
    /// Progress and failures are reported on the bus only.
    #[instrument(skip(self, token))]
    pub async fn connect(&self, token: &str) {
        debug!("Connecting");
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.end_previous_cycle();

        let bus = self.event_bus();
        bus.update_status(ConnectionStatus::FetchRoom);

        let config = self.config();
        let api = (self.inner.collaborators.room_client)(config.api.as_str(), token);
        let result = api.get_room().await;

        if bus.is_destroyed() {
            debug!("Destroyed while fetching room, discarding response");
            return;
        }

        if !self.is_current(generation) {
            debug!(generation, "Superseded by a newer connect, discarding response");
            return;
        }

        let data = match result {
            Ok(data) => data,
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Room API unreachable");
                bus.emit(Event::warning(WARNING_COMAPI));
                return;
            }
            Err(e) => {
                warn!(error = %e, "Room fetch failed");
                bus.update_status(ConnectionStatus::AccessDenied);
                return;
            }
        };

        if let Some(reason) = &data.error {
            warn!(error = %reason, "Room access denied");
            bus.update_status(ConnectionStatus::AccessDenied);
            return;
        }

        let Some(websocket) = data.websocket_url().map(str::to_owned) else {
            warn!("Room response has no websocket link");
            bus.update_status(ConnectionStatus::AccessDenied);
            return;
        };

        self.store_profile(&data);
        bus.update_status(ConnectionStatus::ReceivedRoom);

        if bus.is_destroyed() {
            return;
        }

        let collaborators = &self.inner.collaborators;
        let channel = (collaborators.channel)(websocket.as_str());
        bus.set_rt_connection(channel.clone());
        bus.set_monitor((collaborators.watcher)());
        bus.set_api(api);
        bus.set_rt_data(data.clone());

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.inner
            .timers
            .lock()
            .insert(TimerKind::ChannelPump, spawn_channel_pump(bus.clone(), events_rx));
        channel.start_session(events_tx);
        info!(websocket = %websocket, "Real-time channel started");

        self.keep_room_alive(&bus, &config);
        self.inner.timers.lock().insert(
            TimerKind::PollFallback,
            spawn_poll_fallback(
                bus.clone(),
                config.timings.poll_interval,
                config.timings.poll_max_ticks,
            ),
        );

        if let Some(broadcasts) = data.broadcasts {
            bus.emit(Event::BroadcastsUpdate { broadcasts });
        }
    }

    /// Attaches a media session to the confirmed channel
    ///
    /// Only valid after a `ready` connection status.
    #[instrument(skip(self))]
    pub fn join(&self, options: MediaOptions) -> Result<(), CoreError> {
        let bus = self.event_bus();

        let Some(channel) = bus.connection() else {
            error!(
                "Tried to join a session that is not yet available; \
                 wait for connection status ready before calling join"
            );
            return Err(CoreError::NotConnected);
        };

        if bus.session().is_some() {
            warn!("Join ignored, a session is already active");
            return Err(CoreError::AlreadyJoined);
        }

        let session = (self.inner.collaborators.session)(channel, options);
        if let Some(watcher) = bus.monitor() {
            session.set_monitor(watcher);
        }
        bus.set_session(ActiveSession::new(session.clone(), options));

        session.start();
        self.load_initial_infos(&bus);
        self.inner.timers.lock().cancel(TimerKind::Heartbeat);

        info!("Session joined");
        Ok(())
    }

    /// Connects and joins as soon as the connection reports `ready`
    #[instrument(skip(self, token))]
    pub async fn start(&self, token: &str, options: MediaOptions) {
        debug!("Starting");

        let own_id: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));
        let weak = Arc::downgrade(&self.inner);

        let join_on_ready = {
            let own_id = own_id.clone();
            move |event: &EventRecord| {
                if event.connection_status() != Some(ConnectionStatus::Ready) {
                    return;
                }
                let Some(id) = own_id.lock().take() else {
                    return;
                };
                let Some(inner) = weak.upgrade() else {
                    return;
                };

                let orchestrator = Orchestrator { inner };
                orchestrator.off_event(id);
                // join logs its own failures
                let _ = orchestrator.join(options);
            }
        };

        if let Some(id) = self.on_event(join_on_ready) {
            *own_id.lock() = Some(id);
        }

        self.connect(token).await;
    }

    /// Tears the current lifecycle down and leaves a fresh, empty bus behind
    #[instrument(skip(self))]
    pub fn destroy(&self) {
        debug!("Destroying");
        self.inner.timers.lock().cancel_all();
        self.inner.throttle.cancel();

        let old = std::mem::replace(&mut *self.inner.bus.write(), EventBus::new());
        old.destroy();

        *self.inner.profile.write() = Profile::default();
    }

    /// Publishes an application message to every listener
    pub fn send(&self, message: Value) -> usize {
        self.event_bus().send(EventRecord::client(message))
    }

    /// Like `send`, but at most once per throttle window, keeping the latest message
    pub fn throttled_send(&self, message: Value) {
        self.inner.throttle.submit(message);
    }

    /// Sends one keep-alive through the current channel, if any
    pub fn send_keep_alive(&self) -> bool {
        send_keep_alive(&self.event_bus())
    }

    fn keep_room_alive(&self, bus: &EventBus, config: &Config) {
        self.inner.timers.lock().insert(
            TimerKind::Heartbeat,
            spawn_heartbeat(bus.clone(), config.timings.heartbeat_interval),
        );
    }

    /// Replays already-known room data to listeners
    fn load_initial_infos(&self, bus: &EventBus) {
        if let Some(broadcasts) = bus.rt_data().and_then(|data| data.broadcasts) {
            bus.emit(Event::BroadcastsUpdate { broadcasts });
        }
    }

    fn store_profile(&self, data: &RoomResponse) {
        *self.inner.profile.write() = Profile {
            room: data.room.clone(),
            user: data.user.clone(),
            links: data.links.clone(),
        };
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::Acquire) == generation
    }

    /// Stops what a previous `connect` left running on the current bus
    fn end_previous_cycle(&self) {
        self.inner.timers.lock().cancel_all();
        self.event_bus().reset();
    }
}

/// Forwards channel messages into the bus until the channel drops its sender
fn spawn_channel_pump(
    bus: EventBus,
    mut events: mpsc::UnboundedReceiver<ChannelEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            bus.handle_channel_event(event);
        }
        debug!("Channel event stream ended");
    })
}
