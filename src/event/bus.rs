use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::events::{ConnectionStatus, Event, EventRecord, WARNING_REALTIME};
use super::listener::{EventListener, ListenerId};
use crate::realtime::{ChannelEvent, ConnectionWatcher, RealtimeChannel};
use crate::room::{RoomClient, RoomResponse};
use crate::session::ActiveSession;

/// Mutable collaborator slots of one connection lifecycle
#[derive(Default)]
struct Slots {
    /// Channel opened after the room fetch, not yet confirmed
    rt_connection: Option<Arc<dyn RealtimeChannel>>,
    /// Channel confirmed by a readiness signal
    connection: Option<Arc<dyn RealtimeChannel>>,
    monitor: Option<Arc<dyn ConnectionWatcher>>,
    session: Option<ActiveSession>,
    api: Option<Arc<dyn RoomClient>>,
    /// Last known room data, replayed on join
    rt_data: Option<RoomResponse>,
    ready_emitted: bool,
}

struct BusInner {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn EventListener>)>>,
    slots: Mutex<Slots>,
    broadcaster: broadcast::Sender<EventRecord>,
    destroyed: AtomicBool,
}

/// Event bus mediating everything that happens during a connection lifecycle
///
/// Listeners are called synchronously, in registration order, on the task
/// that publishes. No lock is held while a listener runs.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates a new event bus with the default broadcast capacity
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus whose async subscribers may lag `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcaster, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(BusInner {
                listeners: Mutex::new(Vec::new()),
                slots: Mutex::new(Slots::default()),
                broadcaster,
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    /// Registers a listener; ignored (with an error log) once the bus is destroyed
    pub fn on_receive(&self, listener: Arc<dyn EventListener>) -> Option<ListenerId> {
        if self.is_destroyed() {
            error!("Tried to register a listener on a destroyed event bus");
            return None;
        }

        let id = ListenerId::new();
        self.inner.listeners.lock().push((id, listener));
        debug!(listener_id = %id, "Listener registered");
        Some(id)
    }

    /// Unregisters a listener; returns whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        let removed = listeners.len() != before;
        debug!(listener_id = %id, removed, "Listener removed");
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Subscribe to a copy of every record published on this bus
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.inner.broadcaster.subscribe()
    }

    /// Publishes a record to every listener; returns how many were called
    pub fn send(&self, record: EventRecord) -> usize {
        if self.is_destroyed() {
            debug!(event_type = record.event_type(), "Event dropped on destroyed bus");
            return 0;
        }

        let _ = self.inner.broadcaster.send(record.clone());

        let listeners: Vec<Arc<dyn EventListener>> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        debug!(
            event_type = record.event_type(),
            listeners = listeners.len(),
            "Event emitted"
        );

        for listener in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener.on_event(&record))).is_err() {
                error!(event_type = record.event_type(), "Event listener panicked");
            }
        }

        if let Event::RoomReady { content } = &record.event {
            self.confirm_ready(content);
        }

        listeners.len()
    }

    /// Publishes an internally generated event
    pub fn emit(&self, event: Event) -> usize {
        self.send(EventRecord::internal(event))
    }

    pub fn update_status(&self, status: ConnectionStatus) -> usize {
        info!(status = %status, "Connection status changed");
        self.emit(Event::connection(status))
    }

    /// Routes a message pushed by the real-time channel
    pub fn handle_channel_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Opened => {
                info!("Real-time channel opened");
            }
            ChannelEvent::RoomReady(content) => {
                debug!("Room ready pushed by channel");
                self.emit(Event::RoomReady { content });
            }
            ChannelEvent::BroadcastsUpdate(broadcasts) => {
                if let Some(data) = self.inner.slots.lock().rt_data.as_mut() {
                    data.broadcasts = Some(broadcasts.clone());
                }
                self.emit(Event::BroadcastsUpdate { broadcasts });
            }
            ChannelEvent::Closed => {
                warn!("Real-time channel closed");
                {
                    // a later readiness signal may confirm the channel again
                    let mut slots = self.inner.slots.lock();
                    slots.connection = None;
                    slots.ready_emitted = false;
                }
                self.emit(Event::warning(WARNING_REALTIME));
            }
        }
    }

    /// Promotes the pending channel to the live one, once per bus
    fn confirm_ready(&self, content: &RoomResponse) {
        {
            let mut slots = self.inner.slots.lock();

            if slots.ready_emitted {
                debug!("Duplicate readiness signal ignored");
                return;
            }

            let Some(channel) = slots.rt_connection.clone() else {
                warn!("Readiness signalled before a channel was opened");
                return;
            };

            let mut data = content.clone();
            if data.broadcasts.is_none() {
                data.broadcasts = slots.rt_data.as_ref().and_then(|d| d.broadcasts.clone());
            }

            slots.connection = Some(channel);
            slots.rt_data = Some(data);
            slots.ready_emitted = true;
        }

        self.update_status(ConnectionStatus::Ready);
    }

    pub fn set_rt_connection(&self, channel: Arc<dyn RealtimeChannel>) {
        self.inner.slots.lock().rt_connection = Some(channel);
    }

    pub fn rt_connection(&self) -> Option<Arc<dyn RealtimeChannel>> {
        self.inner.slots.lock().rt_connection.clone()
    }

    /// The confirmed channel; present only after a readiness signal
    pub fn connection(&self) -> Option<Arc<dyn RealtimeChannel>> {
        self.inner.slots.lock().connection.clone()
    }

    pub fn set_monitor(&self, watcher: Arc<dyn ConnectionWatcher>) {
        self.inner.slots.lock().monitor = Some(watcher);
    }

    pub fn monitor(&self) -> Option<Arc<dyn ConnectionWatcher>> {
        self.inner.slots.lock().monitor.clone()
    }

    pub fn set_session(&self, session: ActiveSession) {
        self.inner.slots.lock().session = Some(session);
    }

    pub fn session(&self) -> Option<ActiveSession> {
        self.inner.slots.lock().session.clone()
    }

    pub fn set_api(&self, api: Arc<dyn RoomClient>) {
        self.inner.slots.lock().api = Some(api);
    }

    pub fn api(&self) -> Option<Arc<dyn RoomClient>> {
        self.inner.slots.lock().api.clone()
    }

    pub fn set_rt_data(&self, data: RoomResponse) {
        self.inner.slots.lock().rt_data = Some(data);
    }

    pub fn rt_data(&self) -> Option<RoomResponse> {
        self.inner.slots.lock().rt_data.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }

    /// Clears the collaborators of a previous connect but keeps the listeners
    pub fn reset(&self) {
        let slots = std::mem::take(&mut *self.inner.slots.lock());

        if let Some(active) = slots.session {
            debug!("Destroying session of previous connection");
            active.session.destroy();
        }
    }

    /// Drops every listener and collaborator; later sends reach nobody
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.inner.listeners.lock().clear();
        let slots = std::mem::take(&mut *self.inner.slots.lock());

        if let Some(active) = slots.session {
            active.session.destroy();
        }

        info!("Event bus destroyed");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
