use parking_lot::Mutex;
use std::sync::Arc;

use roomcore::{
    Collaborators, Config, ConnectionStatus, ConnectionWatcher, EventRecord, ListenerId,
    MediaOptions, MediaSession, Orchestrator, RealtimeChannel, RoomClient, RoomResponse,
};

use super::mocks::{MockChannel, MockRoomClient, MockSession, MockWatcher, Step};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub orchestrator: Orchestrator,
    pub room_client: Arc<MockRoomClient>,
    /// (api, token) of every room client built
    pub client_requests: Arc<Mutex<Vec<(String, String)>>>,
    pub channels: Arc<Mutex<Vec<Arc<MockChannel>>>>,
    pub sessions: Arc<Mutex<Vec<Arc<MockSession>>>>,
    pub events: Arc<Mutex<Vec<EventRecord>>>,
    pub recorder_id: Option<ListenerId>,
}

impl TestSetup {
    /// Registers a fresh event recorder on the current bus
    pub fn record_events(&mut self) {
        let sink = self.events.clone();
        self.recorder_id = self
            .orchestrator
            .on_event(move |event: &EventRecord| sink.lock().push(event.clone()));
    }

    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| event.connection_status())
            .collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventRecord> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub fn channel(&self, index: usize) -> Arc<MockChannel> {
        self.channels.lock()[index].clone()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn session(&self, index: usize) -> Arc<MockSession> {
        self.sessions.lock()[index].clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }
}

pub struct TestSetupBuilder {
    script: Vec<Step>,
    config: Config,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            script: vec![Step::Respond(RoomResponse::pending("wss://x"))],
            config: Config::default(),
        }
    }

    pub fn with_script(mut self, script: Vec<Step>) -> Self {
        self.script = script;
        self
    }

    pub fn with_responses(self, responses: Vec<RoomResponse>) -> Self {
        self.with_script(responses.into_iter().map(Step::Respond).collect())
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestSetup {
        let room_client = MockRoomClient::new(self.script);
        let client_requests = Arc::new(Mutex::new(Vec::new()));
        let channels = Arc::new(Mutex::new(Vec::new()));
        let sessions = Arc::new(Mutex::new(Vec::new()));

        let collaborators = {
            let room_client = room_client.clone();
            let client_requests = client_requests.clone();
            let channels = channels.clone();
            let sessions = sessions.clone();

            Collaborators::new(
                Arc::new(move |api: &str, token: &str| {
                    client_requests
                        .lock()
                        .push((api.to_string(), token.to_string()));
                    room_client.clone() as Arc<dyn RoomClient>
                }),
                Arc::new(move |url: &str| {
                    let channel = MockChannel::new(url);
                    channels.lock().push(channel.clone());
                    channel as Arc<dyn RealtimeChannel>
                }),
                Arc::new(|| Arc::new(MockWatcher) as Arc<dyn ConnectionWatcher>),
                Arc::new(
                    move |channel: Arc<dyn RealtimeChannel>, options: MediaOptions| {
                        let session = MockSession::new(options, &channel);
                        sessions.lock().push(session.clone());
                        session as Arc<dyn MediaSession>
                    },
                ),
            )
        };

        let mut setup = TestSetup {
            orchestrator: Orchestrator::with_config(collaborators, self.config),
            room_client,
            client_requests,
            channels,
            sessions,
            events: Arc::new(Mutex::new(Vec::new())),
            recorder_id: None,
        };
        setup.record_events();
        setup
    }
}
