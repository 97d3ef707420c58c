use roomcore::{
    realtime::{LoggingChannel, NoOpWatcher},
    Collaborators, Config, ConnectionWatcher, EventRecord, HttpRoomClient, MediaOptions,
    MediaSession, Orchestrator, RealtimeChannel,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Session stand-in: this binary checks room access and readiness only
struct DryRunSession {
    options: MediaOptions,
}

impl MediaSession for DryRunSession {
    fn set_monitor(&self, watcher: Arc<dyn ConnectionWatcher>) {
        info!(watcher = watcher.name(), "Session monitor attached");
    }

    fn start(&self) {
        info!(audio = self.options.audio, video = self.options.video, "Session started (dry run)");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomcore=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(token) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ROOMCORE_TOKEN").ok())
    else {
        error!("Usage: roomcore <access-token> (or set ROOMCORE_TOKEN)");
        std::process::exit(2);
    };

    let config = Config::from_env();
    info!(api = %config.api, "Starting room orchestrator");

    let collaborators = Collaborators::new(
        HttpRoomClient::factory(),
        LoggingChannel::factory(),
        NoOpWatcher::factory(),
        Arc::new(|_channel: Arc<dyn RealtimeChannel>, options: MediaOptions| {
            Arc::new(DryRunSession { options }) as Arc<dyn MediaSession>
        }),
    );
    let orchestrator = Orchestrator::with_config(collaborators, config);

    orchestrator.on_event(|event: &EventRecord| match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => error!(error = %e, "Failed to serialize event"),
    });

    orchestrator.start(&token, MediaOptions::default()).await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Shutting down");
    orchestrator.destroy();
}
