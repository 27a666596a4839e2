use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use trip_bot::bot::Controller;
use trip_bot::cache::CachedScheduleProvider;
use trip_bot::channel::{LogChannel, MessageChannel, SerializedChannel, WebhookChannel};
use trip_bot::config::{AppConfig, ScheduleSource};
use trip_bot::dispatch::Dispatcher;
use trip_bot::provider::{MockScheduleProvider, ScheduleClient, ScheduleProvider};
use trip_bot::schedule::ScheduleQuery;
use trip_bot::session::SessionStore;
use trip_bot::stations::StationDirectory;
use trip_bot::store::MemoryStore;
use trip_bot::trips::TripService;
use trip_bot::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    // Schedule provider
    let provider: Arc<dyn ScheduleProvider> = match config.schedule.clone() {
        ScheduleSource::Mock => {
            tracing::info!("using generated hourly timetable");
            Arc::new(MockScheduleProvider::hourly(config.utc_offset))
        }
        ScheduleSource::Remote(provider_config) => {
            let client =
                ScheduleClient::new(provider_config).expect("Failed to create schedule client");
            Arc::new(CachedScheduleProvider::new(client, &config.cache))
        }
    };

    // Delivery channel
    let channel: Arc<dyn MessageChannel> = match config.webhook.clone() {
        Some(webhook) => {
            tracing::info!(url = %webhook.url, "delivering through webhook");
            Arc::new(WebhookChannel::new(webhook).expect("Failed to create webhook channel"))
        }
        None => {
            tracing::info!("DELIVERY_WEBHOOK_URL not set; deliveries are logged only");
            Arc::new(LogChannel::new())
        }
    };
    let channel = SerializedChannel::shared(channel);

    let store = Arc::new(MemoryStore::new());
    let stations = Arc::new(StationDirectory::builtin());
    tracing::info!(stations = stations.len(), "station catalog loaded");

    let trips = TripService::new(store.clone(), store.clone(), store.clone(), stations.clone());
    let controller = Controller::new(
        SessionStore::new(&config.sessions),
        stations.clone(),
        ScheduleQuery::new(provider, config.utc_offset),
        trips,
    );

    // Reminder pollers
    let cancel = CancellationToken::new();
    let dispatcher = Arc::new(Dispatcher::new(
        store.clone(),
        store.clone(),
        channel.clone(),
        config.dispatch.clone(),
    ));
    let pollers = dispatcher.spawn(config.pollers, cancel.clone());

    let app = create_router(AppState::new(controller, stations, channel));

    let addr = config.server.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "trip bot listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
    }

    cancel.cancel();
    for poller in pollers {
        if let Err(e) = poller.await {
            tracing::error!(error = %e, "reminder poller panicked");
        }
    }
    tracing::info!("shut down");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
