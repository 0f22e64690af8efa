use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;

use pricesentry::{
    config::{self, ChannelClassifier, ServerConfig, StoreBackend},
    error::BoxError,
    routes,
    services::{
        alert_lifecycle::AlertLifecycle,
        cancel_registry::CancellationRegistry,
        db_init,
        memory_store::MemoryStore,
        mongo_store::MongoStore,
        server_channels::ServerChannels,
        store::{AlertStore, ChannelStore},
    },
    AppState,
};

async fn open_stores(
    settings: &config::Settings,
) -> Result<(Arc<dyn AlertStore>, Arc<dyn ChannelStore>), BoxError> {
    match settings.store_backend {
        StoreBackend::Mongo => {
            let client = Client::with_uri_str(&settings.mongodb_uri).await?;
            let db = client.database(&settings.mongodb_db);
            db_init::ensure_indexes(&db).await?;

            let store = Arc::new(MongoStore::new(db));
            let alerts: Arc<dyn AlertStore> = store.clone();
            let channels: Arc<dyn ChannelStore> = store;
            Ok((alerts, channels))
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store, alerts will not survive a restart");
            let store = Arc::new(MemoryStore::new());
            let alerts: Arc<dyn AlertStore> = store.clone();
            let channels: Arc<dyn ChannelStore> = store;
            Ok((alerts, channels))
        }
    }
}

async fn bootstrap_guild(state: &AppState, server: &ServerConfig) -> Result<(), BoxError> {
    let outcome = state
        .channels
        .initialise_server(&server.id, &server.alert_role, &server.channels.eod)
        .await?;
    tracing::info!("guild {} channel config: {:?}", server.id, outcome);

    for alerter in &server.channels.alerters {
        state
            .channels
            .create_alerter(&server.id, &alerter.channel_id, &alerter.user_id, &alerter.role_id)
            .await?;
    }

    let orphans = state.alerts.refresh(&server.id).await?;
    for alert in &orphans {
        tracing::info!("guild {}: {} {} needs a watcher", server.id, alert.class, alert.alert_id);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let servers = match &settings.servers_config {
        Some(path) => config::load_servers(path)?,
        None => {
            tracing::warn!("SERVERS_CONFIG not set, no guilds configured");
            Vec::new()
        }
    };

    let (alert_store, channel_store) = open_stores(&settings).await?;
    let registry = Arc::new(CancellationRegistry::new());

    let state = AppState {
        settings: settings.clone(),
        alerts: Arc::new(AlertLifecycle::new(alert_store, registry)),
        channels: Arc::new(ServerChannels::new(channel_store)),
        classifier: Arc::new(ChannelClassifier::new(&servers)),
    };

    for server in &servers {
        bootstrap_guild(&state, server).await?;
    }

    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
