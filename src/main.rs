//! Game registry binary entrypoint wiring the REST layer to the configured storage backend.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use game_registry_back::{
    config::{AppConfig, StorageKind},
    dao::registry_store::MemoryRegistryStore,
    routes,
    services::password::PasswordScheme,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let passwords =
        PasswordScheme::new(config.password_hashing).context("configuring password hashing")?;
    let app_state = AppState::new(passwords);

    match config.storage {
        StorageKind::Memory => {
            warn!("using in-memory storage; registrations and saves are lost on restart");
            app_state
                .install_registry_store(Arc::new(MemoryRegistryStore::new()))
                .await;
        }
        StorageKind::Mongo => spawn_mongo_supervisor(&app_state, &config)?,
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Keep a MongoDB backend installed in the background, retrying while it is unreachable.
#[cfg(feature = "mongo-store")]
fn spawn_mongo_supervisor(state: &SharedState, config: &AppConfig) -> anyhow::Result<()> {
    use game_registry_back::{
        dao::{
            registry_store::{
                RegistryStore,
                mongodb::{MongoConfig, MongoRegistryStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let uri = config.mongo_uri.clone();
    let db_name = config.mongo_db.clone();

    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let uri = uri.clone();
        let db_name = db_name.clone();
        async move {
            let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
            let store = MongoRegistryStore::connect(config).await?;
            Ok::<Arc<dyn RegistryStore>, StorageError>(Arc::new(store))
        }
    }));

    Ok(())
}

#[cfg(not(feature = "mongo-store"))]
fn spawn_mongo_supervisor(_state: &SharedState, _config: &AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("MongoDB storage requested but the `mongo-store` feature is disabled")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
