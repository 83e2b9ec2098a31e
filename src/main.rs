//! Trip Tracker service entry point.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use trip_tracker::adapters::events::{RedisEventConsumer, RedisEventPublisher};
use trip_tracker::adapters::http::{health_router, tracking_routes, TrackingHandlers};
use trip_tracker::adapters::postgres::PostgresTripTrackRepository;
use trip_tracker::adapters::websocket::{websocket_router, BroadcastHub, WebSocketState};
use trip_tracker::application::{ExportRouteHandler, GetTrackingHandler, TrackingEventRouter};
use trip_tracker::config::{AppConfig, ServerConfig};
use trip_tracker::ports::{EventHandler, TripTrackRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        addr = %config.server.socket_addr()?,
        "Starting trip tracker"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }
    let repository: Arc<dyn TripTrackRepository> =
        Arc::new(PostgresTripTrackRepository::new(pool.clone()));

    let redis = redis::Client::open(config.redis.url.as_str())?;
    let publisher = tokio::time::timeout(
        config.redis.connect_timeout(),
        RedisEventPublisher::connect(&redis, config.tracking.tracking_events_channel.clone()),
    )
    .await
    .map_err(|_| "Timed out connecting to Redis")??;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (hub, hub_handle) = BroadcastHub::new(config.tracking.hub_config());
    let hub_task = tokio::spawn(hub.run(shutdown_rx.clone()));

    let router: Arc<dyn EventHandler> = Arc::new(TrackingEventRouter::new(
        repository.clone(),
        Arc::new(publisher),
        Arc::new(hub_handle.clone()),
    ));
    let consumer = RedisEventConsumer::new(redis, config.tracking.inbound_channels(), router);
    let consumer_shutdown = shutdown_rx.clone();
    let consumer_task = tokio::spawn(async move {
        match consumer.run(consumer_shutdown).await {
            Ok(report) => tracing::info!(
                received = report.received,
                malformed = report.malformed,
                failed = report.failed,
                "Event consumer stopped"
            ),
            Err(e) => tracing::error!(error = %e, "Event consumer failed"),
        }
    });

    let tracking = TrackingHandlers::new(
        Arc::new(GetTrackingHandler::new(repository.clone())),
        Arc::new(ExportRouteHandler::new(repository)),
    );
    let api = Router::new()
        .nest("/api/v1/tracking", tracking_routes(tracking))
        .layer(TimeoutLayer::new(config.server.request_timeout()));
    let app = Router::new()
        .merge(api)
        .merge(health_router(hub_handle.clone()))
        .merge(websocket_router(WebSocketState::new(
            hub_handle,
            config.tracking.connection_settings(),
        )))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()?).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    let mut server_shutdown = shutdown_rx;
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    if let Err(e) = consumer_task.await {
        tracing::error!(error = %e, "Event consumer task panicked");
    }
    if let Err(e) = hub_task.await {
        tracing::error!(error = %e, "Broadcast hub task panicked");
    }
    pool.close().await;

    tracing::info!("Trip tracker stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
