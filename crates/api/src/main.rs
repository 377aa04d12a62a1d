use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roofdesk_api::config::ServerConfig;
use roofdesk_api::notifications::NotificationDispatcher;
use roofdesk_api::router::build_app_router;
use roofdesk_api::state::AppState;
use roofdesk_events::{EmailConfig, EmailDelivery, EventBus};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roofdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = roofdesk_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    roofdesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    roofdesk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus + notification dispatcher ---
    let event_bus = Arc::new(EventBus::default());

    let email = EmailConfig::from_env().map(EmailDelivery::new);
    if email.is_none() {
        tracing::info!("SMTP_HOST not set, notification emails disabled");
    }
    let dispatcher = NotificationDispatcher::new(pool.clone(), email);
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));
    tracing::info!("Notification dispatcher started");

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and its state clone of the bus) is gone once serve
    // returns; dropping the last sender closes the channel and lets the
    // dispatcher drain what is buffered.
    drop(event_bus);
    if tokio::time::timeout(shutdown_timeout, dispatcher_handle)
        .await
        .is_err()
    {
        tracing::warn!("Notification dispatcher did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
