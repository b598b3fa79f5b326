mod error;
mod service;

use std::sync::Arc;

use abi::Config;
use axum::{
    routing::{get, patch, post},
    Router,
};
use booking::BookingManager;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use error::ApiError;

pub struct BookingService {
    manager: BookingManager,
}

type AppState = Arc<BookingService>;

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            manager: BookingManager::new(pool),
        }
    }

    pub fn with_manager(manager: BookingManager) -> Self {
        Self { manager }
    }
}

pub fn app(svc: BookingService) -> Router {
    let bookings = Router::<AppState>::new()
        .route(
            "/",
            post(service::create_booking).get(service::list_bookings),
        )
        .route("/check-availability", get(service::check_availability))
        .route("/property/:property_id", get(service::list_by_property))
        .route("/traveller/:traveller_id", get(service::list_by_traveller))
        .route("/:id", get(service::get_booking))
        .route("/:id/status", patch(service::update_status))
        .route("/:id/check-in", patch(service::check_in))
        .route("/:id/check-out", patch(service::check_out));

    Router::new()
        .route("/health", get(service::health))
        .nest("/api/bookings", bookings)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(svc))
}

pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections)
        .connect(&config.db.url())
        .await?;
    info!(
        "connected to postgres at {}:{}/{}",
        config.db.host, config.db.port, config.db.dbname
    );

    sqlx::migrate!("../migrations").run(&pool).await?;

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app(BookingService::new(pool.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
        info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!("failed to install terminate handler: {e}");
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
