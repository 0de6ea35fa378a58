//! boxoffice server entry point.
//!
//! Starts the Axum HTTP server and the background waitlist expiry sweep.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::Router;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use boxoffice::api;
use boxoffice::app_state::AppState;
use boxoffice::config::BoxofficeConfig;
use boxoffice::domain::{
    BookingStore, CapacityLedger, NotificationLog, UserDirectory, WaitlistStore,
};
use boxoffice::mail::{LogMailTransport, MailTransport};
use boxoffice::persistence::{PostgresArchive, RecordArchive};
use boxoffice::service::{BookingService, NotifyService, WaitlistService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = BoxofficeConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting boxoffice");

    // Optional durable record archive
    let archive: Option<Arc<dyn RecordArchive>> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;
        tracing::info!("record archive connected");
        Some(Arc::new(PostgresArchive::new(pool)))
    } else {
        None
    };

    // Build domain layer
    let ledger = Arc::new(CapacityLedger::new());
    let bookings = Arc::new(BookingStore::new());
    let waitlist_store = Arc::new(WaitlistStore::new(Duration::hours(
        config.waitlist_expiry_hours,
    )));
    let log = Arc::new(NotificationLog::new());
    let users = Arc::new(UserDirectory::new());
    let mail: Arc<dyn MailTransport> = Arc::new(LogMailTransport);

    // Build service layer
    let waitlist_service = Arc::new(WaitlistService::new(
        Arc::clone(&ledger),
        waitlist_store,
        Arc::clone(&users),
        Arc::clone(&mail),
    ));
    let booking_service = Arc::new(BookingService::new(
        Arc::clone(&ledger),
        Arc::clone(&bookings),
        Arc::clone(&waitlist_service),
        archive.clone(),
        config.max_tickets_per_booking,
    ));
    let notify_service = Arc::new(NotifyService::new(
        Arc::clone(&users),
        bookings,
        log,
        mail,
        archive,
        Duration::minutes(config.dedup_window_mins),
        config.mail_max_in_flight,
    ));

    // Background expiry sweep
    let sweeper = Arc::clone(&waitlist_service);
    let sweep_interval = StdDuration::from_secs(config.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let expired = sweeper.sweep_expired().await;
            if expired > 0 {
                tracing::info!(expired, "waitlist sweep expired entries");
            }
        }
    });

    // Build application state
    let app_state = AppState {
        booking_service,
        waitlist_service,
        notify_service,
        users,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
