use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use detailbook::config::AppConfig;
use detailbook::db;
use detailbook::handlers;
use detailbook::services::notify::{NoopNotifier, NotificationSink, WebhookNotifier};
use detailbook::services::payments::stripe::StripeProvider;
use detailbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.stripe_secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY not set, payments run in dev mode");
    }
    let payments = StripeProvider::new(config.stripe_secret_key.clone());

    let notifier: Box<dyn NotificationSink> = if config.notify_webhook_url.is_empty() {
        tracing::info!("no notification webhook configured, using noop notifier");
        Box::new(NoopNotifier)
    } else {
        tracing::info!(url = %config.notify_webhook_url, "notifications via webhook");
        Box::new(WebhookNotifier::new(config.notify_webhook_url.clone()))
    };

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        payments: Box::new(payments),
        notifier,
        events_tx,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/services", get(handlers::catalog::list_services))
        .route("/api/quote", post(handlers::catalog::quote))
        .route(
            "/api/availability",
            get(handlers::availability::get_availability),
        )
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/payments/intent",
            post(handlers::payments::create_intent),
        )
        .route("/webhook/payments", post(handlers::webhook::payment_webhook))
        .route("/api/admin/status", get(handlers::admin::get_status))
        .route(
            "/api/admin/appointments",
            get(handlers::admin::get_appointments),
        )
        .route(
            "/api/admin/appointments/:id/status",
            post(handlers::admin::update_status),
        )
        .route("/api/admin/blocked", get(handlers::admin::get_blocked))
        .route("/api/admin/block", post(handlers::admin::block_slot))
        .route("/api/admin/unblock", post(handlers::admin::unblock_slot))
        .route("/api/admin/events", get(handlers::events::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
