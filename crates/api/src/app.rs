use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use domain::services::{EmailSettingStore, FeedbackStore};
use persistence::{EmailSettingRepository, FeedbackRepository};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin_key,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin, email, feedback, health, notify, printer, sendgrid, transactional};
use crate::services::{EmailRouter, EposHttpPrinter, WebSocketNotifier};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub settings: Arc<dyn EmailSettingStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub email: EmailRouter,
    pub epos_printer: Option<Arc<EposHttpPrinter>>,
    pub notifier: WebSocketNotifier,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(
        config: Config,
        settings: Arc<dyn EmailSettingStore>,
        feedback: Arc<dyn FeedbackStore>,
    ) -> Self {
        let config = Arc::new(config);
        let client = reqwest::Client::new();

        let epos_printer = match EposHttpPrinter::new(client.clone(), config.printer.epos_url.clone())
        {
            Ok(printer) => Some(Arc::new(printer)),
            Err(e) => {
                warn!(error = %e, "ePOS printing disabled");
                None
            }
        };

        Self {
            email: EmailRouter::new(settings.clone(), config.email.clone(), client.clone()),
            notifier: WebSocketNotifier::new(
                client,
                config.notifications.websocket_server_url.clone(),
            ),
            epos_printer,
            rate_limiter: RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new),
            settings,
            feedback,
            config,
        }
    }
}

/// Builds the application backed by Postgres.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let settings = Arc::new(EmailSettingRepository::new(pool.clone()));
    let feedback = Arc::new(FeedbackRepository::new(pool));
    create_app_with_state(AppState::new(config, settings, feedback))
}

pub fn create_app_with_state(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Operator routes (require X-Admin-Key when one is configured)
    let admin_routes = Router::new()
        .route("/api/admin/set-sendgrid-key", post(admin::set_sendgrid_key))
        .route(
            "/api/admin/email-settings",
            get(admin::get_email_settings).put(admin::update_email_settings),
        )
        .route("/api/admin/feedback", get(admin::list_feedback))
        .route("/api/email/send", post(email::send_email))
        .route("/api/sendgrid", post(sendgrid::sendgrid_action))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_key,
        ));

    // Public form endpoints (rate limited per client IP)
    let form_routes = Router::new()
        .route("/api/feedback", post(feedback::submit_feedback))
        .route(
            "/api/send-booking-confirmation",
            post(transactional::send_booking_confirmation),
        )
        .route(
            "/api/send-contact-notification",
            post(transactional::send_contact_notification),
        )
        .route(
            "/api/send-welcome-email",
            post(transactional::send_welcome_email),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Restaurant-internal integrations
    let integration_routes = Router::new()
        .route("/api/printer", post(printer::print_epos))
        .route("/api/printer/tcp", post(printer::print_tcp))
        .route("/api/websocket-notify", post(notify::websocket_notify));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(integration_routes)
        .merge(form_routes)
        .merge(admin_routes)
        .fallback(not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("No such endpoint".to_string())
}
