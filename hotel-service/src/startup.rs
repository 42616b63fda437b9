//! Application startup and lifecycle management.

use crate::config::HotelConfig;
use crate::handlers::{agents, auth, content, customers, health, invoices, reservations, rooms, stats};
use crate::middleware::{auth_middleware, optional_auth_middleware};
use crate::services::{init_metrics, Database, JwtService};
use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware};
use service_core::middleware::security_headers::security_headers_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: HotelConfig,
    pub db: Arc<Database>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(config: HotelConfig, db: Database) -> Self {
        let jwt = Arc::new(JwtService::new(&config.jwt));
        Self {
            config,
            db: Arc::new(db),
            jwt,
        }
    }
}

/// Routes open to visitors. A valid token, when sent, unlocks the staff views
/// and the root-only mutations living on the same paths.
fn public_routes(state: &AppState) -> Router<AppState> {
    let limits = &state.config.rate_limit;
    let login_limiter = create_ip_rate_limiter(limits.login_attempts, limits.login_window_seconds);
    let contact_limiter =
        create_ip_rate_limiter(limits.contact_submissions, limits.contact_window_seconds);

    let login = post(auth::login).layer(middleware::from_fn_with_state(
        login_limiter,
        ip_rate_limit_middleware,
    ));
    let contact_form = post(content::create_contact).layer(middleware::from_fn_with_state(
        contact_limiter,
        ip_rate_limit_middleware,
    ));

    Router::new()
        .route("/api/auth/login", login)
        .route("/api/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/api/rooms/:room_id",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route("/api/faqs", get(content::list_faqs).post(content::create_faq))
        .route(
            "/api/faqs/:faq_id",
            axum::routing::put(content::update_faq).delete(content::delete_faq),
        )
        .route("/api/blogs", get(content::list_blogs).post(content::create_blog))
        // GET takes a slug, PUT/DELETE take the blog id
        .route(
            "/api/blogs/:blog",
            get(content::get_blog)
                .put(content::update_blog)
                .delete(content::delete_blog),
        )
        .route("/api/contacts", contact_form.get(content::list_contacts))
        .route("/api/contacts/:contact_id/read", post(content::mark_contact_read))
        .route(
            "/api/contacts/:contact_id",
            axum::routing::delete(content::delete_contact),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
}

/// Back-office routes; every request needs a bearer token.
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/api/customers/:customer_id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/api/agents", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/api/agents/:agent_id",
            get(agents::get_agent)
                .put(agents::update_agent)
                .delete(agents::delete_agent),
        )
        .route(
            "/api/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/api/reservations/cancel",
            post(reservations::cancel_reservations),
        )
        .route(
            "/api/reservations/:reservation_id",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route(
            "/api/reservations/:reservation_id/finish",
            post(reservations::finish_reservation),
        )
        .route("/api/invoices", get(invoices::list_invoices))
        .route("/api/invoices/validate", post(invoices::validate_invoices))
        .route("/api/invoices/cancel", post(invoices::cancel_invoices))
        .route("/api/invoices/:invoice_id", get(invoices::get_invoice))
        .route("/api/payments", get(invoices::list_payments))
        .route("/api/stats", get(stats::get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}

/// Full HTTP router with shared middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_handler))
        .merge(public_routes(&state))
        .merge(protected_routes(&state))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id
                )
            }),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: HotelConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    /// Use this in tests when migrations are already applied by the test harness.
    pub async fn build_without_migrations(config: HotelConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(config: HotelConfig, run_migrations: bool) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
        }

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Hotel service listener bound");

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, db),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "hotel-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(
            self.listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
