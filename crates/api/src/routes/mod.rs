//! HTTP route handlers and router assembly.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                             - Liveness check
//! GET    /health/ready                       - Readiness check (database)
//! GET    /api/ping                           - Ping
//!
//! # Auth
//! POST   /api/auth/signup                    - Register, returns user + token
//! POST   /api/auth/login                     - Login, returns user + token
//! GET    /api/auth/me                        - Current user (bearer)
//!
//! # Stores (bearer)
//! POST   /api/stores                         - Create store
//! PUT    /api/stores/{id}                    - Partial update (owner only)
//! DELETE /api/stores/{id}                    - Delete (owner only)
//!
//! # Proxies (bearer)
//! POST   /api/ai/generate                    - AI text completion
//! POST   /api/payments/intents               - Create payment intent
//! POST   /api/payments/intents/{id}/confirm  - Confirm payment intent
//! ```

pub mod ai;
pub mod auth;
pub mod health;
pub mod payments;
pub mod stores;

use std::any::Any;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(stores::create))
        .route("/{id}", put(stores::update).delete(stores::delete))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/intents", post(payments::create_intent))
        .route("/intents/{id}/confirm", post(payments::confirm_intent))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(health::ping))
        .nest("/auth", auth_routes())
        .nest("/stores", store_routes())
        .route("/ai/generate", post(ai::generate))
        .nest("/payments", payment_routes())
}

/// Build the complete application with all middleware.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_origin.as_deref());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("ignoring invalid CORS origin, cross-origin requests disabled");
            layer
        }
        None => layer.allow_origin(AnyOrigin),
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_owned())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
