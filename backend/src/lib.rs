pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Builds the application router with the shared response-header pipeline:
/// CORS, cache policy by path class, CSP, and the generic security headers,
/// each applied after the route handler runs.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/signin", post(handlers::auth::signin))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/signout", post(handlers::auth::signout))
        .route("/api/contact", post(handlers::contact::submit))
        .route("/api/turnstile/sitekey", get(handlers::turnstile::sitekey))
        .route("/api/turnstile/verify", post(handlers::turnstile::verify))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                )
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(axum_middleware::from_fn(middleware::cache_policy))
                .layer(axum_middleware::from_fn(middleware::csp))
                .layer(axum_middleware::from_fn(middleware::security_headers)),
        )
        .with_state(state)
}
