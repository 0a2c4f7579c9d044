//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: which adapters back the storage and mail ports
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::{Extension, Router};
use tower_http::cors::{Any, CorsLayer};

use farmstand_auth::{Hs256TokenCodec, TokenCodec};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(
    services: Arc<services::AppServices>,
    jwt_secret: &str,
    frontend_origin: Option<&str>,
) -> Router {
    let tokens: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        tokens: tokens.clone(),
    };

    // Admin routes sit behind both the auth and the role check.
    let admin = routes::admin::router()
        .layer(axum::middleware::from_fn(middleware::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::auth_middleware,
        ));

    let authed = routes::authed_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let cors = match frontend_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
            )
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    };

    routes::public_router()
        .merge(authed)
        .nest("/api/admin", admin)
        .layer(Extension(services))
        .layer(Extension(tokens))
        .layer(cors)
}
