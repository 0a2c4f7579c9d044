use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod auth;
pub mod content;
pub mod items;
pub mod system;

/// Routes that need no session.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/items", get(items::list_items))
        .route("/api/posts", get(content::list_posts))
        .route("/api/posts/:id", get(content::get_post))
        .route("/api/messages", get(content::list_messages))
        .route("/api/auth", post(auth::request_code))
        .route("/api/auth/verify", post(auth::verify_code))
        .route("/api/auth/logout", post(auth::logout))
}

/// Routes for any authenticated user.
pub fn authed_router() -> Router {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/items/claim", post(items::claim_item))
}
