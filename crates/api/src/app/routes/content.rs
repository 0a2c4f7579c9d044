use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use farmstand_core::PostId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.posts.list_posts().await {
        Ok(posts) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "posts": posts.iter().map(dto::post_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.posts.get_post(id).await {
        Ok(post) => (StatusCode::OK, Json(dto::post_to_json(&post))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_messages(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.messages.list_messages().await {
        Ok(messages) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "messages": messages.iter().map(dto::message_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
