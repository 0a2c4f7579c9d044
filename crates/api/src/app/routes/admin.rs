use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::Utc;

use farmstand_content::{Block, BlockKind, Message, Post};
use farmstand_core::{ClaimId, DomainError, ItemId, MessageId, PostId, UserId};
use farmstand_infra::{ItemUpdate, NewItem, NewUser, UserUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items/create", post(create_item))
        .route("/items/update", post(update_item))
        .route("/items/remove", post(remove_item))
        .route("/claims", get(list_claims))
        .route("/claims/create", post(create_claim))
        .route("/claims/remove", post(remove_claim))
        .route("/users", get(list_users))
        .route("/users/create", post(create_user))
        .route("/users/update", post(update_user))
        .route("/users/remove", post(remove_user))
        .route("/posts", post(create_post))
        .route("/posts/:id/edit", post(edit_post))
        .route("/messages", post(create_message))
        .route("/messages/:id", delete(delete_message))
        .route("/email", post(broadcast_email))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemBody>,
) -> axum::response::Response {
    let new = NewItem {
        name: body.name,
        description: body.description,
        photo_path: body.photo_path,
        total_quantity: body.total_quantity,
    };

    match services.ledger.create_item(new).await {
        Ok(item) => (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::UpdateItemBody>,
) -> axum::response::Response {
    let id: ItemId = match body.id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let update = ItemUpdate {
        id,
        name: body.name,
        description: body.description,
        photo_path: body.photo_path,
        total_quantity: body.total_quantity,
    };

    match services.ledger.update_item(update).await {
        Ok(item) => (StatusCode::OK, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RemoveItemBody>,
) -> axum::response::Response {
    let id: ItemId = match body.id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.deactivate_item(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "removed" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_claims(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger.list_active_claims().await {
        Ok(claims) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "claims": claims
                    .iter()
                    .map(|v| dto::claim_to_json(&v.claim, &v.item_name))
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Claim on a user's behalf. Goes through the same stock check as a
/// customer claim.
pub async fn create_claim(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AdminClaimBody>,
) -> axum::response::Response {
    let item_id: ItemId = match body.item_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let user_id: UserId = match body.user_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.users.find_by_id(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::domain_error_to_response(DomainError::NotFound),
        Err(e) => return errors::domain_error_to_response(e),
    }

    let claim = match services
        .ledger
        .create_claim(item_id, user_id, body.amount)
        .await
    {
        Ok(claim) => claim,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let item_name = services
        .ledger
        .get_item(item_id)
        .await
        .map(|i| i.name)
        .unwrap_or_default();

    (
        StatusCode::CREATED,
        Json(dto::claim_to_json(&claim, &item_name)),
    )
        .into_response()
}

pub async fn remove_claim(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RemoveClaimBody>,
) -> axum::response::Response {
    let id: ClaimId = match body.id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.reverse_claim(id).await {
        Ok(claim) => (StatusCode::OK, Json(dto::claim_to_json(&claim, ""))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.users.list_users().await {
        Ok(users) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "users": users.iter().map(dto::user_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateUserBody>,
) -> axum::response::Response {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid email");
    }

    let new = NewUser {
        name: body.name,
        email,
        phone: body.phone,
    };

    match services.users.create_user(new).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::UpdateUserBody>,
) -> axum::response::Response {
    let id: UserId = match body.id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let update = UserUpdate {
        id,
        name: body.name,
        email: body.email.trim().to_lowercase(),
        phone: body.phone,
        admin: body.admin,
    };

    match services.users.update_user(update).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RemoveUserBody>,
) -> axum::response::Response {
    let id: UserId = match body.id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.users.remove_user(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "removed" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn parse_blocks(blocks: Vec<dto::BlockBody>) -> Result<Vec<Block>, axum::response::Response> {
    blocks
        .into_iter()
        .map(|b| {
            let kind = match b.kind.as_str() {
                "text" => BlockKind::Text,
                "image" => BlockKind::Image,
                other => {
                    return Err(errors::json_error(
                        StatusCode::BAD_REQUEST,
                        "validation_error",
                        format!("unknown block kind: {other}"),
                    ));
                }
            };
            Ok(Block {
                kind,
                content: b.content,
                position: b.position,
            })
        })
        .collect()
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreatePostBody>,
) -> axum::response::Response {
    let blocks = match parse_blocks(body.blocks) {
        Ok(blocks) => blocks,
        Err(resp) => return resp,
    };

    let post = match Post::new(PostId::new(), body.title, blocks, Utc::now()) {
        Ok(post) => post,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.posts.create_post(post).await {
        Ok(post) => (StatusCode::CREATED, Json(dto::post_to_json(&post))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn edit_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreatePostBody>,
) -> axum::response::Response {
    let id: PostId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let existing = match services.posts.get_post(id).await {
        Ok(post) => post,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let blocks = match parse_blocks(body.blocks) {
        Ok(blocks) => blocks,
        Err(resp) => return resp,
    };

    let post = match Post::new(id, body.title, blocks, existing.created_at) {
        Ok(post) => post,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.posts.update_post(post).await {
        Ok(post) => (StatusCode::OK, Json(dto::post_to_json(&post))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_message(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateMessageBody>,
) -> axum::response::Response {
    let message = match Message::new(MessageId::new(), body.title, body.body, Utc::now()) {
        Ok(message) => message,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.messages.create_message(message).await {
        Ok(message) => (StatusCode::CREATED, Json(dto::message_to_json(&message))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_message(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MessageId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.messages.delete_message(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "deleted" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Mail every account through the mail port. Delivery failures for a single
/// recipient are logged and skipped rather than aborting the broadcast.
pub async fn broadcast_email(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BroadcastBody>,
) -> axum::response::Response {
    if body.subject.trim().is_empty() || body.body.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "subject and body are required",
        );
    }

    let users = match services.users.list_users().await {
        Ok(users) => users,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut sent = 0usize;
    for user in &users {
        match services.mailer.send(&user.email, &body.subject, &body.body).await {
            Ok(()) => sent += 1,
            Err(e) => {
                tracing::warn!(to = %user.email, error = %e, "broadcast delivery failed");
            }
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "sent", "recipients": sent })),
    )
        .into_response()
}
