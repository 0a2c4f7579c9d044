use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use farmstand_core::ItemId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

/// The public board: active items plus the active claims against them.
pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = match services.ledger.list_active_items().await {
        Ok(items) => items,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let claims = match services.ledger.list_active_claims().await {
        Ok(claims) => claims,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "items": items.iter().map(dto::item_to_json).collect::<Vec<_>>(),
            "claims": claims
                .iter()
                .map(|v| dto::claim_to_json(&v.claim, &v.item_name))
                .collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

/// Claim a quantity of an item for the calling user.
pub async fn claim_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::ClaimItemBody>,
) -> axum::response::Response {
    let item_id: ItemId = match body.item_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let claim = match services
        .ledger
        .create_claim(item_id, caller.user_id(), body.amount)
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
