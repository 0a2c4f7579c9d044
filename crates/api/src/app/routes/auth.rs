use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;

use farmstand_auth::{LoginCode, SESSION_TTL_DAYS, TokenCodec};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;
use crate::middleware::AUTH_COOKIE;

/// Issue a fresh login code for the email and mail it out. Creates the
/// account on first contact. Always answers 200 so the endpoint does not
/// leak which emails have accounts.
pub async fn request_code(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RequestCodeBody>,
) -> axum::response::Response {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid email");
    }

    let code = LoginCode::generate(Utc::now());
    if let Err(e) = services.users.issue_login_code(&email, code.clone()).await {
        return errors::domain_error_to_response(e);
    }

    if let Err(e) = services
        .mailer
        .send(
            &email,
            "Your login code",
            &format!("Your login code is {}. It expires in 15 minutes.", code.code),
        )
        .await
    {
        return errors::domain_error_to_response(e);
    }

    (StatusCode::OK, Json(serde_json::json!({ "status": "sent" }))).into_response()
}

/// Exchange a login code for a session token. The token is returned in the
/// body and also set as the session cookie the front end reads.
pub async fn verify_code(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tokens): Extension<Arc<dyn TokenCodec>>,
    Json(body): Json<dto::VerifyCodeBody>,
) -> axum::response::Response {
    let email = body.email.trim().to_lowercase();

    let user = match services.users.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_code", "invalid code");
        }
        Err(e) => return errors::domain_error_to_response(e),
    };

    if !user.verify_login_code(body.code.trim(), Utc::now()) {
        return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_code", "invalid code");
    }

    let token = match tokens.issue(user.id, &user.email, user.role()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session token");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "internal error",
            );
        }
    };

    let cookie = format!(
        "{AUTH_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_TTL_DAYS * 24 * 60 * 60
    );

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({
            "token": token,
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

/// Clear the session cookie.
pub async fn logout() -> axum::response::Response {
    let cookie = format!("{AUTH_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "status": "logged_out" })),
    )
        .into_response()
}

/// Current account, as seen by the session token.
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.users.find_by_id(caller.user_id()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "account not found"),
        Err(e) => errors::domain_error_to_response(e),
    }
}
