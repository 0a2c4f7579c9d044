use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};

use farmstand_auth::TokenCodec;

use crate::context::CallerContext;

/// Name of the session cookie the front end stores.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenCodec>,
}

/// Require a valid session token, via bearer header or the session cookie,
/// and insert a [`CallerContext`] for downstream handlers.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_token(req.headers())?;

    let claims = state
        .tokens
        .verify(token)
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(CallerContext::new(
        claims.sub,
        claims.email.clone(),
        claims.role,
    ));

    Ok(next.run(req).await)
}

/// Reject non-admin callers. Layered after [`auth_middleware`], so the
/// context is always present.
pub async fn require_admin(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let caller = req
        .extensions()
        .get::<CallerContext>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !caller.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap) -> Result<&str, StatusCode> {
    if let Some(header) = headers.get(header::AUTHORIZATION) {
        let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .trim();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }
        return Ok(token);
    }

    if let Some(cookies) = headers.get(header::COOKIE) {
        let cookies = cookies.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == AUTH_COOKIE && !value.is_empty() {
                    return Ok(value);
                }
            }
        }
    }

    Err(StatusCode::UNAUTHORIZED)
}
