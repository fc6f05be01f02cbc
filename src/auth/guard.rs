//! Auth Guards
//!
//! Pipeline stages that verify the bearer credential, resolve it to a live
//! user, and attach the identity to the request. `protect` short-circuits
//! with 401, `restrict_to` with 403; `is_logged_in` runs the same checks
//! but swallows every failure and continues anonymously.

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;
use uuid::Uuid;

use super::errors::AuthError;
use super::password::changed_after;
use crate::core::AppError;
use crate::http::AppState;
use crate::models::Role;

/// Name of the credential cookie
pub const TOKEN_COOKIE: &str = "jwt";

/// Identity attached to the request after a successful `protect`
///
/// Downstream stages may read the record freely; nothing is persisted back
/// without an explicit store update.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Value);

impl CurrentUser {
    /// The user's id
    pub fn id(&self) -> Option<Uuid> {
        self.0
            .get("id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    /// The user's single role tag
    pub fn role(&self) -> Role {
        self.0
            .get("role")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Role::User)
    }
}

/// Blocking auth guard: verify, resolve, attach; 401 on any failure
pub async fn protect(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers()).ok_or(AuthError::MissingCredential)?;
    let user = resolve_user(&state, &token)?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Role guard: 403 unless the attached identity's role is permitted
///
/// Must be registered strictly after `protect`; a request arriving here
/// without an identity is treated as unauthenticated.
pub async fn restrict_to(
    roles: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingCredential)?;
    if !roles.contains(&user.role()) {
        return Err(AppError::forbidden(
            "You do not have permission to perform this action",
        ));
    }
    Ok(next.run(req).await)
}

/// Non-blocking variant: attach the identity when the credential checks
/// out, continue anonymously otherwise
pub async fn is_logged_in(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if let Some(token) = extract_token(req.headers()) {
        if let Ok(user) = resolve_user(&state, &token) {
            req.extensions_mut().insert(CurrentUser(user));
        }
    }
    next.run(req).await
}

/// Verify a token and resolve it to a live, non-revoked user record
pub fn resolve_user(state: &AppState, token: &str) -> Result<Value, AuthError> {
    let claims = state.jwt.verify(token)?;
    let user = state
        .store
        .users
        .find_by_id(claims.sub)
        .ok_or(AuthError::UserGone)?;

    // Soft-deleted accounts count as gone
    if user.get("active").and_then(Value::as_bool) == Some(false) {
        return Err(AuthError::UserGone);
    }
    if changed_after(&user, claims.iat) {
        return Err(AuthError::PasswordChanged);
    }
    Ok(user)
}

/// Pull the credential from the bearer header, falling back to the cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    bearer.or_else(|| cookie_value(headers, TOKEN_COOKIE))
}

/// Read one cookie value out of the Cookie headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
