//! Account Handlers
//!
//! Signup, login, logout, and the self-service account endpoints. Every
//! handler returns `Result<_, AppError>`, so any failure is forwarded to
//! the global error handler instead of crashing the request task.

use axum::extract::{Extension, State};
use axum::http::header::{HeaderValue, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::guard::{CurrentUser, TOKEN_COOKIE};
use super::password::{hash_password, verify_password};
use crate::config::EnvMode;
use crate::core::{AppError, AppResult};
use crate::http::AppState;
use crate::models::{Resource, User};
use crate::store::StoreError;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 8;

/// POST /api/v1/users/signup
pub async fn signup(State(state): State<AppState>, Json(body): Json<Value>) -> AppResult<Response> {
    let password = validated_password(&body, "password")?;

    let mut doc = pick_fields(&body, &["name", "email", "photo", "role"]);
    User::apply_defaults(&mut doc);
    User::validate(&doc).map_err(StoreError::Validation)?;

    if let Some(fields) = doc.as_object_mut() {
        fields.insert(
            "password_hash".to_string(),
            Value::String(hash_password(&password)?),
        );
    }

    let user = state.store.users.insert(doc)?;
    issue_token_response(&state, user, StatusCode::CREATED)
}

/// POST /api/v1/users/login
pub async fn login(State(state): State<AppState>, Json(body): Json<Value>) -> AppResult<Response> {
    let (Some(email), Some(password)) = (
        body.get("email").and_then(Value::as_str),
        body.get("password").and_then(Value::as_str),
    ) else {
        return Err(AppError::bad_request("Please provide email and password"));
    };

    let user = state
        .store
        .users
        .find_one("email", email)
        .filter(|u| u.get("active").and_then(Value::as_bool) != Some(false))
        .ok_or(AppError::from(crate::auth::errors::AuthError::WrongCredentials))?;

    let hash = user
        .get("password_hash")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::unexpected("stored user has no password hash"))?;
    if !verify_password(hash, password)? {
        return Err(crate::auth::errors::AuthError::WrongCredentials.into());
    }

    issue_token_response(&state, user, StatusCode::OK)
}

/// GET /api/v1/users/logout
///
/// Overwrites the credential cookie with a short-lived dummy value.
pub async fn logout() -> Response {
    let cookie = format!("{}=loggedout; Path=/; HttpOnly; Max-Age=10", TOKEN_COOKIE);
    let mut res = Json(json!({ "status": "success" })).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        res.headers_mut().insert(SET_COOKIE, value);
    }
    res
}

/// PATCH /api/v1/users/update-password
pub async fn update_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> AppResult<Response> {
    let id = current
        .id()
        .ok_or_else(|| AppError::unexpected("attached identity has no id"))?;
    // Re-fetch so the stored hash is fresh, not the one resolved at guard time
    let user = state
        .store
        .users
        .find_by_id(id)
        .ok_or_else(|| AppError::from(crate::auth::errors::AuthError::UserGone))?;

    let current_password = body
        .get("current_password")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::bad_request("Please provide your current password"))?;
    let hash = user
        .get("password_hash")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::unexpected("stored user has no password hash"))?;
    if !verify_password(hash, current_password)? {
        return Err(AppError::unauthorized("Your current password is wrong"));
    }

    let password = validated_password(&body, "password")?;

    // Backdated one second so the token issued below stays valid
    let changed_at = (Utc::now() - Duration::seconds(1)).to_rfc3339();
    let patch = json!({
        "password_hash": hash_password(&password)?,
        "password_changed_at": changed_at,
    });
    let updated = state
        .store
        .users
        .update(id, patch, &User::validate)?
        .ok_or_else(|| AppError::from(crate::auth::errors::AuthError::UserGone))?;

    issue_token_response(&state, updated, StatusCode::OK)
}

/// GET /api/v1/users/me
pub async fn get_me(Extension(current): Extension<CurrentUser>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": { "user": sanitize_user(current.0) },
    }))
}

/// PATCH /api/v1/users/update-me
pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    if body.get("password").is_some() || body.get("password_confirm").is_some() {
        return Err(AppError::bad_request(
            "This route is not for password updates. Please use /update-password.",
        ));
    }

    let id = current
        .id()
        .ok_or_else(|| AppError::unexpected("attached identity has no id"))?;
    let patch = pick_fields(&body, &["name", "email", "photo"]);
    let updated = state
        .store
        .users
        .update(id, patch, &User::validate)?
        .ok_or_else(|| AppError::from(crate::auth::errors::AuthError::UserGone))?;

    Ok(Json(json!({
        "status": "success",
        "data": { "user": sanitize_user(updated) },
    })))
}

/// DELETE /api/v1/users/delete-me
///
/// Soft delete: the account is deactivated, not removed.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    let id = current
        .id()
        .ok_or_else(|| AppError::unexpected("attached identity has no id"))?;
    state
        .store
        .users
        .update(id, json!({ "active": false }), &User::validate)?
        .ok_or_else(|| AppError::from(crate::auth::errors::AuthError::UserGone))?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================
// Helpers
// ==================

/// Strip server-only fields from a user record
pub fn sanitize_user(user: Value) -> Value {
    let Value::Object(fields) = user else {
        return user;
    };
    let kept: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| !User::HIDDEN_FIELDS.contains(&key.as_str()))
        .collect();
    Value::Object(kept)
}

/// Check password presence, length, and confirmation match
fn validated_password(body: &Value, field: &str) -> AppResult<String> {
    let password = body
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::bad_request("Please provide a password"))?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "A password must have at least 8 characters",
        ));
    }
    let confirm = body.get("password_confirm").and_then(Value::as_str);
    if confirm != Some(password) {
        return Err(AppError::bad_request("Passwords are not the same"));
    }
    Ok(password.to_string())
}

/// Build a new object from a whitelist of fields
fn pick_fields(body: &Value, allowed: &[&str]) -> Value {
    let mut picked = Map::new();
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            if allowed.contains(&key.as_str()) {
                picked.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(picked)
}

/// Sign a token for the user and wrap it in the success envelope plus the
/// credential cookie
fn issue_token_response(state: &AppState, user: Value, status: StatusCode) -> AppResult<Response> {
    let id = user
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::unexpected("stored user has no id"))?;
    let token = state.jwt.sign(id)?;

    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE,
        token,
        state.config.jwt_cookie_expires_days * 86_400,
    );
    if state.config.env == EnvMode::Production {
        cookie.push_str("; Secure");
    }

    let body = json!({
        "status": "success",
        "token": token,
        "data": { "user": sanitize_user(user) },
    });
    let mut res = (status, Json(body)).into_response();
    res.headers_mut().insert(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| AppError::unexpected(e.to_string()))?,
    );
    Ok(res)
}
