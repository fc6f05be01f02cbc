//! CRUD Handler Factory
//!
//! One generic implementation of the four standard handlers, bound to a
//! concrete resource per route. List composes the query features over the
//! collection (with an optional parent pre-filter for nested resources);
//! read/update/delete answer 404 for unknown ids; update re-runs full
//! validation on the merged document.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};

use super::{response, AppState};
use crate::core::{AppError, AppResult};
use crate::models::Resource;
use crate::query::QuerySpec;
use crate::store::{parse_id, StoreError};

/// GET /, listing with filter, sort, projection, and pagination
pub async fn list_all<R>(
    State(state): State<AppState>,
    path: Option<Path<HashMap<String, String>>>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Value>>
where
    R: Resource + Send + Sync + 'static,
{
    let path_params = path.map(|Path(p)| p).unwrap_or_default();
    Ok(run_list::<R>(&state, &query, &path_params))
}

/// GET /:id
pub async fn get_one<R>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Value>>
where
    R: Resource + Send + Sync + 'static,
{
    let id = parse_id(&raw_id)?;
    let doc = R::collection(&state.store)
        .find_by_id(id)
        .ok_or_else(|| not_found(&raw_id))?;
    Ok(response::success(strip_hidden::<R>(doc)))
}

/// POST /
pub async fn create_one<R>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<Value>)>
where
    R: Resource + Send + Sync + 'static,
{
    let doc = create_doc::<R>(&state, body)?;
    Ok((StatusCode::CREATED, response::success(doc)))
}

/// PATCH /:id, a partial update that re-runs full validation
pub async fn update_one<R>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(patch): Json<Value>,
) -> AppResult<Json<Value>>
where
    R: Resource + Send + Sync + 'static,
{
    let id = parse_id(&raw_id)?;
    let updated = R::collection(&state.store)
        .update(id, patch, &R::validate)?
        .ok_or_else(|| not_found(&raw_id))?;
    Ok(response::success(strip_hidden::<R>(updated)))
}

/// DELETE /:id, answering 204 with an empty body
pub async fn delete_one<R>(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode>
where
    R: Resource + Send + Sync + 'static,
{
    let id = parse_id(&raw_id)?;
    R::collection(&state.store)
        .delete(id)
        .ok_or_else(|| not_found(&raw_id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================
// Shared Internals
// ==================

/// Compose and run a list query; callers may pre-seed query parameters
pub(crate) fn run_list<R: Resource>(
    state: &AppState,
    query: &HashMap<String, String>,
    path_params: &HashMap<String, String>,
) -> Json<Value> {
    let mut spec = QuerySpec::from_params(query, R::HIDDEN_FIELDS);
    // Nested listing: /parents/:parent_id/children pre-filters on the link
    if let Some(parent) = R::PARENT_FIELD {
        if let Some(parent_id) = path_params.get(&format!("{}_id", parent)) {
            spec = spec.with_eq_filter(parent, parent_id.as_str());
        }
    }
    response::success_list(R::collection(&state.store).find(&spec))
}

/// Apply defaults, validate, and insert a new document
pub(crate) fn create_doc<R: Resource>(state: &AppState, mut body: Value) -> AppResult<Value> {
    if !body.is_object() {
        return Err(StoreError::NotAnObject.into());
    }
    R::apply_defaults(&mut body);
    R::validate(&body).map_err(StoreError::Validation)?;
    let doc = R::collection(&state.store).insert(body)?;
    Ok(strip_hidden::<R>(doc))
}

fn not_found(raw_id: &str) -> AppError {
    AppError::not_found(format!("No document found with ID '{}'", raw_id))
}

fn strip_hidden<R: Resource>(doc: Value) -> Value {
    let Value::Object(fields) = doc else {
        return doc;
    };
    let kept: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| !R::HIDDEN_FIELDS.contains(&key.as_str()))
        .collect();
    Value::Object(kept)
}
