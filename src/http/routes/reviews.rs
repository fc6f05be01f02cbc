//! Review Routes
//!
//! All review routes require authentication. Creation is reserved for
//! regular users (guides do not review their own tours); editing and
//! deleting also allow admins. The nested fragment mounts under
//! `/tours/:tour_id/reviews` and pre-fills the parent link.

use std::collections::HashMap;

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::auth::guard::{self, CurrentUser};
use crate::core::AppResult;
use crate::http::{crud, response, AppState};
use crate::models::{Review, Role};

const AUTHOR_ROLES: &[Role] = &[Role::User];
const MODERATE_ROLES: &[Role] = &[Role::User, Role::Admin];

pub fn routes(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(crud::list_all::<Review>))
        .route("/:id", get(crud::get_one::<Review>));

    let create = Router::new()
        .route("/", post(create_review))
        .route_layer(from_fn(|req, next| guard::restrict_to(AUTHOR_ROLES, req, next)));

    let moderate = Router::new()
        .route(
            "/:id",
            patch(crud::update_one::<Review>).delete(crud::delete_one::<Review>),
        )
        .route_layer(from_fn(|req, next| {
            guard::restrict_to(MODERATE_ROLES, req, next)
        }));

    read.merge(create)
        .merge(moderate)
        .route_layer(from_fn_with_state(state.clone(), guard::protect))
}

/// Fragment nested under `/tours/:tour_id/reviews`
pub fn nested_routes(state: &AppState) -> Router<AppState> {
    let read = Router::new().route("/", get(crud::list_all::<Review>));
    let create = Router::new()
        .route("/", post(create_review))
        .route_layer(from_fn(|req, next| guard::restrict_to(AUTHOR_ROLES, req, next)));

    read.merge(create)
        .route_layer(from_fn_with_state(state.clone(), guard::protect))
}

/// POST handler that fills the tour from the route and the user from the
/// attached identity when the body leaves them out
async fn create_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    path: Option<Path<HashMap<String, String>>>,
    Json(mut body): Json<Value>,
) -> AppResult<(StatusCode, Json<Value>)> {
    if let Some(fields) = body.as_object_mut() {
        if !fields.contains_key("tour") {
            if let Some(tour_id) = path.as_ref().and_then(|Path(p)| p.get("tour_id")) {
                fields.insert("tour".to_string(), json!(tour_id));
            }
        }
        if !fields.contains_key("user") {
            if let Some(user_id) = current.id() {
                fields.insert("user".to_string(), json!(user_id.to_string()));
            }
        }
    }
    let doc = crud::create_doc::<Review>(&state, body)?;
    Ok((StatusCode::CREATED, response::success(doc)))
}
