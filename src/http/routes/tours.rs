//! Tour Routes
//!
//! Listing and reading are public (with soft identity attachment);
//! mutations are restricted to admins and lead guides. Reviews and
//! bookings mount underneath for nested listing.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::Value;

use super::{bookings, reviews};
use crate::auth::guard;
use crate::core::AppResult;
use crate::http::{crud, AppState};
use crate::models::{Role, Tour};

const WRITE_ROLES: &[Role] = &[Role::Admin, Role::LeadGuide];

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/top-5-cheap", get(top_tours))
        .route("/", get(crud::list_all::<Tour>))
        .route("/:id", get(crud::get_one::<Tour>))
        .route_layer(from_fn_with_state(state.clone(), guard::is_logged_in));

    let restricted = Router::new()
        .route("/", post(crud::create_one::<Tour>))
        .route(
            "/:id",
            patch(crud::update_one::<Tour>).delete(crud::delete_one::<Tour>),
        )
        .route_layer(from_fn(|req, next| guard::restrict_to(WRITE_ROLES, req, next)))
        .route_layer(from_fn_with_state(state.clone(), guard::protect));

    public
        .merge(restricted)
        .nest("/:tour_id/reviews", reviews::nested_routes(state))
        .nest("/:tour_id/bookings", bookings::nested_routes(state))
}

/// GET /top-5-cheap: preset listing of the five cheapest top-rated tours
async fn top_tours(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<Value>> {
    let mut query = query;
    query.insert("limit".to_string(), "5".to_string());
    query.insert("sort".to_string(), "-ratings_average,price".to_string());
    query.insert(
        "fields".to_string(),
        "name,price,ratings_average,summary,difficulty".to_string(),
    );
    Ok(crud::run_list::<Tour>(&state, &query, &HashMap::new()))
}
