//! Booking Routes
//!
//! The whole surface requires authentication and the management roles;
//! checkout/payment flows are an external collaborator and not exposed
//! here.

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;

use crate::auth::guard;
use crate::http::{crud, AppState};
use crate::models::{Booking, Role};

const MANAGE_ROLES: &[Role] = &[Role::Admin, Role::LeadGuide];

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(crud::list_all::<Booking>).post(crud::create_one::<Booking>),
        )
        .route(
            "/:id",
            get(crud::get_one::<Booking>)
                .patch(crud::update_one::<Booking>)
                .delete(crud::delete_one::<Booking>),
        )
        .route_layer(from_fn(|req, next| guard::restrict_to(MANAGE_ROLES, req, next)))
        .route_layer(from_fn_with_state(state.clone(), guard::protect))
}

/// Fragment nested under `/tours/:tour_id/bookings`
pub fn nested_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list_all::<Booking>))
        .route_layer(from_fn(|req, next| guard::restrict_to(MANAGE_ROLES, req, next)))
        .route_layer(from_fn_with_state(state.clone(), guard::protect))
}
