//! User Routes
//!
//! Public auth endpoints, the self-service `/me` group behind `protect`,
//! and admin-only account management.

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::auth::{guard, handlers};
use crate::http::{crud, AppState};
use crate::models::{Role, User};

const ADMIN_ONLY: &[Role] = &[Role::Admin];

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout));

    let me = Router::new()
        .route("/me", get(handlers::get_me))
        .route("/update-me", patch(handlers::update_me))
        .route("/delete-me", delete(handlers::delete_me))
        .route("/update-password", patch(handlers::update_password))
        .route_layer(from_fn_with_state(state.clone(), guard::protect));

    let admin = Router::new()
        .route("/", get(crud::list_all::<User>))
        .route(
            "/:id",
            get(crud::get_one::<User>)
                .patch(crud::update_one::<User>)
                .delete(crud::delete_one::<User>),
        )
        .route_layer(from_fn(|req, next| guard::restrict_to(ADMIN_ONLY, req, next)))
        .route_layer(from_fn_with_state(state.clone(), guard::protect));

    public.merge(me).merge(admin)
}
