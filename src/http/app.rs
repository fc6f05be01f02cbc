//! Router Assembly
//!
//! Builds the full request pipeline: security headers, CORS, tracing,
//! body limit, route dispatch, and the terminal global error handler.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes::{bookings, reviews, tours, users};
use super::{error_handler, middleware, AppState};

/// Assemble the application router
///
/// Layer order (outermost first at request time): body limit, trace,
/// CORS, security headers, global error handler, then route dispatch.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/tours", tours::routes(&state))
        .nest("/api/v1/users", users::routes(&state))
        .nest("/api/v1/reviews", reviews::routes(&state))
        .nest("/api/v1/bookings", bookings::routes(&state))
        .fallback(error_handler::not_found_fallback)
        .layer(from_fn_with_state(
            state.clone(),
            error_handler::global_error_handler,
        ))
        .layer(from_fn_with_state(state.clone(), middleware::security_headers))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::password::hash_password;
    use crate::config::{AppConfig, EnvMode};
    use crate::models::{Resource, User};

    fn app(env: EnvMode) -> (Router, AppState) {
        let state = AppState::new(AppConfig::for_tests(env));
        (build_router(state.clone()), state)
    }

    fn req(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(request).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn seed_user(state: &AppState, role: &str, email: &str) -> (Uuid, String) {
        let doc = state
            .store
            .users
            .insert(json!({
                "name": "Test User",
                "email": email,
                "role": role,
                "active": true,
                "password_hash": hash_password("pass1234").unwrap(),
            }))
            .unwrap();
        let id = Uuid::parse_str(doc["id"].as_str().unwrap()).unwrap();
        let token = state.jwt.sign(id).unwrap();
        (id, token)
    }

    fn tour_body(name: &str, price: i64) -> Value {
        json!({
            "name": name,
            "duration": 5,
            "max_group_size": 25,
            "difficulty": "easy",
            "price": price,
            "summary": "A scenic test tour across the fjords",
        })
    }

    async fn seed_tour(app: &Router, token: &str, name: &str, price: i64) -> String {
        let (status, body) = send(
            app,
            req("POST", "/api/v1/tours", Some(token), Some(&tour_body(name, price))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["data"]["id"].as_str().unwrap().to_string()
    }

    // ==================
    // Auth flow
    // ==================

    #[tokio::test]
    async fn test_signup_login_and_me() {
        let (app, _state) = app(EnvMode::Development);

        let signup = json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "pass1234",
            "password_confirm": "pass1234",
        });
        let (status, body) = send(&app, req("POST", "/api/v1/users/signup", None, Some(&signup))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], json!("success"));
        assert!(body["token"].as_str().is_some());
        assert!(body["data"]["user"].get("password_hash").is_none());

        let login = json!({ "email": "ada@example.com", "password": "pass1234" });
        let (status, body) = send(&app, req("POST", "/api/v1/users/login", None, Some(&login))).await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, req("GET", "/api/v1/users/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["email"], json!("ada@example.com"));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_401() {
        let (app, state) = app(EnvMode::Development);
        seed_user(&state, "user", "ada@example.com");

        let login = json!({ "email": "ada@example.com", "password": "wrong999" });
        let (status, body) = send(&app, req("POST", "/api/v1/users/login", None, Some(&login))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], json!("fail"));
    }

    #[tokio::test]
    async fn test_login_without_fields_is_400() {
        let (app, _state) = app(EnvMode::Development);
        let (status, body) =
            send(&app, req("POST", "/api/v1/users/login", None, Some(&json!({})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Please provide email and password"));
    }

    #[tokio::test]
    async fn test_protected_route_without_credential_is_401() {
        let (app, _state) = app(EnvMode::Development);
        let (status, body) = send(&app, req("GET", "/api/v1/users/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], json!("fail"));
        assert!(body["message"].as_str().unwrap().contains("not logged in"));
    }

    #[tokio::test]
    async fn test_expired_credential_is_401() {
        let (app, state) = app(EnvMode::Development);
        let (id, _) = seed_user(&state, "user", "ada@example.com");

        let now = Utc::now().timestamp();
        let expired = state.jwt.sign_at(id, now - 7200, now - 3600);
        let (status, body) = send(&app, req("GET", "/api/v1/users/me", Some(&expired), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("expired"));
    }

    #[tokio::test]
    async fn test_credential_predating_password_change_is_401() {
        let (app, state) = app(EnvMode::Development);
        let (id, _) = seed_user(&state, "user", "ada@example.com");

        let now = Utc::now().timestamp();
        let stale = state.jwt.sign_at(id, now - 3600, now + 3600);
        state
            .store
            .users
            .update(
                id,
                json!({ "password_changed_at": Utc::now().to_rfc3339() }),
                &User::validate,
            )
            .unwrap();

        let (status, body) = send(&app, req("GET", "/api/v1/users/me", Some(&stale), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("changed password"));
    }

    #[tokio::test]
    async fn test_deleted_account_credential_is_401() {
        let (app, state) = app(EnvMode::Development);
        let (id, token) = seed_user(&state, "user", "ada@example.com");
        state.store.users.delete(id);

        let (status, body) = send(&app, req("GET", "/api/v1/users/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].as_str().unwrap().contains("no longer exist"));
    }

    #[tokio::test]
    async fn test_wrong_role_is_403() {
        let (app, state) = app(EnvMode::Development);
        let (_, token) = seed_user(&state, "user", "ada@example.com");

        let (status, body) = send(
            &app,
            req("POST", "/api/v1/tours", Some(&token), Some(&tour_body("The Forest Hiker", 397))),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["message"].as_str().unwrap().contains("permission"));
    }

    #[tokio::test]
    async fn test_update_password_reissues_token() {
        let (app, state) = app(EnvMode::Development);
        let (_, token) = seed_user(&state, "user", "ada@example.com");

        let change = json!({
            "current_password": "pass1234",
            "password": "newpass99",
            "password_confirm": "newpass99",
        });
        let (status, body) = send(
            &app,
            req("PATCH", "/api/v1/users/update-password", Some(&token), Some(&change)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let fresh = body["token"].as_str().unwrap().to_string();

        let (status, _) = send(&app, req("GET", "/api/v1/users/me", Some(&fresh), None)).await;
        assert_eq!(status, StatusCode::OK);

        let relogin = json!({ "email": "ada@example.com", "password": "newpass99" });
        let (status, _) = send(&app, req("POST", "/api/v1/users/login", None, Some(&relogin))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_me_deactivates_account() {
        let (app, state) = app(EnvMode::Development);
        let (_, token) = seed_user(&state, "user", "ada@example.com");

        let (status, _) = send(&app, req("DELETE", "/api/v1/users/delete-me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let login = json!({ "email": "ada@example.com", "password": "pass1234" });
        let (status, _) = send(&app, req("POST", "/api/v1/users/login", None, Some(&login))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_me_rejects_password_fields() {
        let (app, state) = app(EnvMode::Development);
        let (_, token) = seed_user(&state, "user", "ada@example.com");

        let body = json!({ "password": "newpass99", "password_confirm": "newpass99" });
        let (status, response) = send(
            &app,
            req("PATCH", "/api/v1/users/update-me", Some(&token), Some(&body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["message"].as_str().unwrap().contains("update-password"));
    }

    // ==================
    // CRUD + query features
    // ==================

    #[tokio::test]
    async fn test_public_tour_listing_needs_no_credential() {
        let (app, _state) = app(EnvMode::Development);
        let (status, body) = send(&app, req("GET", "/api/v1/tours", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!(0));
    }

    #[tokio::test]
    async fn test_garbage_credential_on_public_route_is_soft() {
        let (app, _state) = app(EnvMode::Development);
        let (status, _) = send(&app, req("GET", "/api/v1/tours", Some("garbage"), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_filter_sort_and_paginate_through_the_api() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");
        seed_tour(&app, &admin, "The Forest Hiker", 397).await;
        seed_tour(&app, &admin, "The Sea Explorer", 997).await;
        seed_tour(&app, &admin, "The City Wanderer", 697).await;

        let uri = "/api/v1/tours?price%5Bgte%5D=500&sort=-price";
        let (status, body) = send(&app, req("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!(2));
        let names: Vec<&str> = body["data"]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["The Sea Explorer", "The City Wanderer"]);

        let (status, body) =
            send(&app, req("GET", "/api/v1/tours?page=2&limit=2&sort=price", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!(1));

        // A page past the end is silently empty
        let (status, body) = send(&app, req("GET", "/api/v1/tours?page=9", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!(0));
    }

    #[tokio::test]
    async fn test_field_limiting_keeps_identity() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");
        seed_tour(&app, &admin, "The Forest Hiker", 397).await;

        let (status, body) =
            send(&app, req("GET", "/api/v1/tours?fields=name,price", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let doc = &body["data"]["data"][0];
        assert!(doc.get("id").is_some());
        assert!(doc.get("name").is_some());
        assert!(doc.get("summary").is_none());
    }

    #[tokio::test]
    async fn test_top_5_cheap_alias() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");
        for i in 0..7 {
            seed_tour(&app, &admin, &format!("The Numbered Tour {}", i), 100 + i * 50).await;
        }

        let (status, body) = send(&app, req("GET", "/api/v1/tours/top-5-cheap", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!(5));
    }

    #[tokio::test]
    async fn test_read_update_delete_round() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");
        let id = seed_tour(&app, &admin, "The Forest Hiker", 397).await;

        let (status, body) =
            send(&app, req("GET", &format!("/api/v1/tours/{}", id), None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["data"]["price"], json!(397));

        let patch = json!({ "price": 450 });
        let (status, body) = send(
            &app,
            req("PATCH", &format!("/api/v1/tours/{}", id), Some(&admin), Some(&patch)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["data"]["price"], json!(450));

        let (status, body) = send(
            &app,
            req("DELETE", &format!("/api/v1/tours/{}", id), Some(&admin), None),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        // Deleting again is 404, not 204
        let (status, _) = send(
            &app,
            req("DELETE", &format!("/api/v1/tours/{}", id), Some(&admin), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_reruns_validation() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");
        let id = seed_tour(&app, &admin, "The Forest Hiker", 397).await;

        let patch = json!({ "price": -5 });
        let (status, body) = send(
            &app,
            req("PATCH", &format!("/api/v1/tours/{}", id), Some(&admin), Some(&patch)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid input data."));
    }

    #[tokio::test]
    async fn test_invalid_id_format_is_400() {
        let (app, _state) = app(EnvMode::Development);
        let (status, body) = send(&app, req("GET", "/api/v1/tours/not-a-uuid", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("Invalid id"));
    }

    #[tokio::test]
    async fn test_duplicate_unique_field_is_400() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");
        seed_tour(&app, &admin, "The Forest Hiker", 397).await;

        let (status, body) = send(
            &app,
            req("POST", "/api/v1/tours", Some(&admin), Some(&tour_body("The Forest Hiker", 500))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("Duplicate"));
    }

    #[tokio::test]
    async fn test_nested_review_listing_is_scoped_to_the_tour() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");
        let (_, reviewer) = seed_user(&state, "user", "rev@example.com");
        let tour_a = seed_tour(&app, &admin, "The Forest Hiker", 397).await;
        let tour_b = seed_tour(&app, &admin, "The Sea Explorer", 997).await;

        let review = json!({ "review": "Stunning views", "rating": 5 });
        let (status, body) = send(
            &app,
            req(
                "POST",
                &format!("/api/v1/tours/{}/reviews", tour_a),
                Some(&reviewer),
                Some(&review),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["data"]["tour"], json!(tour_a));
        assert!(body["data"]["data"]["user"].as_str().is_some());

        let (status, body) = send(
            &app,
            req(
                "GET",
                &format!("/api/v1/tours/{}/reviews", tour_b),
                Some(&reviewer),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!(0));

        let (status, body) = send(
            &app,
            req(
                "GET",
                &format!("/api/v1/tours/{}/reviews", tour_a),
                Some(&reviewer),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!(1));
    }

    #[tokio::test]
    async fn test_admin_user_listing_hides_credentials() {
        let (app, state) = app(EnvMode::Development);
        let (_, admin) = seed_user(&state, "admin", "admin@example.com");

        let (status, body) = send(&app, req("GET", "/api/v1/users", Some(&admin), None)).await;
        assert_eq!(status, StatusCode::OK);
        let doc = &body["data"]["data"][0];
        assert!(doc.get("email").is_some());
        assert!(doc.get("password_hash").is_none());
    }

    // ==================
    // Error pipeline
    // ==================

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (app, _state) = app(EnvMode::Development);
        let (status, body) = send(&app, req("GET", "/api/v1/nope", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], json!("fail"));
        assert!(body["message"].as_str().unwrap().contains("/api/v1/nope"));
    }

    #[tokio::test]
    async fn test_development_mode_adds_debug_detail() {
        let (app, _state) = app(EnvMode::Development);
        let (status, body) = send(&app, req("GET", "/api/v1/tours/not-a-uuid", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_production_mode_stays_terse() {
        let (app, _state) = app(EnvMode::Production);
        let (status, body) = send(&app, req("GET", "/api/v1/tours/not-a-uuid", None, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        // Operational message passes through verbatim, no debug detail
        assert!(body["message"].as_str().unwrap().contains("Invalid id"));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let (app, _state) = app(EnvMode::Production);
        let res = app
            .clone()
            .oneshot(req("GET", "/api/v1/tours", None, None))
            .await
            .unwrap();
        let headers = res.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(headers.get("strict-transport-security").is_some());
    }
}
