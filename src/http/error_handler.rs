//! Global Error Handler
//!
//! Terminal pipeline stage. `AppError::into_response` always renders the
//! production-safe body (operational message, or a generic line for
//! unexpected failures) and stashes the full error in the response
//! extensions; the `global_error_handler` middleware rewrites the body
//! with debug detail when the deployment mode is development.

use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::config::EnvMode;
use crate::core::AppError;

/// Client-visible line for non-operational failures
pub const GENERIC_MESSAGE: &str = "Something went wrong!";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let (label, message) = if self.is_operational() {
            (self.status(), self.message().to_string())
        } else {
            tracing::error!(
                status = self.status_code(),
                error = %self,
                "non-operational error reached the pipeline"
            );
            ("error", GENERIC_MESSAGE.to_string())
        };

        let mut res = (
            status,
            Json(json!({ "status": label, "message": message })),
        )
            .into_response();
        res.extensions_mut().insert(self);
        res
    }
}

/// Terminal middleware: verbose error bodies in development
pub async fn global_error_handler(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let res = next.run(req).await;
    if state.config.env != EnvMode::Development {
        return res;
    }

    let Some(err) = res.extensions().get::<AppError>().cloned() else {
        return res;
    };

    // Debug-only: echo the message and the full error, whatever the class
    let status = res.status();
    let mut verbose = (
        status,
        Json(json!({
            "status": err.status(),
            "message": err.message(),
            "error": format!("{:?}", err),
        })),
    )
        .into_response();
    verbose.extensions_mut().insert(err);
    verbose
}

/// Unknown-route fallback
pub async fn not_found_fallback(uri: Uri) -> AppError {
    AppError::not_found(format!("Can't find {} on this server!", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operational_error_renders_its_message() {
        let res = AppError::not_found("No document found with ID 'x'").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.extensions().get::<AppError>().is_some());
    }

    #[test]
    fn test_non_operational_error_hides_its_message() {
        let res = AppError::unexpected("db exploded").into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The original text survives only in the extension, for the
        // development rewrite; the rendered body is generic.
        let err = res.extensions().get::<AppError>().unwrap();
        assert_eq!(err.message(), "db exploded");
    }
}
