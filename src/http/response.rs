//! Response Envelope
//!
//! Every successful JSON response follows `{status, results?, data}`.

use axum::Json;
use serde_json::{json, Value};

/// Wrap a single document
pub fn success(data: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": { "data": data },
    }))
}

/// Wrap a list of documents with its count
pub fn success_list(docs: Vec<Value>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "results": docs.len(),
        "data": { "data": docs },
    }))
}
