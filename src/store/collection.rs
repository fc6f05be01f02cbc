//! In-Memory Document Collection
//!
//! One named collection of JSON documents guarded by a single `RwLock`.
//! Every document is an object carrying a server-assigned `id` (UUID v4)
//! and `created_at` (RFC 3339). Unique-field enforcement and the atomic
//! merge-and-validate update happen under the write lock, which is the
//! only coordination the pipeline relies on for concurrent requests
//! touching the same record.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use crate::query::QuerySpec;

/// Validation callback run against a full document before it is stored
pub type ValidateFn<'a> = &'a dyn Fn(&Value) -> Result<(), Vec<String>>;

/// A named collection of JSON documents
pub struct Collection {
    name: &'static str,
    unique_fields: &'static [&'static str],
    docs: RwLock<HashMap<Uuid, Value>>,
}

impl Collection {
    /// Create an empty collection
    pub fn new(name: &'static str, unique_fields: &'static [&'static str]) -> Self {
        Self {
            name,
            unique_fields,
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Collection name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the collection holds no documents
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new document
    ///
    /// Assigns `id` and `created_at`, enforces unique fields, and returns
    /// the stored document.
    pub fn insert(&self, doc: Value) -> StoreResult<Value> {
        let Value::Object(mut fields) = doc else {
            return Err(StoreError::NotAnObject);
        };

        let id = Uuid::new_v4();
        fields.insert("id".to_string(), Value::String(id.to_string()));
        fields.insert(
            "created_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let doc = Value::Object(fields);

        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        check_unique(&docs, self.unique_fields, &doc, None)?;
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    /// Find documents matching a composed query specification
    ///
    /// Filtering, sorting, pagination, and projection are all applied by
    /// the specification; the collection only supplies the snapshot.
    pub fn find(&self, spec: &QuerySpec) -> Vec<Value> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        spec.apply(docs.values().cloned().collect())
    }

    /// Fetch one document by id
    pub fn find_by_id(&self, id: Uuid) -> Option<Value> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.get(&id).cloned()
    }

    /// Fetch the first document whose field equals the given string
    pub fn find_one(&self, field: &str, value: &str) -> Option<Value> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.values()
            .find(|doc| doc.get(field).and_then(Value::as_str) == Some(value))
            .cloned()
    }

    /// Atomically merge a partial update into a document and re-validate
    ///
    /// `id` and `created_at` are server-owned and cannot be overwritten.
    /// Returns `Ok(None)` when the document does not exist. The merged
    /// document is validated and checked for unique conflicts before the
    /// old version is replaced; on failure nothing is modified.
    pub fn update(
        &self,
        id: Uuid,
        patch: Value,
        validate: ValidateFn<'_>,
    ) -> StoreResult<Option<Value>> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject);
        };

        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        let Some(current) = docs.get(&id) else {
            return Ok(None);
        };

        let mut merged: Map<String, Value> = current
            .as_object()
            .cloned()
            .unwrap_or_default();
        for (key, value) in patch {
            if key == "id" || key == "created_at" {
                continue;
            }
            merged.insert(key, value);
        }
        let merged = Value::Object(merged);

        validate(&merged).map_err(StoreError::Validation)?;
        check_unique(&docs, self.unique_fields, &merged, Some(id))?;

        docs.insert(id, merged.clone());
        Ok(Some(merged))
    }

    /// Remove a document by id, returning it when it existed
    pub fn delete(&self, id: Uuid) -> Option<Value> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.remove(&id)
    }
}

/// Parse a raw path identifier into a UUID
pub fn parse_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

fn check_unique(
    docs: &HashMap<Uuid, Value>,
    unique_fields: &[&str],
    candidate: &Value,
    exclude: Option<Uuid>,
) -> StoreResult<()> {
    for &field in unique_fields {
        let Some(value) = candidate.get(field) else {
            continue;
        };
        let conflict = docs.iter().any(|(id, doc)| {
            Some(*id) != exclude && doc.get(field) == Some(value)
        });
        if conflict {
            return Err(StoreError::DuplicateField {
                field: field.to_string(),
                value: value_display(value),
            });
        }
    }
    Ok(())
}

fn value_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
