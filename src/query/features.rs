//! Query Feature Composer
//!
//! Translates the flat query-string map of an incoming request into an
//! immutable `QuerySpec`: filter clauses, sort keys, field projection, and
//! pagination. Building the spec has no side effects; execution happens
//! when a collection applies it to a snapshot.
//!
//! Reserved keys (`page`, `sort`, `limit`, `fields`) drive the composer
//! itself and never leak into the filter. Comparison operators ride on
//! bracket syntax: `price[gte]=500` filters on `price >= 500`.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{Map, Value};

/// Query-string keys consumed by the composer itself
pub const RESERVED_KEYS: &[&str] = &["page", "sort", "limit", "fields"];

/// Default page when absent or unparseable
pub const DEFAULT_PAGE: u64 = 1;
/// Default page size when absent or unparseable
pub const DEFAULT_LIMIT: u64 = 100;

/// Comparison operator for one filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOp {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }
}

/// Sort direction for one sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One field/operator/value filter clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub op: ComparisonOp,
    pub value: String,
}

/// Field projection for the result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// All fields (minus hidden ones)
    All,
    /// Only the named fields (the identity field is always included)
    Include(Vec<String>),
    /// All fields except the named ones
    Exclude(Vec<String>),
}

/// Composed, immutable query specification
#[derive(Debug, Clone)]
pub struct QuerySpec {
    filter: Vec<FilterClause>,
    sort_keys: Vec<(String, SortDirection)>,
    projection: Projection,
    hidden_fields: Vec<String>,
    page: u64,
    limit: u64,
}

impl QuerySpec {
    /// Compose a specification from raw query-string parameters
    ///
    /// `hidden_fields` are the resource's internally hidden fields; they
    /// are stripped from every projection, including explicit includes.
    pub fn from_params(params: &HashMap<String, String>, hidden_fields: &[&str]) -> Self {
        let mut filter = Vec::new();
        for (key, value) in params {
            if let Some(clause) = parse_filter_clause(key, value) {
                filter.push(clause);
            }
        }
        // Deterministic clause order regardless of map iteration
        filter.sort_by(|a, b| a.field.cmp(&b.field));

        let sort_keys = match params.get("sort") {
            Some(raw) => parse_sort(raw),
            // Newest first when the client does not ask otherwise
            None => vec![("created_at".to_string(), SortDirection::Desc)],
        };

        let projection = match params.get("fields") {
            Some(raw) => parse_projection(raw),
            None => Projection::All,
        };

        let page = parse_positive(params.get("page")).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(params.get("limit")).unwrap_or(DEFAULT_LIMIT);

        Self {
            filter,
            sort_keys,
            projection,
            hidden_fields: hidden_fields.iter().map(|f| f.to_string()).collect(),
            page,
            limit,
        }
    }

    /// Add an equality pre-filter (nested-resource listing)
    pub fn with_eq_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter.push(FilterClause {
            field: field.into(),
            op: ComparisonOp::Eq,
            value: value.into(),
        });
        self
    }

    /// Filter clauses, in deterministic field order
    pub fn filter(&self) -> &[FilterClause] {
        &self.filter
    }

    /// Ordered sort keys
    pub fn sort_keys(&self) -> &[(String, SortDirection)] {
        &self.sort_keys
    }

    /// Field projection
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Records skipped before the page starts
    ///
    /// Saturates instead of overflowing, so an absurd client-supplied page
    /// number yields an empty page rather than a panic.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Page size
    pub fn take(&self) -> u64 {
        self.limit
    }

    /// Whether a document satisfies every filter clause
    pub fn matches(&self, doc: &Value) -> bool {
        self.filter.iter().all(|clause| {
            let Some(field_value) = doc.get(&clause.field) else {
                return false;
            };
            let Some(ordering) = compare_to_raw(field_value, &clause.value) else {
                return false;
            };
            match clause.op {
                ComparisonOp::Eq => ordering == Ordering::Equal,
                ComparisonOp::Gt => ordering == Ordering::Greater,
                ComparisonOp::Gte => ordering != Ordering::Less,
                ComparisonOp::Lt => ordering == Ordering::Less,
                ComparisonOp::Lte => ordering != Ordering::Greater,
            }
        })
    }

    /// Apply the whole specification to a snapshot of documents
    ///
    /// Filter, then sort, then paginate, then project. A page past the end
    /// of the result set yields an empty vector, never an error.
    pub fn apply(&self, docs: Vec<Value>) -> Vec<Value> {
        let mut docs: Vec<Value> = docs.into_iter().filter(|d| self.matches(d)).collect();

        docs.sort_by(|a, b| {
            for (field, direction) in &self.sort_keys {
                let ordering = compare_fields(a.get(field), b.get(field));
                let ordering = match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        docs.into_iter()
            .skip(self.skip() as usize)
            .take(self.take() as usize)
            .map(|d| self.project(d))
            .collect()
    }

    /// Project one document according to the field selection
    ///
    /// The identity field is always kept; hidden fields never survive.
    pub fn project(&self, doc: Value) -> Value {
        let Value::Object(fields) = doc else {
            return doc;
        };
        let kept: Map<String, Value> = fields
            .into_iter()
            .filter(|(key, _)| {
                if self.hidden_fields.iter().any(|h| h == key) {
                    return false;
                }
                if key == "id" {
                    return true;
                }
                match &self.projection {
                    Projection::All => true,
                    Projection::Include(names) => names.iter().any(|n| n == key),
                    Projection::Exclude(names) => !names.iter().any(|n| n == key),
                }
            })
            .collect();
        Value::Object(kept)
    }
}

fn parse_filter_clause(key: &str, value: &str) -> Option<FilterClause> {
    // `price[gte]` -> field "price", op Gte; a bare key is an equality test
    let (field, op) = match key.split_once('[') {
        Some((field, rest)) => {
            let tag = rest.strip_suffix(']')?;
            (field, ComparisonOp::parse(tag)?)
        }
        None => (key, ComparisonOp::Eq),
    };

    if field.is_empty() || RESERVED_KEYS.contains(&field) {
        return None;
    }

    Some(FilterClause {
        field: field.to_string(),
        op,
        value: value.to_string(),
    })
}

fn parse_sort(raw: &str) -> Vec<(String, SortDirection)> {
    raw.split(',')
        .filter_map(|key| {
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            match key.strip_prefix('-') {
                Some(field) if !field.is_empty() => {
                    Some((field.to_string(), SortDirection::Desc))
                }
                Some(_) => None,
                None => Some((key.to_string(), SortDirection::Asc)),
            }
        })
        .collect()
}

fn parse_projection(raw: &str) -> Projection {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for name in raw.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match name.strip_prefix('-') {
            Some(field) if !field.is_empty() => exclude.push(field.to_string()),
            Some(_) => {}
            None => include.push(name.to_string()),
        }
    }
    // A selection list wins over exclusions when the client mixes both
    if !include.is_empty() {
        Projection::Include(include)
    } else if !exclude.is_empty() {
        Projection::Exclude(exclude)
    } else {
        Projection::All
    }
}

fn parse_positive(raw: Option<&String>) -> Option<u64> {
    let value: u64 = raw?.trim().parse().ok()?;
    if value == 0 {
        return None;
    }
    Some(value)
}

/// Compare a document field against a raw query-string value
///
/// Numeric when both sides are numeric, boolean against "true"/"false",
/// otherwise lexicographic.
fn compare_to_raw(field_value: &Value, raw: &str) -> Option<Ordering> {
    match field_value {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs: f64 = raw.trim().parse().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::String(s) => Some(s.as_str().cmp(raw)),
        Value::Bool(b) => {
            let rhs: bool = raw.trim().parse().ok()?;
            Some(b.cmp(&rhs))
        }
        _ => None,
    }
}

/// Ordering of two optional document fields for sorting
///
/// Missing fields sort last; mixed types order by a fixed type rank.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
