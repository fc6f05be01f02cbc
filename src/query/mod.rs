//! Query feature composition

pub mod features;

pub use features::{
    ComparisonOp, FilterClause, Projection, QuerySpec, SortDirection, DEFAULT_LIMIT,
    DEFAULT_PAGE, RESERVED_KEYS,
};
