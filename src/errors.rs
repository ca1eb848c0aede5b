//! # Error Types
//!
//! Three error families, one per audience:
//!
//! - [`FilterError`]: why a single caller-supplied filter could not be turned
//!   into a predicate. The default builder entry points never return it; they
//!   log it at `debug` level and substitute a predicate that matches nothing.
//!   The `try_*` entry points hand it back for diagnostics.
//! - [`SchemaError`]: a declarative table (sort map) was declared wrong. These
//!   are programmer errors surfaced at startup, never per request.
//! - [`QueryError`]: reported by a [`QueryExecutor`](crate::executor::QueryExecutor)
//!   while running a finished specification.
//!
//! ## Logging
//!
//! Fail-closed degradations are logged through `tracing`. Enable them in a host
//! application with, for example:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("shelfquery=debug")
//!     .compact()
//!     .init();
//! ```

use crate::{fields::FieldKind, filtering::FilterOperator};
use thiserror::Error;

/// A single filter could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown field path `{path}`")]
    UnknownField { path: String },

    #[error("`{raw}` is not a valid {kind} value")]
    Coercion { raw: String, kind: FieldKind },

    #[error("operator {operator} is not supported on {kind} fields")]
    UnsupportedOperator { operator: FilterOperator, kind: FieldKind },

    #[error("filter value exceeds {limit} characters")]
    ValueTooLong { limit: usize },
}

/// A declarative field table is inconsistent with its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("sort key `{key}` does not resolve on `{entity}`")]
    UnknownSortKey { entity: &'static str, key: String },

    #[error("sort map for `{entity}` declares no default order")]
    MissingDefaultOrder { entity: &'static str },
}

/// Raised by a query executor.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query store unavailable: {0}")]
    Unavailable(String),

    #[error("paging window skip={skip} take={take} cannot be applied")]
    InvalidWindow { skip: u64, take: u64 },
}
