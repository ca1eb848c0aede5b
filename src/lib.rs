//! Composable, typed query specifications for list endpoints.
//!
//! Raw query parameters (`search`, `sort`, paging, simple filters and
//! `f`/`o`/`v` advanced-filter triples) are turned into a [`Specification`]:
//! a predicate tree, one ordering and an optional paging window. Bad input
//! never surfaces as an error; it narrows the result (see [`filtering`]).
//!
//! ```rust,ignore
//! let params = QueryParams::<ItemFilters>::from_query_str("search=dune&sort=-CreatedDate&isbn=111,333")?;
//! let spec = build_specification::<Item, _>(&params, &QueryLimits::default());
//! let page = store.fetch_page(spec).await?;
//! ```

pub mod config;
pub mod errors;
pub mod executor;
pub mod fields;
pub mod filtering;
pub mod library;
pub mod models;
pub mod specification;
pub mod traits;

pub use config::QueryLimits;
pub use errors::{FilterError, QueryError, SchemaError};
pub use executor::{InMemoryStore, QueryExecutor};
pub use fields::{EntitySchema, FieldDef, FieldEnum, FieldKind, Value};
pub use filtering::{FilterOperator, Page, PageRequest, Predicate, PredicateBuilder, SortDirection, SortMap};
pub use models::{AdvancedFilterParams, FirstValue, NoFilters, QueryParams, SearchParams};
pub use serde_with;
pub use specification::Specification;
pub use traits::{QueryResource, SimpleFilters, build_specification};
