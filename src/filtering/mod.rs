//! # Filtering, Search, Sorting & Paging
//!
//! Turns loosely typed query parameters into typed pieces of a
//! [`Specification`](crate::Specification): predicates, an ordering and a
//! paging window.
//!
//! ## Main Components
//!
//! - **[`PredicateBuilder`]**: `(field path, operator, raw value)` to a [`Predicate`]
//! - **[`any_of`] / [`all_of`]**: fold predicates into one filter unit
//! - **[`parse_advanced_filters`]**: zip the `f`/`o`/`v` arrays into [`FilterDescriptor`]s
//! - **[`search_criteria`]**: free-text search over an entity's searchable fields
//! - **[`SortMap`]**: declared sort keys with a default order
//! - **[`PageRequest`] / [`Page`]**: paging input and output
//!
//! ## Query Parameter Examples
//!
//! ```text
//! // Free-text search, sorted by newest first, second page of 20
//! GET /items?search=dune&sort=-CreatedDate&pageIndex=2&pageSize=20
//!
//! // Comma-separated list (IN semantics)
//! GET /items?isbn=9780441013593,9780553293357
//!
//! // Nested field with an advanced filter triple
//! GET /items?f=Shelf.ShelfNumber&o=Equals&v=A-12
//!
//! // Two-element range, either end optional
//! GET /items?publishedDate=2024-01-01&publishedDate=2024-01-31
//! ```
//!
//! ## Failure Policy
//!
//! Nothing in this module returns an error for caller-supplied input.
//!
//! | Input | Outcome |
//! |-------|---------|
//! | unknown field path | filter matches nothing |
//! | value that does not parse as the field's type | filter matches nothing |
//! | ordering operator on a boolean or UUID field | filter matches nothing |
//! | advanced triple missing its operator or value | triple dropped |
//! | list with no usable values | filter omitted |
//! | unknown or missing sort key | entity's default order |
//!
//! Every degradation is logged at `debug` level through `tracing`.

pub mod advanced;
pub mod conditions;
pub mod operator;
pub mod pagination;
pub mod predicate;
pub mod search;
pub mod sort;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used items
pub use advanced::{FilterDescriptor, advanced_predicates, parse_advanced_filters};
pub use conditions::{PredicateBuilder, split_list};
pub use operator::{FilterOperator, UnknownOperator};
pub use pagination::{Page, PageRequest, PagingWindow};
pub use predicate::{Comparison, Predicate, all_of, any_of};
pub use search::search_criteria;
pub use sort::{SortDirection, SortDirective, SortKey, SortMap, SortMapBuilder, SortOrder};
