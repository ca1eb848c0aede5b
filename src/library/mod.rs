//! Query objects for the library domain: catalog items, borrow records and
//! warehouse stock movements.
//!
//! Each module declares its entity schemas, a sort map, a [`QueryResource`]
//! impl and the entity's simple filters. Special-case filters are built from
//! the generic primitives:
//!
//! | Parameter | Built as |
//! |-----------|----------|
//! | `isbn=A,B` | OR of equalities |
//! | `author=herb` | any related author whose name contains the text |
//! | `genres=A,B` | any related genre named A or B |
//! | `overdue=true` | not returned AND due before `asOf` |
//! | `price=10&price=20` | inclusive range |
//!
//! [`QueryResource`]: crate::traits::QueryResource

pub mod borrowing;
pub mod catalog;
pub mod warehouse;

pub use borrowing::{BorrowFilters, BorrowRecord, BorrowStatus, Member};
pub use catalog::{Author, Category, Genre, Item, ItemFilters, ItemStatus, Shelf};
pub use warehouse::{MovementType, TrackingFilters, Warehouse, WarehouseTracking};
