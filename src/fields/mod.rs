//! # Typed Field Access
//!
//! Entities are never inspected through reflection. Each entity type declares an
//! [`EntitySchema`] once, mapping canonical field names to typed getters and
//! to-one relations to the schemas of the related types. Everything the
//! filtering layer needs (dotted path resolution, value coercion, ordering) is
//! derived from that table.
//!
//! ```rust,ignore
//! static SHELF: LazyLock<EntitySchema<Shelf>> = LazyLock::new(|| {
//!     EntitySchema::new("Shelf")
//!         .field(FieldDef::text("ShelfNumber", |s: &Shelf| s.shelf_number.as_str().into()))
//!         .field(FieldDef::integer("Floor", |s: &Shelf| s.floor.into()))
//! });
//!
//! static ITEM: LazyLock<EntitySchema<Item>> = LazyLock::new(|| {
//!     EntitySchema::new("Item")
//!         .field(FieldDef::text("Title", |i: &Item| i.title.as_str().into()).ignore_case())
//!         .relation("Shelf", |i: &Item| i.shelf.as_ref(), &SHELF)
//! });
//!
//! let accessor = ITEM.resolve("shelf.shelfnumber").unwrap();
//! ```

mod coerce;
mod path;
mod schema;

pub use coerce::coerce;
pub use path::FieldAccessor;
pub use schema::{EntitySchema, FieldDef};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::{cmp::Ordering, fmt};
use uuid::Uuid;

/// Declared type of a registered field. Drives coercion of raw query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    /// Compared at day granularity by every filter operator.
    DateTime,
    Uuid,
    /// Enumeration with its variant names in declaration order.
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Whether `<`, `<=`, `>` and `>=` are meaningful for this kind.
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        !matches!(self, Self::Boolean | Self::Uuid)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
            Self::Enum(_) => "enum",
        };
        f.write_str(name)
    }
}

/// Case rules for text comparisons on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collation {
    #[default]
    Ordinal,
    IgnoreCase,
}

/// Implemented by enums that are exposed as filterable fields.
///
/// `VARIANTS` must list every `variant_name()` in declaration order; the
/// position is used as the ordinal for ordering comparisons.
pub trait FieldEnum: Copy + 'static {
    const VARIANTS: &'static [&'static str];

    fn variant_name(self) -> &'static str;
}

/// A field value read from an entity or coerced from a query string.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    Enum { name: &'static str, ordinal: usize },
}

impl Value {
    /// Build an enum value from a [`FieldEnum`] variant.
    ///
    /// A name missing from `VARIANTS` orders after every declared variant and
    /// trips a debug assertion.
    #[must_use]
    pub fn enumeration<E: FieldEnum>(variant: E) -> Self {
        let name = variant.variant_name();
        let position = E::VARIANTS.iter().position(|candidate| *candidate == name);
        debug_assert!(position.is_some(), "variant {name:?} is missing from FieldEnum::VARIANTS");
        Self::Enum {
            name,
            ordinal: position.unwrap_or(E::VARIANTS.len()),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Drop the time-of-day component of date-times.
    #[must_use]
    pub fn into_day(self) -> Self {
        match self {
            Self::DateTime(moment) => Self::Date(moment.date()),
            other => other,
        }
    }

    /// Order two values of compatible kinds.
    ///
    /// Integers, floats and decimals compare numerically with each other and
    /// dates compare with date-times by their date. `Null` only compares equal
    /// to `Null`; any other pairing yields `None`.
    #[must_use]
    pub fn compare(&self, other: &Self, collation: Collation) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Text(a), Self::Text(b)) => Some(match collation {
                Collation::Ordinal => a.cmp(b),
                Collation::IgnoreCase => a.to_lowercase().cmp(&b.to_lowercase()),
            }),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            #[allow(clippy::cast_precision_loss)]
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Integer(b)) => Some(a.cmp(&Decimal::from(*b))),
            (Self::Integer(a), Self::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::DateTime(b)) => Some(a.cmp(&b.date())),
            (Self::DateTime(a), Self::Date(b)) => Some(a.date().cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            (Self::Enum { ordinal: a, .. }, Self::Enum { ordinal: b, .. }) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Null-aware equality: `Null` equals only `Null`.
    #[must_use]
    pub fn equals(&self, other: &Self, collation: Collation) -> bool {
        self.compare(other, collation) == Some(Ordering::Equal)
    }

    /// Render the value the way a caller would type it in a query string.
    ///
    /// `coerce(&value.to_raw(), kind)` gives the value back for every kind.
    #[must_use]
    pub fn to_raw(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Text(text) => text.clone(),
            Self::Integer(number) => number.to_string(),
            Self::Float(number) => number.to_string(),
            Self::Decimal(number) => number.to_string(),
            Self::Boolean(flag) => flag.to_string(),
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::DateTime(moment) => moment.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Uuid(id) => id.hyphenated().to_string(),
            Self::Enum { name, .. } => (*name).to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            other => f.write_str(&other.to_raw()),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Midnight of the given day.
pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
