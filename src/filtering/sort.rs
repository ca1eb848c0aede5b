use crate::{
    errors::SchemaError,
    fields::{EntitySchema, FieldAccessor, Value},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::HashMap, fmt};
use tracing::{debug, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// `DESC`/`DESCENDING` (any case) is descending, anything else ascending.
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("DESC") || raw.eq_ignore_ascii_case("DESCENDING") {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }
}

/// A parsed `sort` parameter: upper-cased key plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    pub key: String,
    pub direction: SortDirection,
}

impl SortDirective {
    /// Parse `Title`, `-CreatedDate`, `+Price` or the JSON form
    /// `["CreatedDate","DESC"]`. Blank or malformed input gives `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.starts_with('[') {
            return parse_json_sort(raw);
        }
        let (key, direction) = match raw.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Descending),
            None => (raw.strip_prefix('+').unwrap_or(raw), SortDirection::Ascending),
        };
        Self::from_parts(key, direction)
    }

    fn from_parts(key: &str, direction: SortDirection) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_uppercase(),
            direction,
        })
    }

    #[must_use]
    pub const fn is_descending(&self) -> bool {
        self.direction.is_descending()
    }
}

/// Parse the React Admin style `["column","ASC|DESC"]` array.
fn parse_json_sort(raw: &str) -> Option<SortDirective> {
    let parts: Vec<String> = serde_json::from_str(raw).ok()?;
    let direction = parts
        .get(1)
        .map_or(SortDirection::Ascending, |direction| SortDirection::parse(direction));
    SortDirective::from_parts(parts.first()?, direction)
}

/// Reads the value an entity is ordered by.
pub struct SortKey<T> {
    accessor: FieldAccessor<T>,
}

impl<T> SortKey<T> {
    #[must_use]
    pub fn path(&self) -> &str {
        self.accessor.path()
    }

    /// Ascending comparison. Null, NaN and unreachable values sort first;
    /// values that cannot be compared count as equal.
    #[must_use]
    pub fn compare(&self, left: &T, right: &T) -> Ordering {
        let left = sortable(self.accessor.read(left));
        let right = sortable(self.accessor.read(right));
        match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => left
                .compare(&right, self.accessor.collation())
                .unwrap_or(Ordering::Equal),
        }
    }
}

/// NaN has no place in a total order, so it sorts with the nulls.
fn sortable(value: Option<Value>) -> Value {
    match value {
        Some(Value::Float(number)) if number.is_nan() => Value::Null,
        Some(value) => value,
        None => Value::Null,
    }
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
        }
    }
}

impl<T> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SortKey").field(&self.path()).finish()
    }
}

/// At most one ordering; ascending and descending are mutually exclusive.
pub enum SortOrder<T> {
    Unordered,
    Ascending(SortKey<T>),
    Descending(SortKey<T>),
}

impl<T> SortOrder<T> {
    #[must_use]
    pub fn new(key: SortKey<T>, descending: bool) -> Self {
        if descending {
            Self::Descending(key)
        } else {
            Self::Ascending(key)
        }
    }

    #[must_use]
    pub const fn key(&self) -> Option<&SortKey<T>> {
        match self {
            Self::Unordered => None,
            Self::Ascending(key) | Self::Descending(key) => Some(key),
        }
    }

    #[must_use]
    pub const fn is_descending(&self) -> bool {
        matches!(self, Self::Descending(_))
    }

    #[must_use]
    pub fn compare(&self, left: &T, right: &T) -> Ordering {
        match self {
            Self::Unordered => Ordering::Equal,
            Self::Ascending(key) => key.compare(left, right),
            Self::Descending(key) => key.compare(left, right).reverse(),
        }
    }
}

impl<T> Default for SortOrder<T> {
    fn default() -> Self {
        Self::Unordered
    }
}

impl<T> Clone for SortOrder<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Unordered => Self::Unordered,
            Self::Ascending(key) => Self::Ascending(key.clone()),
            Self::Descending(key) => Self::Descending(key.clone()),
        }
    }
}

impl<T> fmt::Display for SortOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unordered => f.write_str("unordered"),
            Self::Ascending(key) => write!(f, "{} ASC", key.path()),
            Self::Descending(key) => write!(f, "{} DESC", key.path()),
        }
    }
}

impl<T> fmt::Debug for SortOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SortOrder({self})")
    }
}

/// Declared sort keys of one entity, built once and shared read-only.
///
/// ```rust,ignore
/// static ITEM_SORTS: LazyLock<SortMap<Item>> = LazyLock::new(|| {
///     SortMap::builder(&ITEM_SCHEMA)
///         .key("Title")
///         .key("CreatedDate")
///         .alias("Shelf", "Shelf.ShelfNumber")
///         .default_order("CreatedDate", SortDirection::Descending)
///         .build()
///         .expect("item sort map")
/// });
/// ```
pub struct SortMap<T: 'static> {
    entity: &'static str,
    keys: HashMap<String, SortKey<T>>,
    default_key: SortKey<T>,
    default_direction: SortDirection,
}

impl<T: 'static> SortMap<T> {
    #[must_use]
    pub fn builder(schema: &EntitySchema<T>) -> SortMapBuilder<'_, T> {
        SortMapBuilder {
            schema,
            entries: Vec::new(),
            default: None,
        }
    }

    /// Resolve a raw `sort` parameter into a key and a descending flag.
    ///
    /// Missing, blank or undeclared keys give the declared default.
    #[must_use]
    pub fn build_order(&self, sort: Option<&str>) -> (SortKey<T>, bool) {
        let Some(directive) = sort.and_then(SortDirective::parse) else {
            return self.default_pair();
        };
        if let Some(key) = self.keys.get(&directive.key) {
            return (key.clone(), directive.is_descending());
        }
        debug!(entity = self.entity, key = %directive.key, "unknown sort key, using default order");
        self.default_pair()
    }

    /// [`build_order`](Self::build_order) as a [`SortOrder`].
    #[must_use]
    pub fn order_for(&self, sort: Option<&str>) -> SortOrder<T> {
        let (key, descending) = self.build_order(sort);
        SortOrder::new(key, descending)
    }

    #[must_use]
    pub fn default_order(&self) -> SortOrder<T> {
        let (key, descending) = self.default_pair();
        SortOrder::new(key, descending)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(&name.trim().to_uppercase())
    }

    fn default_pair(&self) -> (SortKey<T>, bool) {
        (self.default_key.clone(), self.default_direction.is_descending())
    }
}

impl<T: 'static> fmt::Debug for SortMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortMap")
            .field("entity", &self.entity)
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .field("default", &self.default_order())
            .finish()
    }
}

#[must_use]
pub struct SortMapBuilder<'a, T: 'static> {
    schema: &'a EntitySchema<T>,
    entries: Vec<(String, String)>,
    default: Option<(String, SortDirection)>,
}

impl<T: 'static> SortMapBuilder<'_, T> {
    /// Declare a sortable field under its own path.
    pub fn key(mut self, path: &str) -> Self {
        self.entries.push((path.to_string(), path.to_string()));
        self
    }

    /// Declare a sort name that orders by a different (usually nested) path.
    pub fn alias(mut self, name: &str, path: &str) -> Self {
        self.entries.push((name.to_string(), path.to_string()));
        self
    }

    /// Order used when the caller sends no usable key.
    pub fn default_order(mut self, name: &str, direction: SortDirection) -> Self {
        self.default = Some((name.to_string(), direction));
        self
    }

    /// Resolve every declared path against the schema.
    ///
    /// Keys that do not resolve are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::MissingDefaultOrder`] if no default order was declared
    /// - [`SchemaError::UnknownSortKey`] if the default does not resolve
    pub fn build(self) -> Result<SortMap<T>, SchemaError> {
        let entity = self.schema.name();
        let mut keys = HashMap::new();
        for (name, path) in self.entries {
            match self.schema.resolve(&path) {
                Some(accessor) => {
                    keys.insert(name.trim().to_uppercase(), SortKey { accessor });
                }
                None => warn!(entity, key = %name, path = %path, "sort key does not resolve, skipping"),
            }
        }

        let (default_name, default_direction) = self
            .default
            .ok_or(SchemaError::MissingDefaultOrder { entity })?;
        let default_key = keys
            .get(&default_name.trim().to_uppercase())
            .cloned()
            .or_else(|| self.schema.resolve(&default_name).map(|accessor| SortKey { accessor }))
            .ok_or(SchemaError::UnknownSortKey {
                entity,
                key: default_name,
            })?;

        Ok(SortMap {
            entity,
            keys,
            default_key,
            default_direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::fixtures::{BOOK, Book, at, catalog};
    use std::sync::LazyLock;

    static SORTS: LazyLock<SortMap<Book>> = LazyLock::new(|| {
        SortMap::builder(&BOOK)
            .key("Title")
            .key("Price")
            .key("CreatedDate")
            .alias("Shelf", "Shelf.ShelfNumber")
            .key("Isbn")
            .default_order("CreatedDate", SortDirection::Descending)
            .build()
            .expect("book sort map")
    });

    fn sorted(order: &SortOrder<Book>, mut books: Vec<Book>) -> Vec<i64> {
        books.sort_by(|a, b| order.compare(a, b));
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_parse_directive() {
        assert_eq!(
            SortDirective::parse("-createdDate"),
            Some(SortDirective {
                key: "CREATEDDATE".to_string(),
                direction: SortDirection::Descending
            })
        );
        assert_eq!(SortDirective::parse("+Title").map(|d| d.key), Some("TITLE".to_string()));
        assert!(!SortDirective::parse("Title").unwrap().is_descending());
        assert_eq!(SortDirective::parse(""), None);
        assert_eq!(SortDirective::parse(" - "), None);
    }

    #[test]
    fn test_parse_json_form() {
        let directive = SortDirective::parse(r#"["Price", "desc"]"#).unwrap();
        assert_eq!(directive.key, "PRICE");
        assert!(directive.is_descending());

        let directive = SortDirective::parse(r#"["Price"]"#).unwrap();
        assert!(!directive.is_descending());

        assert_eq!(SortDirective::parse("[]"), None);
        assert_eq!(SortDirective::parse("[not json"), None);
    }

    #[test]
    fn test_build_order_known_key() {
        let (key, descending) = SORTS.build_order(Some("-price"));
        assert_eq!(key.path(), "Price");
        assert!(descending);
    }

    #[test]
    fn test_build_order_falls_back_to_default() {
        for sort in [None, Some(""), Some("nonexistent-key"), Some("-Publisher")] {
            let (key, descending) = SORTS.build_order(sort);
            assert_eq!(key.path(), "CreatedDate", "{sort:?}");
            assert!(descending, "{sort:?}");
        }
    }

    #[test]
    fn test_descending_created_date() {
        let mut books: Vec<Book> = catalog().into_iter().take(3).collect();
        books[0].created = at(2024, 1, 1, 0, 0, 0);
        books[1].created = at(2024, 1, 3, 0, 0, 0);
        books[2].created = at(2024, 1, 2, 0, 0, 0);
        let order = SORTS.order_for(Some("-CreatedDate"));
        assert_eq!(sorted(&order, books), vec![2, 3, 1]);
    }

    #[test]
    fn test_alias_orders_by_nested_path_with_missing_links_first() {
        let order = SORTS.order_for(Some("shelf"));
        assert_eq!(order.to_string(), "Shelf.ShelfNumber ASC");
        assert_eq!(sorted(&order, catalog()), vec![2, 4, 5, 1, 3]);
    }

    #[test]
    fn test_nulls_sort_first_ascending() {
        let order = SORTS.order_for(Some("Isbn"));
        assert_eq!(sorted(&order, catalog()), vec![4, 1, 2, 3, 5]);
    }

    #[test]
    fn test_text_sort_uses_field_collation() {
        let mut books = catalog();
        books[0].title = "apple".to_string();
        let order = SORTS.order_for(Some("Title"));
        assert_eq!(sorted(&order, books), vec![5, 1, 2, 3, 4]);
    }

    #[test]
    fn test_unresolvable_keys_are_skipped() {
        let map = SortMap::builder(&BOOK)
            .key("Title")
            .key("Subtitle")
            .default_order("Title", SortDirection::Ascending)
            .build()
            .unwrap();
        assert!(map.contains("title"));
        assert!(!map.contains("Subtitle"));
    }

    #[test]
    fn test_default_order_must_exist() {
        let missing = SortMap::builder(&BOOK).key("Title").build();
        assert_eq!(missing.err(), Some(SchemaError::MissingDefaultOrder { entity: "Book" }));

        let unknown = SortMap::builder(&BOOK)
            .default_order("Subtitle", SortDirection::Ascending)
            .build();
        assert!(matches!(unknown, Err(SchemaError::UnknownSortKey { .. })));
    }

    #[test]
    fn test_unordered_keeps_input_order() {
        let order = SortOrder::<Book>::Unordered;
        assert_eq!(sorted(&order, catalog()), vec![1, 2, 3, 4, 5]);
        assert_eq!(order.to_string(), "unordered");
    }
}
