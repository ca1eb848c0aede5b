use serde::{Deserialize, Serialize};

/// Default page size when the caller does not send one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound for caller-requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Maximum length of a single filter value (in characters).
pub const MAX_FIELD_VALUE_LENGTH: usize = 10_000;
/// Maximum length of the free-text search term (in characters).
pub const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Engine knobs. Hosts usually embed this in their own configuration.
///
/// ```rust
/// use shelfquery::QueryLimits;
///
/// let limits: QueryLimits = serde_json::from_str(r#"{ "maxPageSize": 50 }"#).unwrap();
/// assert_eq!(limits.max_page_size, 50);
/// assert_eq!(limits.default_page_size, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Longer filter values fail closed.
    pub max_value_length: usize,
    /// Longer search terms are truncated.
    pub max_search_length: usize,
    /// Separator for list-valued filters such as `isbn=A,B,C`.
    pub list_separator: char,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            max_value_length: MAX_FIELD_VALUE_LENGTH,
            max_search_length: MAX_SEARCH_QUERY_LENGTH,
            list_separator: ',',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = QueryLimits::default();
        assert_eq!(limits.default_page_size, 10);
        assert_eq!(limits.max_page_size, 100);
        assert_eq!(limits.list_separator, ',');
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let limits: QueryLimits =
            serde_json::from_str(r#"{ "listSeparator": ";", "maxValueLength": 64 }"#).unwrap();
        assert_eq!(limits.list_separator, ';');
        assert_eq!(limits.max_value_length, 64);
        assert_eq!(limits.max_search_length, MAX_SEARCH_QUERY_LENGTH);
    }
}
