use crate::fields::{Collation, FieldKind, Value};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{cmp::Ordering, fmt, str::FromStr};
use utoipa::ToSchema;

/// Comparison applied by a single filter.
///
/// Parses the canonical names case-insensitively, plus the short aliases
/// `in`, `eq`, `ne`/`neq`, `gt`, `gte`, `lt` and `lte`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr, ToSchema,
)]
pub enum FilterOperator {
    /// Substring containment for text, membership building block elsewhere.
    Includes,
    Equals,
    NotEqualsTo,
    GreaterThan,
    GreaterThanOrEqualsTo,
    LessThan,
    LessThanOrEqualsTo,
}

impl FilterOperator {
    pub const ALL: [Self; 7] = [
        Self::Includes,
        Self::Equals,
        Self::NotEqualsTo,
        Self::GreaterThan,
        Self::GreaterThanOrEqualsTo,
        Self::LessThan,
        Self::LessThanOrEqualsTo,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Includes => "Includes",
            Self::Equals => "Equals",
            Self::NotEqualsTo => "NotEqualsTo",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqualsTo => "GreaterThanOrEqualsTo",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqualsTo => "LessThanOrEqualsTo",
        }
    }

    /// Short symbol used when rendering predicates.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Includes => "~",
            Self::Equals => "==",
            Self::NotEqualsTo => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqualsTo => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqualsTo => "<=",
        }
    }

    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterThanOrEqualsTo | Self::LessThan | Self::LessThanOrEqualsTo
        )
    }

    /// Whether a comma-separated value expands into several predicates.
    #[must_use]
    pub const fn accepts_lists(self) -> bool {
        matches!(self, Self::Includes | Self::Equals | Self::NotEqualsTo)
    }

    #[must_use]
    pub const fn supports(self, kind: FieldKind) -> bool {
        !self.is_ordering() || kind.supports_ordering()
    }

    /// Apply the operator to a field value and an already coerced operand.
    #[must_use]
    pub fn apply(self, field: &Value, operand: &Value, collation: Collation) -> bool {
        match self {
            Self::Equals => field.equals(operand, collation),
            Self::NotEqualsTo => !field.equals(operand, collation),
            Self::Includes => match (field, operand) {
                (Value::Text(haystack), Value::Text(needle)) => match collation {
                    Collation::Ordinal => haystack.contains(needle.as_str()),
                    Collation::IgnoreCase => haystack.to_lowercase().contains(&needle.to_lowercase()),
                },
                _ => field.equals(operand, collation),
            },
            Self::GreaterThan => field.compare(operand, collation) == Some(Ordering::Greater),
            Self::GreaterThanOrEqualsTo => matches!(
                field.compare(operand, collation),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::LessThan => field.compare(operand, collation) == Some(Ordering::Less),
            Self::LessThanOrEqualsTo => matches!(
                field.compare(operand, collation),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter operator `{}`", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Some(operator) = Self::ALL
            .into_iter()
            .find(|operator| operator.name().eq_ignore_ascii_case(trimmed))
        {
            return Ok(operator);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "in" | "contains" => Ok(Self::Includes),
            "eq" => Ok(Self::Equals),
            "ne" | "neq" => Ok(Self::NotEqualsTo),
            "gt" => Ok(Self::GreaterThan),
            "gte" => Ok(Self::GreaterThanOrEqualsTo),
            "lt" => Ok(Self::LessThan),
            "lte" => Ok(Self::LessThanOrEqualsTo),
            _ => Err(UnknownOperator(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_aliases() {
        assert_eq!("Includes".parse::<FilterOperator>(), Ok(FilterOperator::Includes));
        assert_eq!("greaterthanorequalsto".parse::<FilterOperator>(), Ok(FilterOperator::GreaterThanOrEqualsTo));
        assert_eq!("neq".parse::<FilterOperator>(), Ok(FilterOperator::NotEqualsTo));
        assert_eq!(" LTE ".parse::<FilterOperator>(), Ok(FilterOperator::LessThanOrEqualsTo));
        assert!("Between".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&FilterOperator::NotEqualsTo).unwrap();
        assert_eq!(json, r#""NotEqualsTo""#);
        let parsed: FilterOperator = serde_json::from_str(r#""gt""#).unwrap();
        assert_eq!(parsed, FilterOperator::GreaterThan);
    }

    #[test]
    fn test_includes_is_substring_for_text() {
        let title = Value::from("The Left Hand of Darkness");
        assert!(FilterOperator::Includes.apply(&title, &Value::from("Hand"), Collation::Ordinal));
        assert!(!FilterOperator::Includes.apply(&title, &Value::from("hand"), Collation::Ordinal));
        assert!(FilterOperator::Includes.apply(&title, &Value::from("hand"), Collation::IgnoreCase));
    }

    #[test]
    fn test_includes_is_equality_for_other_kinds() {
        assert!(FilterOperator::Includes.apply(&Value::Integer(3), &Value::Integer(3), Collation::Ordinal));
        assert!(!FilterOperator::Includes.apply(&Value::Integer(33), &Value::Integer(3), Collation::Ordinal));
    }

    #[test]
    fn test_null_aware_equality() {
        assert!(FilterOperator::Equals.apply(&Value::Null, &Value::Null, Collation::Ordinal));
        assert!(FilterOperator::NotEqualsTo.apply(&Value::Integer(1), &Value::Null, Collation::Ordinal));
        assert!(!FilterOperator::GreaterThan.apply(&Value::Null, &Value::Integer(1), Collation::Ordinal));
    }

    #[test]
    fn test_ordering_support_by_kind() {
        assert!(FilterOperator::GreaterThan.supports(FieldKind::Date));
        assert!(!FilterOperator::GreaterThan.supports(FieldKind::Boolean));
        assert!(!FilterOperator::LessThan.supports(FieldKind::Uuid));
        assert!(FilterOperator::Equals.supports(FieldKind::Uuid));
    }
}
