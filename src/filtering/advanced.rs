//! Advanced (ad-hoc) filters sent as three index-aligned arrays:
//! `f` (field names), `o` (operators) and `v` (raw values).
//!
//! ```text
//! ?f=Isbn&o=Includes&v=111,333&f=Price&o=LessThan&v=20
//! ```

use super::{FilterOperator, Predicate, PredicateBuilder};
use crate::{config::QueryLimits, fields::EntitySchema};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

/// One `(field, operator, value)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    pub field_name: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterDescriptor {
    pub fn new(field_name: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Zip the three arrays into descriptors.
///
/// Iterates over `fields`; an index whose operator or value is missing (or
/// whose field name is blank) is skipped, never rejected.
pub fn parse_advanced_filters<F, V>(
    fields: &[F],
    operators: &[Option<FilterOperator>],
    values: &[Option<V>],
) -> Vec<FilterDescriptor>
where
    F: AsRef<str>,
    V: AsRef<str>,
{
    fields
        .iter()
        .enumerate()
        .filter_map(|(index, field)| {
            let field = field.as_ref().trim();
            let operator = operators.get(index).copied().flatten();
            let value = values.get(index).and_then(Option::as_ref);
            match (operator, value) {
                (Some(operator), Some(value)) if !field.is_empty() => {
                    Some(FilterDescriptor::new(field, operator, value.as_ref()))
                }
                _ => {
                    debug!(index, field, "dropping incomplete advanced filter");
                    None
                }
            }
        })
        .collect()
}

impl<T: 'static> PredicateBuilder<'_, T> {
    /// Build one filter unit per (field, operator) group.
    ///
    /// Descriptors are grouped by case-insensitive field name and operator in
    /// order of first appearance. Within a group, `Includes`/`Equals` values
    /// (including separator-delimited items) are OR-ed; `NotEqualsTo` values
    /// and ordering bounds are AND-ed. Callers AND the units together.
    #[must_use]
    pub fn advanced(&self, descriptors: &[FilterDescriptor]) -> Vec<Predicate<T>> {
        let mut groups: Vec<(String, &str, FilterOperator, Vec<&str>)> = Vec::new();
        for descriptor in descriptors {
            let key = descriptor.field_name.trim().to_uppercase();
            match groups
                .iter_mut()
                .find(|(group, _, operator, _)| *group == key && *operator == descriptor.operator)
            {
                Some((_, _, _, values)) => values.push(&descriptor.value),
                None => groups.push((
                    key,
                    descriptor.field_name.trim(),
                    descriptor.operator,
                    vec![descriptor.value.as_str()],
                )),
            }
        }

        groups
            .into_iter()
            .filter_map(|(_, path, operator, values)| self.build_lists(path, operator, &values))
            .collect()
    }
}

/// Build the advanced-filter units for `descriptors` against `schema`.
#[must_use]
pub fn advanced_predicates<T: 'static>(
    schema: &EntitySchema<T>,
    descriptors: &[FilterDescriptor],
    limits: &QueryLimits,
) -> Vec<Predicate<T>> {
    PredicateBuilder::new(schema).with_limits(limits).advanced(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::{
        all_of,
        fixtures::{BOOK, catalog, ids},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_triples_are_dropped() {
        let parsed = parse_advanced_filters(
            &["a", "b"],
            &[Some(FilterOperator::Equals), None],
            &[Some("1"), Some("2")],
        );
        assert_eq!(parsed, vec![FilterDescriptor::new("a", FilterOperator::Equals, "1")]);
    }

    #[test]
    fn test_missing_values_and_short_arrays() {
        let parsed = parse_advanced_filters(
            &["a", "b", "c", " "],
            &[
                Some(FilterOperator::Equals),
                Some(FilterOperator::LessThan),
                Some(FilterOperator::Includes),
                Some(FilterOperator::Equals),
            ],
            &[None, Some("2"), None, Some("4")],
        );
        assert_eq!(parsed, vec![FilterDescriptor::new("b", FilterOperator::LessThan, "2")]);

        let parsed = parse_advanced_filters::<&str, &str>(&["a"], &[], &[]);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_extra_operators_and_values_are_ignored() {
        let parsed = parse_advanced_filters(
            &["Isbn"],
            &[Some(FilterOperator::Includes), Some(FilterOperator::Equals)],
            &[Some("111".to_string()), Some("222".to_string())],
        );
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor = FilterDescriptor::new("Isbn", FilterOperator::Includes, "111");
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "fieldName": "Isbn", "operator": "Includes", "value": "111" })
        );
    }

    #[test]
    fn test_isbn_includes_list() {
        let units = advanced_predicates(
            &BOOK,
            &[FilterDescriptor::new("Isbn", FilterOperator::Includes, "111,333")],
            &QueryLimits::default(),
        );
        assert_eq!(units.len(), 1);
        assert_eq!(ids(&catalog(), |b| units[0].evaluate(b)), vec![1, 3]);
    }

    #[test]
    fn test_same_field_and_operator_are_or_grouped() {
        let descriptors = [
            FilterDescriptor::new("Isbn", FilterOperator::Equals, "111"),
            FilterDescriptor::new("Price", FilterOperator::LessThan, "15"),
            FilterDescriptor::new("isbn", FilterOperator::Equals, "555"),
        ];
        let units = advanced_predicates(&BOOK, &descriptors, &QueryLimits::default());
        assert_eq!(units.len(), 2);
        let combined = all_of(units).unwrap();
        assert_eq!(ids(&catalog(), |b| combined.evaluate(b)), vec![1]);
    }

    #[test]
    fn test_ordering_groups_are_and_combined() {
        let descriptors = [
            FilterDescriptor::new("Price", FilterOperator::GreaterThan, "11"),
            FilterDescriptor::new("Price", FilterOperator::GreaterThan, "12"),
        ];
        let units = advanced_predicates(&BOOK, &descriptors, &QueryLimits::default());
        assert_eq!(units.len(), 1);
        assert_eq!(ids(&catalog(), |b| units[0].evaluate(b)), vec![3, 4, 5]);
    }

    #[test]
    fn test_bad_unit_fails_closed_without_blocking_others() {
        let descriptors = [
            FilterDescriptor::new("Price", FilterOperator::LessThan, "13"),
            FilterDescriptor::new("Publisher", FilterOperator::Equals, "Ace"),
        ];
        let units = advanced_predicates(&BOOK, &descriptors, &QueryLimits::default());
        assert_eq!(units.len(), 2);
        assert_eq!(ids(&catalog(), |b| units[0].evaluate(b)), vec![1, 2]);
        assert!(units[1].is_never());
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let units = advanced_predicates(
            &BOOK,
            &[FilterDescriptor::new("Isbn", FilterOperator::Equals, " , ")],
            &QueryLimits::default(),
        );
        assert!(units.is_empty());
    }
}
