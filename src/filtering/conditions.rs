use super::{FilterOperator, Predicate, all_of, any_of, predicate::Comparison};
use crate::{
    config::QueryLimits,
    errors::FilterError,
    fields::{Collation, EntitySchema, Value, coerce},
};
use tracing::debug;

/// Literal accepted as "no value" for nullable fields.
const NULL_LITERAL: &str = "null";

/// Turns `(field path, operator, raw value)` into predicates over `T`.
///
/// [`build`](Self::build) and the list/range helpers never fail: anything that
/// cannot be built (unknown path, bad value, unsupported operator, oversized
/// input) becomes [`Predicate::Never`] and is logged at `debug` level.
/// [`try_build`](Self::try_build) reports the reason instead.
pub struct PredicateBuilder<'a, T: 'static> {
    schema: &'a EntitySchema<T>,
    max_value_length: usize,
    separator: char,
    collation: Option<Collation>,
}

impl<T: 'static> Clone for PredicateBuilder<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for PredicateBuilder<'_, T> {}

impl<'a, T: 'static> PredicateBuilder<'a, T> {
    #[must_use]
    pub fn new(schema: &'a EntitySchema<T>) -> Self {
        let limits = QueryLimits::default();
        Self {
            schema,
            max_value_length: limits.max_value_length,
            separator: limits.list_separator,
            collation: None,
        }
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: &QueryLimits) -> Self {
        self.max_value_length = limits.max_value_length;
        self.separator = limits.list_separator;
        self
    }

    /// Compare text without regard to case, whatever the field declares.
    #[must_use]
    pub const fn ignoring_case(mut self) -> Self {
        self.collation = Some(Collation::IgnoreCase);
        self
    }

    /// A builder over a related entity's schema with the same limits and
    /// collation, for predicates nested in one-to-many traversals.
    #[must_use]
    pub fn with_schema<'b, U: 'static>(&self, schema: &'b EntitySchema<U>) -> PredicateBuilder<'b, U> {
        PredicateBuilder {
            schema,
            max_value_length: self.max_value_length,
            separator: self.separator,
            collation: self.collation,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a EntitySchema<T> {
        self.schema
    }

    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Build a single comparison.
    ///
    /// For nullable fields, `Equals`/`NotEqualsTo` with the literal `null`
    /// test for absence.
    ///
    /// # Errors
    ///
    /// - [`FilterError::ValueTooLong`] if `raw` exceeds the configured length
    /// - [`FilterError::UnknownField`] if `path` does not resolve
    /// - [`FilterError::UnsupportedOperator`] for ordering on boolean or UUID fields
    /// - [`FilterError::Coercion`] if `raw` does not parse as the field's kind
    pub fn try_build(
        &self,
        path: &str,
        operator: FilterOperator,
        raw: &str,
    ) -> Result<Predicate<T>, FilterError> {
        if raw.chars().count() > self.max_value_length {
            return Err(FilterError::ValueTooLong {
                limit: self.max_value_length,
            });
        }

        let accessor = self
            .schema
            .resolve(path)
            .ok_or_else(|| FilterError::UnknownField {
                path: path.to_string(),
            })?;

        if !operator.supports(accessor.kind()) {
            return Err(FilterError::UnsupportedOperator {
                operator,
                kind: accessor.kind(),
            });
        }

        let tests_absence = accessor.is_nullable()
            && matches!(operator, FilterOperator::Equals | FilterOperator::NotEqualsTo)
            && raw.trim().eq_ignore_ascii_case(NULL_LITERAL);
        let operand = if tests_absence {
            Value::Null
        } else {
            coerce(raw, accessor.kind())?
        };

        let accessor = match self.collation {
            Some(collation) => accessor.with_collation(collation),
            None => accessor,
        };
        Ok(Predicate::Compare(Comparison::new(accessor, operator, operand)))
    }

    /// Build a single comparison, matching nothing if it cannot be built.
    #[must_use]
    pub fn build(&self, path: &str, operator: FilterOperator, raw: &str) -> Predicate<T> {
        self.try_build(path, operator, raw).unwrap_or_else(|error| {
            debug!(field = path, %operator, %error, "filter cannot be built, matching nothing");
            Predicate::Never
        })
    }

    /// Like [`build`](Self::build) with an explicit text collation.
    #[must_use]
    pub fn build_with_collation(
        &self,
        path: &str,
        operator: FilterOperator,
        raw: &str,
        collation: Collation,
    ) -> Predicate<T> {
        Self {
            collation: Some(collation),
            ..*self
        }
        .build(path, operator, raw)
    }

    /// Build one filter unit from a separator-delimited list such as
    /// `isbn=A,B,C`.
    ///
    /// Items are trimmed and blanks dropped. `Includes`/`Equals` items are
    /// OR-ed, `NotEqualsTo` items AND-ed; ordering operators take the value
    /// whole. `None` means no usable value was given and the filter should be
    /// skipped.
    #[must_use]
    pub fn build_list(&self, path: &str, operator: FilterOperator, raw_list: &str) -> Option<Predicate<T>> {
        self.build_lists(path, operator, &[raw_list])
    }

    /// [`build_list`](Self::build_list) over several raw lists, e.g. a
    /// repeated query key, combined into one unit.
    #[must_use]
    pub fn build_lists<S: AsRef<str>>(
        &self,
        path: &str,
        operator: FilterOperator,
        raw_lists: &[S],
    ) -> Option<Predicate<T>> {
        let items: Vec<&str> = raw_lists
            .iter()
            .flat_map(|raw| self.split(raw.as_ref(), operator))
            .collect();
        let predicates = items
            .into_iter()
            .map(|item| self.build(path, operator, item));
        combine(operator, predicates)
    }

    /// Build a `[from, to]` range filter: index 0 is an inclusive lower bound,
    /// index 1 an inclusive upper bound. Either end may be absent or blank.
    #[must_use]
    pub fn build_range<S: AsRef<str>>(&self, path: &str, bounds: &[Option<S>]) -> Option<Predicate<T>> {
        let bound = |position: usize| {
            bounds
                .get(position)
                .and_then(Option::as_ref)
                .map(|raw| raw.as_ref().trim())
                .filter(|raw| !raw.is_empty())
        };
        let lower = bound(0).map(|raw| self.build(path, FilterOperator::GreaterThanOrEqualsTo, raw));
        let upper = bound(1).map(|raw| self.build(path, FilterOperator::LessThanOrEqualsTo, raw));
        all_of(lower.into_iter().chain(upper))
    }

    fn split<'s>(&self, raw: &'s str, operator: FilterOperator) -> Vec<&'s str> {
        if operator.accepts_lists() {
            split_list(raw, self.separator).collect()
        } else {
            Some(raw.trim()).filter(|item| !item.is_empty()).into_iter().collect()
        }
    }
}

/// Split, trim and drop blank items.
pub fn split_list(raw: &str, separator: char) -> impl Iterator<Item = &str> {
    raw.split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Combine the predicates of one filter unit. `Includes`/`Equals` are
/// membership tests and OR together; exclusions and ordering bounds AND.
pub(crate) fn combine<T>(
    operator: FilterOperator,
    predicates: impl IntoIterator<Item = Predicate<T>>,
) -> Option<Predicate<T>> {
    match operator {
        FilterOperator::Includes | FilterOperator::Equals => any_of(predicates),
        _ => all_of(predicates),
    }
}
