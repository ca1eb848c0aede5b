use super::{FilterOperator, Predicate, PredicateBuilder, any_of};
use crate::{config::QueryLimits, fields::EntitySchema};
use tracing::debug;

/// Cut `term` to at most `max_chars` characters without splitting a character.
fn truncate_chars(term: &str, max_chars: usize) -> &str {
    match term.char_indices().nth(max_chars) {
        Some((end, _)) => &term[..end],
        None => term,
    }
}

/// Build the root criterion for a free-text search term.
///
/// A missing or blank term matches everything. Otherwise the (trimmed,
/// length-capped) term is matched as a substring against each of `fields`
/// and the matches are OR-ed.
#[must_use]
pub fn search_criteria<T: 'static>(
    schema: &EntitySchema<T>,
    fields: &[&str],
    term: Option<&str>,
    limits: &QueryLimits,
) -> Predicate<T> {
    let Some(term) = term.map(str::trim).filter(|term| !term.is_empty()) else {
        return Predicate::Always;
    };
    let term = truncate_chars(term, limits.max_search_length).trim_end();

    if fields.is_empty() {
        debug!(entity = schema.name(), "entity declares no searchable fields, ignoring search term");
        return Predicate::Always;
    }

    let limits = QueryLimits {
        max_value_length: limits.max_search_length,
        ..limits.clone()
    };
    // Free-text search ignores case on every field, whatever the field declares.
    let builder = PredicateBuilder::new(schema).with_limits(&limits).ignoring_case();
    any_of(
        fields
            .iter()
            .map(|field| builder.build(field, FilterOperator::Includes, term)),
    )
    .unwrap_or(Predicate::Never)
}
