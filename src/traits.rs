use crate::{
    config::QueryLimits,
    fields::EntitySchema,
    filtering::{PredicateBuilder, SortMap, search_criteria},
    models::{NoFilters, QueryParams},
    specification::Specification,
};
use tracing::debug;

/// An entity that can be listed through [`build_specification`].
///
/// Implementors keep their schema and sort map in `LazyLock` statics and hand
/// out `'static` references.
pub trait QueryResource: Sized + Send + Sync + 'static {
    /// Used in logs and `Content-Range` headers.
    const RESOURCE_NAME: &'static str;
    /// Ask the store to load related collections in separate queries.
    const SPLIT_QUERY: bool = false;

    fn schema() -> &'static EntitySchema<Self>;

    fn sort_map() -> &'static SortMap<Self>;

    /// Field paths matched by the free-text `search` parameter.
    fn searchable_fields() -> &'static [&'static str] {
        &[]
    }

    /// Relations eager-loaded for every list query.
    fn default_includes() -> &'static [&'static str] {
        &[]
    }
}

/// Entity-specific simple filters (`?isbn=...&status=...`).
///
/// Each present parameter adds one filter unit to the specification; absent
/// or blank parameters add nothing.
pub trait SimpleFilters<T: 'static> {
    fn apply(&self, builder: &PredicateBuilder<'_, T>, spec: &mut Specification<T>);
}

impl<T: 'static> SimpleFilters<T> for NoFilters {
    fn apply(&self, _builder: &PredicateBuilder<'_, T>, _spec: &mut Specification<T>) {}
}

/// Compose a list query for `T` from decoded parameters.
///
/// Order of composition: search criterion, simple filters, advanced filters,
/// sort, paging, default includes.
#[must_use]
pub fn build_specification<T, F>(params: &QueryParams<F>, limits: &QueryLimits) -> Specification<T>
where
    T: QueryResource,
    F: SimpleFilters<T>,
{
    let schema = T::schema();
    let criteria = search_criteria(
        schema,
        T::searchable_fields(),
        params.search.search.as_deref(),
        limits,
    );
    let builder = PredicateBuilder::new(schema).with_limits(limits);

    let mut spec = Specification::new(criteria);
    params.filters.apply(&builder, &mut spec);
    spec.apply_advanced(&builder, &params.filter_descriptors())
        .apply_sort(T::sort_map(), params.search.sort.as_deref())
        .apply_paging(params.page_request(limits));
    for include in T::default_includes() {
        spec.include(*include);
    }
    if T::SPLIT_QUERY {
        spec.as_split_query();
    }

    debug!(resource = T::RESOURCE_NAME, filters = spec.filters().len(), "specification built");
    spec
}

/// `Some(trimmed)` for a present, non-blank parameter.
pub(crate) fn non_blank(raw: Option<&String>) -> Option<&str> {
    raw.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

/// The present entries of a repeated list parameter.
pub(crate) fn present_values(raw: &[Option<String>]) -> Vec<&str> {
    raw.iter().flatten().map(String::as_str).collect()
}
