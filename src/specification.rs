use crate::filtering::{
    FilterDescriptor, FilterOperator, PageRequest, PagingWindow, Predicate, PredicateBuilder, SortKey,
    SortMap, SortOrder,
};
use std::fmt;

/// A composed query plan handed to a [`QueryExecutor`](crate::QueryExecutor).
///
/// The criterion is fixed at construction; filters only accumulate and are
/// AND-ed with it and with each other. At most one ordering is active.
pub struct Specification<T: 'static> {
    criteria: Predicate<T>,
    filters: Vec<Predicate<T>>,
    includes: Vec<String>,
    order: SortOrder<T>,
    paging: Option<PageRequest>,
    split_query: bool,
}

impl<T: 'static> Specification<T> {
    #[must_use]
    pub fn new(criteria: Predicate<T>) -> Self {
        Self {
            criteria,
            filters: Vec::new(),
            includes: Vec::new(),
            order: SortOrder::Unordered,
            paging: None,
            split_query: false,
        }
    }

    /// A specification whose criterion matches everything.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self::new(Predicate::Always)
    }

    /// AND a filter in. `Always` adds nothing and is not stored.
    pub fn add_filter(&mut self, filter: Predicate<T>) -> &mut Self {
        if !filter.is_always() {
            self.filters.push(filter);
        }
        self
    }

    /// AND a filter in if there is one; `None` means "no constraint".
    pub fn add_filter_opt(&mut self, filter: Option<Predicate<T>>) -> &mut Self {
        if let Some(filter) = filter {
            self.add_filter(filter);
        }
        self
    }

    pub fn where_field(
        &mut self,
        builder: &PredicateBuilder<'_, T>,
        path: &str,
        operator: FilterOperator,
        raw: &str,
    ) -> &mut Self {
        self.add_filter(builder.build(path, operator, raw))
    }

    /// AND in a separator-delimited list as one filter unit.
    pub fn where_any(
        &mut self,
        builder: &PredicateBuilder<'_, T>,
        path: &str,
        operator: FilterOperator,
        raw_list: &str,
    ) -> &mut Self {
        self.add_filter_opt(builder.build_list(path, operator, raw_list))
    }

    /// AND in a `[from, to]` range.
    pub fn where_range<S: AsRef<str>>(
        &mut self,
        builder: &PredicateBuilder<'_, T>,
        path: &str,
        bounds: &[Option<S>],
    ) -> &mut Self {
        self.add_filter_opt(builder.build_range(path, bounds))
    }

    /// AND in one unit per advanced-filter group.
    pub fn apply_advanced(
        &mut self,
        builder: &PredicateBuilder<'_, T>,
        descriptors: &[FilterDescriptor],
    ) -> &mut Self {
        for unit in builder.advanced(descriptors) {
            self.add_filter(unit);
        }
        self
    }

    /// Add an eager-load hint. Duplicates are ignored.
    pub fn include(&mut self, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        if !self.includes.iter().any(|existing| existing.eq_ignore_ascii_case(&path)) {
            self.includes.push(path);
        }
        self
    }

    pub fn order_by(&mut self, key: SortKey<T>) -> &mut Self {
        self.order = SortOrder::Ascending(key);
        self
    }

    pub fn order_by_descending(&mut self, key: SortKey<T>) -> &mut Self {
        self.order = SortOrder::Descending(key);
        self
    }

    /// Set the ordering from a raw `sort` parameter; unknown keys fall back to
    /// the map's default.
    pub fn apply_sort(&mut self, sort_map: &SortMap<T>, sort: Option<&str>) -> &mut Self {
        self.order = sort_map.order_for(sort);
        self
    }

    pub fn apply_paging(&mut self, page: PageRequest) -> &mut Self {
        self.paging = Some(page);
        self
    }

    /// Hint that related collections should be loaded in separate queries.
    pub fn as_split_query(&mut self) -> &mut Self {
        self.split_query = true;
        self
    }

    #[must_use]
    pub const fn criteria(&self) -> &Predicate<T> {
        &self.criteria
    }

    #[must_use]
    pub fn filters(&self) -> &[Predicate<T>] {
        &self.filters
    }

    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    #[must_use]
    pub const fn order(&self) -> &SortOrder<T> {
        &self.order
    }

    #[must_use]
    pub const fn page_request(&self) -> Option<PageRequest> {
        self.paging
    }

    #[must_use]
    pub fn paging(&self) -> Option<PagingWindow> {
        self.paging.map(|page| page.window())
    }

    #[must_use]
    pub const fn is_paging_enabled(&self) -> bool {
        self.paging.is_some()
    }

    #[must_use]
    pub const fn is_split_query(&self) -> bool {
        self.split_query
    }

    /// Criterion and filters combined into one AND tree.
    #[must_use]
    pub fn predicate(&self) -> Predicate<T> {
        self.filters
            .iter()
            .cloned()
            .fold(self.criteria.clone(), Predicate::and)
    }

    /// Whether `entity` satisfies the criterion and every filter.
    #[must_use]
    pub fn matches(&self, entity: &T) -> bool {
        self.criteria.evaluate(entity) && self.filters.iter().all(|filter| filter.evaluate(entity))
    }
}

impl<T: 'static> Default for Specification<T> {
    fn default() -> Self {
        Self::unfiltered()
    }
}

impl<T: 'static> fmt::Display for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WHERE {} ORDER BY {}", self.predicate(), self.order)?;
        if let Some(window) = self.paging() {
            write!(f, " SKIP {} TAKE {}", window.skip, window.take)?;
        }
        if !self.includes.is_empty() {
            write!(f, " INCLUDE {}", self.includes.join(", "))?;
        }
        Ok(())
    }
}

impl<T: 'static> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("criteria", &self.criteria)
            .field("filters", &self.filters)
            .field("includes", &self.includes)
            .field("order", &self.order)
            .field("paging", &self.paging)
            .field("split_query", &self.split_query)
            .finish()
    }
}
