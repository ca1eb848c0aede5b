use crate::{errors::QueryError, filtering::Page, specification::Specification};
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::debug;

/// Runs a [`Specification`] against a store.
///
/// Stores translate the predicate tree, ordering and paging window into
/// their own query language; [`InMemoryStore`] evaluates them directly.
#[async_trait]
pub trait QueryExecutor<T: 'static>: Send + Sync {
    /// Matching entities for the specification's page, plus the total count.
    ///
    /// Unpaged specifications return every match as page 1.
    async fn fetch_page(&self, spec: Specification<T>) -> Result<Page<T>, QueryError>;

    /// Number of entities matching the criterion and filters.
    async fn count(&self, spec: &Specification<T>) -> Result<u64, QueryError>;
}

/// Reference executor over a vector of entities.
#[derive(Debug, Default)]
pub struct InMemoryStore<T> {
    rows: RwLock<Vec<T>>,
}

impl<T: Clone + Send + Sync + 'static> InMemoryStore<T> {
    #[must_use]
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// # Errors
    ///
    /// [`QueryError::Unavailable`] if the store lock is poisoned.
    pub fn insert(&self, row: T) -> Result<(), QueryError> {
        self.rows
            .write()
            .map_err(|_| QueryError::Unavailable("store lock poisoned".to_string()))?
            .push(row);
        Ok(())
    }

    /// # Errors
    ///
    /// [`QueryError::Unavailable`] if the store lock is poisoned.
    pub fn len(&self) -> Result<usize, QueryError> {
        Ok(self.read_rows()?.len())
    }

    /// # Errors
    ///
    /// [`QueryError::Unavailable`] if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, QueryError> {
        Ok(self.read_rows()?.is_empty())
    }

    fn read_rows(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<T>>, QueryError> {
        self.rows
            .read()
            .map_err(|_| QueryError::Unavailable("store lock poisoned".to_string()))
    }

    fn matching(&self, spec: &Specification<T>) -> Result<Vec<T>, QueryError> {
        Ok(self
            .read_rows()?
            .iter()
            .filter(|row| spec.matches(row))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> QueryExecutor<T> for InMemoryStore<T> {
    async fn fetch_page(&self, spec: Specification<T>) -> Result<Page<T>, QueryError> {
        let mut rows = self.matching(&spec)?;
        let total = u64::try_from(rows.len()).unwrap_or(u64::MAX);
        debug!(
            predicate = %spec.predicate(),
            order = %spec.order(),
            window = ?spec.paging(),
            total,
            "executing specification"
        );

        // `sort_by` is stable, so ties keep store order.
        rows.sort_by(|left, right| spec.order().compare(left, right));

        let Some(page) = spec.page_request() else {
            let page_size = u32::try_from(rows.len().max(1)).unwrap_or(u32::MAX);
            return Ok(Page::new(rows, 1, page_size, total));
        };
        let window = page.window();
        let invalid = || QueryError::InvalidWindow {
            skip: window.skip,
            take: window.take,
        };
        let skip = usize::try_from(window.skip).map_err(|_| invalid())?;
        let take = usize::try_from(window.take).map_err(|_| invalid())?;
        let items = rows.into_iter().skip(skip).take(take).collect();
        Ok(Page::new(items, page.page_index(), page.page_size(), total))
    }

    async fn count(&self, spec: &Specification<T>) -> Result<u64, QueryError> {
        let total = self
            .read_rows()?
            .iter()
            .filter(|row| spec.matches(row))
            .count();
        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::QueryLimits,
        filtering::{
            FilterOperator, PageRequest, PredicateBuilder, SortDirection, SortMap,
            fixtures::{BOOK, Book, catalog},
        },
    };

    fn store() -> InMemoryStore<Book> {
        InMemoryStore::new(catalog())
    }

    fn titles(page: &Page<Book>) -> Vec<&str> {
        page.items.iter().map(|b| b.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_unpaged_returns_everything() {
        let page = store().fetch_page(Specification::unfiltered()).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!((page.page_index, page.page_size, page.total_count), (1, 5, 5));
    }

    #[tokio::test]
    async fn test_filter_sort_and_page() {
        let sorts = SortMap::builder(&BOOK)
            .key("Title")
            .default_order("Title", SortDirection::Ascending)
            .build()
            .unwrap();
        let builder = PredicateBuilder::new(&BOOK);
        let mut spec = Specification::unfiltered();
        spec.where_field(&builder, "Price", FilterOperator::GreaterThan, "11")
            .apply_sort(&sorts, Some("-Title"))
            .apply_paging(PageRequest::new(1, 3, &QueryLimits::default()));

        let store = store();
        assert_eq!(store.count(&spec).await.unwrap(), 4);

        let page = store.fetch_page(spec).await.unwrap();
        assert_eq!(titles(&page), vec!["The Guns of August", "Hyperion", "Foundation"]);
        assert_eq!(page.total_count, 4);
        assert!(page.has_next());
        assert_eq!(page.content_range("books"), "books 0-2/4");
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let mut spec = Specification::<Book>::unfiltered();
        spec.apply_paging(PageRequest::new(9, 10, &QueryLimits::default()));
        let page = store().fetch_page(spec).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 5);
        assert_eq!(page.content_range("books"), "books */5");
    }

    #[tokio::test]
    async fn test_insert_is_visible() {
        let store = InMemoryStore::new(Vec::new());
        assert!(store.is_empty().unwrap());
        store.insert(catalog().remove(0)).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.count(&Specification::unfiltered()).await.unwrap(), 1);
    }
}
