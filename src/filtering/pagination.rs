use crate::config::{DEFAULT_PAGE_SIZE, QueryLimits};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// 1-based page index and page size, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page_index: u32,
    page_size: u32,
}

impl PageRequest {
    /// Clamp the index to at least 1 and the size to `1..=max_page_size`.
    #[must_use]
    pub fn new(page_index: u32, page_size: u32, limits: &QueryLimits) -> Self {
        Self {
            page_index: page_index.max(1),
            page_size: page_size.clamp(1, limits.max_page_size.max(1)),
        }
    }

    /// Build from optional caller input, using the configured defaults.
    #[must_use]
    pub fn from_params(page_index: Option<u32>, page_size: Option<u32>, limits: &QueryLimits) -> Self {
        Self::new(
            page_index.unwrap_or(1),
            page_size.unwrap_or(limits.default_page_size),
            limits,
        )
    }

    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page_index
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn skip(&self) -> u64 {
        u64::from(self.page_index - 1) * u64::from(self.page_size)
    }

    #[must_use]
    pub fn take(&self) -> u64 {
        u64::from(self.page_size)
    }

    #[must_use]
    pub fn window(&self) -> PagingWindow {
        PagingWindow {
            skip: self.skip(),
            take: self.take(),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Rows to skip and take, as handed to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PagingWindow {
    pub skip: u64,
    pub take: u64,
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, page_index: u32, page_size: u32, total_count: u64) -> Self {
        Self {
            items,
            page_index,
            page_size,
            total_count,
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page_index) < self.total_pages()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }

    /// `Content-Range` value for this page, e.g. `items 0-9/42`, or
    /// `items */42` when the page is empty. Control characters are stripped
    /// from the resource name.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> String {
        let safe_name = sanitize_resource_name(resource_name);
        let total = self.total_count;
        if self.items.is_empty() {
            return format!("{safe_name} */{total}");
        }
        let first = u64::from(self.page_index.saturating_sub(1)).saturating_mul(u64::from(self.page_size));
        let count = u64::try_from(self.items.len()).unwrap_or(u64::MAX);
        let last = first.saturating_add(count - 1);
        format!("{safe_name} {first}-{last}/{total}")
    }
}
