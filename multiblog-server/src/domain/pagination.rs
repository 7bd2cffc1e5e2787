pub(crate) const DEFAULT_PER_PAGE: u32 = 10;
pub(crate) const MAX_PER_PAGE: u32 = 100;

/// Clamped page request: `page >= 1`, `1 <= per_page <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub(crate) page: u32,
    pub(crate) per_page: u32,
}

impl PageRequest {
    pub(crate) fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = match per_page {
            None | Some(0) => DEFAULT_PER_PAGE,
            Some(value) => value.min(MAX_PER_PAGE),
        };
        Self { page, per_page }
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of items plus the numbers needed to render pagination.
#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total: total.max(0),
        }
    }

    pub(crate) fn total_pages(&self) -> u32 {
        total_pages(self.total, self.per_page)
    }

    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

pub(crate) fn total_pages(total: i64, per_page: u32) -> u32 {
    if total <= 0 || per_page == 0 {
        return 0;
    }
    let per_page = i64::from(per_page);
    let pages = (total + per_page - 1) / per_page;
    u32::try_from(pages).unwrap_or(u32::MAX)
}
