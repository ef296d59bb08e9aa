//! Pagination helper for LIMIT/OFFSET queries.

/// One page of records together with page-position accessors.
///
/// Page numbers are 1-indexed. `pages_count` is `ceil(total / per_page)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub number: i64,
    pub pages_count: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Builds a page from a total record count and the fetched slice.
    ///
    /// # Panics
    ///
    /// Panics if `per_page < 1`; the page size comes from validated config.
    pub fn new(number: i64, total: i64, per_page: i64, items: Vec<T>) -> Self {
        assert!(per_page >= 1, "there must be at least one record per page");

        Self {
            number,
            pages_count: (total + per_page - 1) / per_page,
            items,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.pages_count
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_number(&self) -> i64 {
        debug_assert!(self.has_next());
        self.number + 1
    }

    pub fn previous_number(&self) -> i64 {
        debug_assert!(self.has_previous());
        self.number - 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Converts a 1-indexed page number into a SQL offset.
pub fn page_offset(number: i64, per_page: i64) -> i64 {
    (number - 1) * per_page
}
