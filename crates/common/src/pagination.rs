//! Pagination inputs and the paged-list wrapper returned by listing
//! endpoints.

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to a 0-based page index plus a
    /// per-page count, both as `u64` for the query layer.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per_page: 20 }
    }
}

/// Page of results plus the real total count of the underlying result set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PagedList<T> {
    pub page: u32,
    pub items_per_page: u32,
    pub total_items: u64,
    pub items: Vec<T>,
}

impl<T> PagedList<T> {
    pub fn new(opts: Pagination, total_items: u64, items: Vec<T>) -> Self {
        let (page_idx, per_page) = opts.normalize();
        Self {
            page: (page_idx + 1) as u32,
            items_per_page: per_page as u32,
            total_items,
            items,
        }
    }

    /// Number of pages the total spans at the current page size.
    pub fn total_pages(&self) -> u64 {
        let per = self.items_per_page.max(1) as u64;
        self.total_items.div_ceil(per)
    }
}

#[cfg(test)]
mod tests {
    use super::{PagedList, Pagination};

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn paged_list_reflects_normalized_inputs() {
        let list = PagedList::new(Pagination { page: 0, per_page: 500 }, 42, vec![1, 2, 3]);
        assert_eq!(list.page, 1);
        assert_eq!(list.items_per_page, 100);
        assert_eq!(list.total_items, 42);
        assert_eq!(list.items.len(), 3);
    }

    #[test]
    fn total_pages_rounds_up() {
        let list = PagedList::new(Pagination { page: 1, per_page: 15 }, 31, Vec::<u8>::new());
        assert_eq!(list.total_pages(), 3);
    }
}
