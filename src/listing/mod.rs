//! Filter, search and paginate a collection already fetched from the backend.
//!
//! Every list screen runs the same pipeline: a case-insensitive substring
//! search over designated text fields, AND-ed with a categorical filter,
//! then a fixed-size page window over the result. The input order is kept.
//!
//! Changing the search term or the filter always puts the list back on
//! page 1, and deriving a view clamps the current page into range.

pub mod status;

use chrono::{DateTime, Utc};
use std::ops::Range;

pub use status::{days_remaining, derive_status, BorrowStatus, DUE_SOON_DAYS};

/// Records that can be matched by a free-text search.
pub trait Searchable {
    /// Text fields the search term is matched against
    fn search_fields(&self) -> Vec<&str>;
}

/// Categorical filter over records of type `T`.
pub trait RecordFilter<T> {
    fn matches(&self, record: &T, now: DateTime<Utc>) -> bool;
}

/// Filter that lets everything through, for screens with search only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilter;

impl<T> RecordFilter<T> for NoFilter {
    fn matches(&self, _record: &T, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Where the search term is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Matched client-side against `Searchable::search_fields`
    #[default]
    Local,
    /// Sent to the backend with the fetch; not re-applied locally
    Remote,
}

pub fn matches_search<T: Searchable>(record: &T, term: &str) -> bool {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// `ceil(len / page_size)`; zero records means zero pages.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Index window `[(page-1)*size, page*size)` cut to `len`.
pub fn page_bounds(page: usize, page_size: usize, len: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Per-screen search, filter and page state.
#[derive(Debug, Clone)]
pub struct ListState<F> {
    search: String,
    filter: F,
    page: usize,
    page_size: usize,
    search_mode: SearchMode,
}

impl<F: Default> ListState<F> {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            filter: F::default(),
            page: 1,
            page_size: page_size.max(1),
            search_mode: SearchMode::Local,
        }
    }
}

impl<F> ListState<F> {
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
        self.page = 1;
    }

    /// Change part of a compound filter in place.
    pub fn update_filter(&mut self, update: impl FnOnce(&mut F)) {
        update(&mut self.filter);
        self.page = 1;
    }

    /// Request a page. Out-of-range values are clamped by the next `view`.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Derive the filtered sequence and the current page window.
    pub fn view<'a, T>(&mut self, records: &'a [T], now: DateTime<Utc>) -> ListView<'a, T>
    where
        T: Searchable,
        F: RecordFilter<T>,
    {
        let filtered: Vec<&'a T> = records
            .iter()
            .filter(|record| {
                let search_ok = match self.search_mode {
                    SearchMode::Local => matches_search(*record, &self.search),
                    SearchMode::Remote => true,
                };
                search_ok && self.filter.matches(record, now)
            })
            .collect();

        let total_pages = total_pages(filtered.len(), self.page_size);
        self.page = clamp_page(self.page, total_pages);

        ListView {
            filtered,
            page: self.page,
            page_size: self.page_size,
            total_pages,
        }
    }
}

/// Output of one derivation.
#[derive(Debug)]
pub struct ListView<'a, T> {
    filtered: Vec<&'a T>,
    page: usize,
    page_size: usize,
    total_pages: usize,
}

impl<'a, T> ListView<'a, T> {
    pub fn filtered(&self) -> &[&'a T] {
        &self.filtered
    }

    pub fn page_slice(&self) -> &[&'a T] {
        &self.filtered[page_bounds(self.page, self.page_size, self.filtered.len())]
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn total_matches(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: usize,
        title: String,
        author: String,
        tag: &'static str,
    }

    impl Searchable for Item {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.title.as_str(), self.author.as_str()]
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TagFilter(Option<&'static str>);

    impl RecordFilter<Item> for TagFilter {
        fn matches(&self, record: &Item, _now: DateTime<Utc>) -> bool {
            self.0.map_or(true, |tag| record.tag == tag)
        }
    }

    fn items(n: usize) -> Vec<Item> {
        (1..=n)
            .map(|id| Item {
                id,
                title: format!("Title {}", id),
                author: if id % 3 == 0 { "Harry Lime".into() } else { "Anon".into() },
                tag: if id % 2 == 0 { "even" } else { "odd" },
            })
            .collect()
    }

    #[test]
    fn test_fourteen_records_three_pages() {
        let records = items(14);
        let mut state: ListState<NoFilter> = ListState::new(6);
        state.set_page(3);

        let view = state.view(&records, Utc::now());
        assert_eq!(view.total_pages(), 3);
        let ids: Vec<usize> = view.page_slice().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![13, 14]);
    }

    #[test]
    fn test_pages_reconstruct_filtered_sequence() {
        let records = items(23);
        for page_size in 1..=9 {
            let mut state: ListState<TagFilter> = ListState::new(page_size);
            state.set_filter(TagFilter(Some("odd")));
            let view = state.view(&records, Utc::now());
            let filtered: Vec<usize> = view.filtered().iter().map(|i| i.id).collect();
            let pages = view.total_pages();
            assert_eq!(pages, total_pages(filtered.len(), page_size));

            let mut joined = Vec::new();
            for page in 1..=pages {
                state.set_page(page);
                let view = state.view(&records, Utc::now());
                joined.extend(view.page_slice().iter().map(|i| i.id));
            }
            assert_eq!(joined, filtered, "page size {}", page_size);
        }
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let records = items(5);
        let mut state: ListState<NoFilter> = ListState::new(6);
        state.set_search("no such title");
        let view = state.view(&records, Utc::now());

        assert!(view.is_empty());
        assert_eq!(view.total_pages(), 0);
        assert!(view.page_slice().is_empty());
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_search_and_filter_reset_page() {
        let mut state: ListState<TagFilter> = ListState::new(6);

        state.set_page(4);
        state.set_search("title");
        assert_eq!(state.page(), 1);

        state.set_page(4);
        state.set_filter(TagFilter(Some("even")));
        assert_eq!(state.page(), 1);

        state.set_page(4);
        state.update_filter(|f| f.0 = None);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let records = items(10);
        let mut state: ListState<NoFilter> = ListState::new(8);
        state.set_search("HARRY");
        let view = state.view(&records, Utc::now());
        let ids: Vec<usize> = view.filtered().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 6, 9]);
    }

    #[test]
    fn test_search_idempotent() {
        let records = items(12);
        let mut state: ListState<NoFilter> = ListState::new(6);
        state.set_search("lime");
        let once: Vec<Item> = state
            .view(&records, Utc::now())
            .filtered()
            .iter()
            .map(|i| (*i).clone())
            .collect();

        state.set_search("lime");
        let twice: Vec<Item> = state
            .view(&once, Utc::now())
            .filtered()
            .iter()
            .map(|i| (*i).clone())
            .collect();
        assert_eq!(once.len(), 4);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_page_clamped_when_result_shrinks() {
        let records = items(20);
        let mut state: ListState<NoFilter> = ListState::new(6);
        state.set_page(4);
        assert_eq!(state.view(&records, Utc::now()).page(), 4);

        let fewer = &records[..7];
        let view = state.view(fewer, Utc::now());
        assert_eq!(view.page(), 2);
        assert_eq!(state.page(), 2);
        assert_eq!(view.page_slice().len(), 1);
    }

    #[test]
    fn test_remote_search_not_reapplied() {
        let records = items(4);
        let mut state: ListState<NoFilter> =
            ListState::new(8).with_search_mode(SearchMode::Remote);
        state.set_search("matched by the server on another field");
        assert_eq!(state.view(&records, Utc::now()).total_matches(), 4);
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(1, 6, 14), 0..6);
        assert_eq!(page_bounds(3, 6, 14), 12..14);
        assert_eq!(page_bounds(5, 6, 14), 14..14);
    }
}
