//! Pagination of the event log.
//!
//! The log shows the history newest first. Page numbers are 1-based and
//! always clamped to the pages the current history actually has.

use super::history::ConnectionHistory;
use super::normalize::CanonicalEntry;

/// Events per page.
pub const PAGE_SIZE: usize = 10;

/// A page navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Next,
    Prev,
    First,
    Last,
    Goto(usize),
}

/// Page size and current page of the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Pagination {
    /// Create pagination on page 1. A zero page size is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages needed for `len` entries.
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// Clamp the current page into `[1, max(1, total_pages)]`.
    pub fn clamp(&mut self, len: usize) {
        let last = self.total_pages(len).max(1);
        self.current_page = self.current_page.clamp(1, last);
    }

    /// Apply a navigation request for a history of `len` entries.
    pub fn apply(&mut self, action: PageAction, len: usize) {
        self.current_page = match action {
            PageAction::Next => self.current_page.saturating_add(1),
            PageAction::Prev => self.current_page.saturating_sub(1),
            PageAction::First => 1,
            PageAction::Last => self.total_pages(len),
            PageAction::Goto(page) => page,
        };
        self.clamp(len);
    }

    /// The visible slice of the history for the current page.
    pub fn view<'a>(&self, history: &'a ConnectionHistory) -> PageView<'a> {
        let total = history.len();
        let skip = (self.current_page - 1) * self.page_size;
        let entries: Vec<&CanonicalEntry> =
            history.newest_first().skip(skip).take(self.page_size).collect();

        let (first, last) = if entries.is_empty() {
            (0, 0)
        } else {
            (skip + 1, skip + entries.len())
        };

        PageView {
            entries,
            page: self.current_page,
            total_pages: self.total_pages(total),
            first,
            last,
            total,
        }
    }

    /// Page-number controls for the current page.
    pub fn controls(&self, len: usize) -> PageControls {
        let total_pages = self.total_pages(len);
        PageControls {
            items: page_items(self.current_page, total_pages),
            has_prev: self.current_page > 1,
            has_next: self.current_page < total_pages,
        }
    }
}

/// One page of the event log, newest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    pub entries: Vec<&'a CanonicalEntry>,
    pub page: usize,
    pub total_pages: usize,
    /// 1-based position of the first shown entry ("Showing 11-20 of 23").
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

/// An element of the page-number bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub items: Vec<PageItem>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageControls {
    /// Controls are only worth drawing with more than one page.
    pub fn is_visible(&self) -> bool {
        self.items.len() > 1
    }
}

/// First page, last page and the current page ±1, with an ellipsis for
/// each gap in between.
pub fn page_items(current: usize, total_pages: usize) -> Vec<PageItem> {
    let mut items = Vec::new();
    let mut previous = 0;

    for page in 1..=total_pages {
        let shown = page == 1 || page == total_pages || page.abs_diff(current) <= 1;
        if !shown {
            continue;
        }
        if page > previous + 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(page));
        previous = page;
    }

    items
}
