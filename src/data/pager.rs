use tracing::debug;

use super::filters::FilteredView;
use super::trip_struct::TripRecord;

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    /// Next page starts at this position in the view.
    Ready(usize),
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page<'v, 'a> {
    Rows {
        /// Position of the first row within the view.
        offset: usize,
        rows: &'v [&'a TripRecord],
    },
    NoMoreData,
}

/// Forward-only cursor handing out fixed-size slices of a view.
#[derive(Debug)]
pub struct Pager<'v, 'a> {
    view: &'v FilteredView<'a>,
    page_size: usize,
    state: PagerState,
}

impl<'v, 'a> Pager<'v, 'a> {
    pub fn new(view: &'v FilteredView<'a>) -> Self {
        Self::with_page_size(view, DEFAULT_PAGE_SIZE)
    }

    /// A page size of zero is treated as one.
    pub fn with_page_size(view: &'v FilteredView<'a>, page_size: usize) -> Self {
        Self {
            view,
            page_size: page_size.max(1),
            state: PagerState::Ready(0),
        }
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == PagerState::Exhausted
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Advances the cursor. The last non-empty page moves the pager to
    /// `Exhausted`; every call after that yields `NoMoreData`.
    pub fn next_page(&mut self) -> Page<'v, 'a> {
        let PagerState::Ready(cursor) = self.state else {
            return Page::NoMoreData;
        };

        let view: &'v FilteredView<'a> = self.view;
        let records = view.records();
        let total = records.len();

        let page = if cursor + self.page_size < total {
            self.state = PagerState::Ready(cursor + self.page_size);
            Page::Rows {
                offset: cursor,
                rows: &records[cursor..cursor + self.page_size],
            }
        } else if total > cursor {
            self.state = PagerState::Exhausted;
            Page::Rows {
                offset: cursor,
                rows: &records[cursor..],
            }
        } else {
            self.state = PagerState::Exhausted;
            Page::NoMoreData
        };

        debug!(cursor, total, state = ?self.state, "page served");
        page
    }

    /// Ends paging without serving anything else.
    pub fn stop(&mut self) {
        self.state = PagerState::Exhausted;
    }
}
