//! State machine for a multi-page retrieval.

use serde::{Deserialize, Serialize};

/// Why an aggregation stopped requesting pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The last page fetched carried no records.
    EmptyPage,
    /// The next page index reached the reported `total_pages`.
    ReportedLastPage,
    /// The configured page cap was reached.
    PageLimit,
}

/// Progress of one aggregation.
///
/// A duplicate record or a failed fetch ends the retrieval with an error
/// instead of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationState {
    /// Nothing requested yet.
    Start,
    /// The given page is about to be requested.
    FetchingPage(u64),
    /// No further pages will be requested.
    Done(StopReason),
}

impl PaginationState {
    /// Leaves `Start` for the first page.
    #[must_use]
    pub fn begin(start_page: u64) -> Self {
        Self::FetchingPage(start_page)
    }

    /// Decides the next state once `page` has been accumulated.
    ///
    /// The empty-page check runs first: `total_pages` is advisory and may be
    /// too low, too high or zero.
    #[must_use]
    pub fn after_page(
        page: u64,
        record_count: usize,
        total_pages: u64,
        pages_fetched: u64,
        max_pages: Option<u64>,
    ) -> Self {
        if record_count == 0 {
            return Self::Done(StopReason::EmptyPage);
        }
        let next = page.saturating_add(1);
        if next >= total_pages {
            return Self::Done(StopReason::ReportedLastPage);
        }
        if max_pages.is_some_and(|max| pages_fetched >= max) {
            return Self::Done(StopReason::PageLimit);
        }
        Self::FetchingPage(next)
    }

    /// Whether the retrieval has finished.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin() {
        assert_eq!(PaginationState::begin(0), PaginationState::FetchingPage(0));
        assert!(!PaginationState::Start.is_terminal());
    }

    #[test]
    fn test_empty_page_wins_over_total_pages() {
        let state = PaginationState::after_page(0, 0, 10, 1, None);
        assert_eq!(state, PaginationState::Done(StopReason::EmptyPage));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_reported_last_page() {
        assert_eq!(
            PaginationState::after_page(1, 3, 2, 2, None),
            PaginationState::Done(StopReason::ReportedLastPage)
        );
        // A zero total with data still ends after the first page.
        assert_eq!(
            PaginationState::after_page(0, 3, 0, 1, None),
            PaginationState::Done(StopReason::ReportedLastPage)
        );
    }

    #[test]
    fn test_continue() {
        assert_eq!(
            PaginationState::after_page(0, 3, 2, 1, None),
            PaginationState::FetchingPage(1)
        );
    }

    #[test]
    fn test_page_limit() {
        assert_eq!(
            PaginationState::after_page(4, 3, 100, 5, Some(5)),
            PaginationState::Done(StopReason::PageLimit)
        );
        assert_eq!(
            PaginationState::after_page(3, 3, 100, 4, Some(5)),
            PaginationState::FetchingPage(4)
        );
    }

    #[test]
    fn test_page_index_does_not_overflow() {
        assert_eq!(
            PaginationState::after_page(u64::MAX, 1, u64::MAX, 1, None),
            PaginationState::Done(StopReason::ReportedLastPage)
        );
    }
}
