//! Single-page and full-aggregation retrieval over a page-fetch function.

use std::collections::HashSet;
use std::future::Future;

use tracing::Instrument;
use uuid::Uuid;

use super::state::{PaginationState, StopReason};
use crate::cancellation::CancellationToken;
use crate::config::PaginationConfig;
use crate::errors::{ConsistencyError, Result, WebmasterError};
use crate::models::{PageEnvelope, PageRecord};
use crate::validation::validate_page;

/// Validates `page` and performs exactly one fetch.
///
/// The envelope is returned as received: no retry, caching or cross-page
/// duplicate detection happens here.
pub async fn fetch_single_page<E, F, Fut>(page: i64, fetch: F) -> Result<E>
where
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = Result<E>>,
{
    let page = validate_page(page)?;
    fetch(page).await
}

/// Drives repeated single-page requests until the result set is exhausted.
///
/// Pages are requested strictly in order; page `n + 1` is only requested
/// after page `n` has been checked for duplicates. Aggregation is
/// all-or-nothing: any error discards the records gathered so far.
#[derive(Debug, Clone, Default)]
pub struct Paginator<'a> {
    start_page: u64,
    max_pages: Option<u64>,
    cancellation: Option<&'a CancellationToken>,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator starting at page 0 with no page cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a paginator from configuration.
    #[must_use]
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            start_page: config.start_page,
            max_pages: config.max_pages,
            cancellation: None,
        }
    }

    /// Sets the first page requested.
    #[must_use]
    pub fn with_start_page(mut self, page: u64) -> Self {
        self.start_page = page;
        self
    }

    /// Caps the number of pages requested.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u64) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Attaches a cancellation token, if any.
    #[must_use]
    pub fn with_cancellation(mut self, token: Option<&'a CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    /// Fetches every page and concatenates the records.
    ///
    /// Fails with [`ConsistencyError`] if a record's key was already seen on
    /// an earlier page (or earlier on the same page).
    pub async fn collect<E, F, Fut>(&self, mut fetch: F) -> Result<Vec<E::Record>>
    where
        E: PageEnvelope,
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Result<E>>,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "aggregate_pages",
            %run_id,
            start_page = self.start_page,
        );

        async move {
            let mut seen: HashSet<<E::Record as PageRecord>::Key> = HashSet::new();
            let mut records = Vec::new();
            let mut pages_fetched = 0u64;
            let mut state = PaginationState::begin(self.start_page);

            while let PaginationState::FetchingPage(page) = state {
                if self.max_pages.is_some_and(|max| pages_fetched >= max) {
                    state = PaginationState::Done(StopReason::PageLimit);
                    break;
                }
                let envelope = self.fetch_page(&mut fetch, page).await?;
                pages_fetched += 1;

                let total_pages = envelope.total_pages();
                let record_count = envelope.records().len();
                for record in envelope.into_records() {
                    let key = record.dedup_key();
                    if seen.contains(&key) {
                        return Err(ConsistencyError::duplicate_record(
                            page,
                            <E::Record as PageRecord>::describe_key(&key),
                        )
                        .into());
                    }
                    seen.insert(key);
                    records.push(record);
                }

                state = PaginationState::after_page(
                    page,
                    record_count,
                    total_pages,
                    pages_fetched,
                    self.max_pages,
                );
                tracing::debug!(
                    page,
                    record_count,
                    total_pages,
                    next = ?state,
                    "Page consumed"
                );
            }

            if state == PaginationState::Done(StopReason::PageLimit) {
                tracing::warn!(
                    max_pages = ?self.max_pages,
                    "Reached maximum page limit; remaining pages not requested"
                );
            }

            tracing::info!(
                pages_fetched,
                records = records.len(),
                state = ?state,
                "Aggregation complete"
            );
            Ok(records)
        }
        .instrument(span)
        .await
    }

    async fn fetch_page<E, F, Fut>(&self, fetch: &mut F, page: u64) -> Result<E>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Result<E>>,
    {
        let Some(token) = self.cancellation else {
            return fetch(page).await;
        };

        if token.is_cancelled() {
            return Err(WebmasterError::cancelled(token.reason()));
        }

        tokio::select! {
            biased;
            () = token.cancelled() => Err(WebmasterError::cancelled(token.reason())),
            result = fetch(page) => result,
        }
    }
}
