//! Link analysis operations over a site.

use std::sync::Arc;

use crate::cancellation::CancellationToken;
use crate::config::PaginationConfig;
use crate::errors::{Result, WebmasterError};
use crate::models::{ConnectedPage, LinkCount, LinkCounts, LinkDetail, LinkDetails};
use crate::pagination::{fetch_single_page, Paginator};
use crate::protocols::LinkDataFetcher;
use crate::validation::validate_url_field;

/// Public link-graph operations built on a [`LinkDataFetcher`].
///
/// Every input is validated before the fetcher is called. The service keeps
/// no state between calls; clones share the same fetcher.
#[derive(Clone)]
pub struct LinkAnalysisService {
    fetcher: Arc<dyn LinkDataFetcher>,
    pagination: PaginationConfig,
}

impl LinkAnalysisService {
    /// Creates a service with default pagination settings.
    #[must_use]
    pub fn new(fetcher: Arc<dyn LinkDataFetcher>) -> Self {
        Self {
            fetcher,
            pagination: PaginationConfig::default(),
        }
    }

    /// Sets the pagination settings used by the `get_all_*` operations.
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Returns the pagination settings.
    #[must_use]
    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// Retrieves one page of inbound-link counts for a site.
    ///
    /// A page past the end yields an empty `links` list. `total_pages` is
    /// returned exactly as the service reported it.
    pub async fn get_link_counts(&self, site_url: &str, page: i64) -> Result<LinkCounts> {
        validate_url_field("site_url", site_url)?;
        let fetcher = self.fetcher.as_ref();
        fetch_single_page(page, move |page| async move {
            fetcher
                .fetch_link_counts_page(site_url, page)
                .await
                .map_err(WebmasterError::from)
        })
        .await
    }

    /// Retrieves one page of inbound links, with anchor text, for `link`.
    pub async fn get_url_links(&self, site_url: &str, link: &str, page: i64) -> Result<LinkDetails> {
        validate_url_field("site_url", site_url)?;
        validate_url_field("link", link)?;
        let fetcher = self.fetcher.as_ref();
        fetch_single_page(page, move |page| async move {
            fetcher
                .fetch_url_links_page(site_url, link, page)
                .await
                .map_err(WebmasterError::from)
        })
        .await
    }

    /// Retrieves every page of inbound-link counts for a site.
    ///
    /// Fails with a consistency error if two pages return the same URL.
    pub async fn get_all_link_counts(
        &self,
        site_url: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<LinkCount>> {
        validate_url_field("site_url", site_url)?;
        let fetcher = self.fetcher.as_ref();
        Paginator::from_config(&self.pagination)
            .with_cancellation(cancel)
            .collect(move |page| async move {
                fetcher
                    .fetch_link_counts_page(site_url, page)
                    .await
                    .map_err(WebmasterError::from)
            })
            .await
    }

    /// Retrieves every page of inbound links for `link`.
    ///
    /// Fails with a consistency error if two pages return the same
    /// (url, anchor text) pair.
    pub async fn get_all_url_links(
        &self,
        site_url: &str,
        link: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<LinkDetail>> {
        validate_url_field("site_url", site_url)?;
        validate_url_field("link", link)?;
        let fetcher = self.fetcher.as_ref();
        Paginator::from_config(&self.pagination)
            .with_cancellation(cancel)
            .collect(move |page| async move {
                fetcher
                    .fetch_url_links_page(site_url, link, page)
                    .await
                    .map_err(WebmasterError::from)
            })
            .await
    }

    /// Connects `master_url` to the site.
    ///
    /// The association becomes visible eventually; an immediate
    /// [`LinkAnalysisService::get_connected_pages`] may not include it yet.
    pub async fn add_connected_page(&self, site_url: &str, master_url: &str) -> Result<()> {
        validate_url_field("site_url", site_url)?;
        validate_url_field("master_url", master_url)?;
        self.fetcher.add_connected_page(site_url, master_url).await?;
        tracing::debug!(site_url, master_url, "Connected page submitted");
        Ok(())
    }

    /// Lists the pages connected to a site.
    pub async fn get_connected_pages(&self, site_url: &str) -> Result<Vec<ConnectedPage>> {
        validate_url_field("site_url", site_url)?;
        Ok(self.fetcher.fetch_connected_pages(site_url).await?)
    }
}

impl std::fmt::Debug for LinkAnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkAnalysisService")
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConsistencyErrorKind, RemoteError, ValidationErrorKind};
    use crate::protocols::MockLinkDataFetcher;
    use crate::testing::{link_counts_page, link_details_page, InMemoryBackend, RecordedCall};
    use pretty_assertions::assert_eq;

    const SITE: &str = "http://site.com";

    fn service(backend: InMemoryBackend) -> (LinkAnalysisService, Arc<InMemoryBackend>) {
        let backend = Arc::new(backend);
        (LinkAnalysisService::new(backend.clone()), backend)
    }

    fn assert_validation(err: WebmasterError, kind: ValidationErrorKind, field: &str) {
        match err {
            WebmasterError::Validation(e) => {
                assert_eq!(e.kind, kind);
                assert_eq!(e.field, field);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_negative_page_rejected_before_network() {
        let mut mock = MockLinkDataFetcher::new();
        mock.expect_fetch_link_counts_page().never();
        mock.expect_fetch_url_links_page().never();
        let service = LinkAnalysisService::new(Arc::new(mock));

        for page in [-1, -2, i64::MIN] {
            let err = service.get_link_counts(SITE, page).await.unwrap_err();
            assert_validation(err, ValidationErrorKind::InvalidRange, "page");

            let err = service.get_url_links(SITE, SITE, page).await.unwrap_err();
            assert_validation(err, ValidationErrorKind::InvalidRange, "page");
        }
    }

    #[tokio::test]
    async fn test_malformed_urls_rejected_before_network() {
        let mut mock = MockLinkDataFetcher::new();
        mock.expect_fetch_link_counts_page().never();
        mock.expect_fetch_url_links_page().never();
        mock.expect_add_connected_page().never();
        mock.expect_fetch_connected_pages().never();
        let service = LinkAnalysisService::new(Arc::new(mock));

        let err = service.get_link_counts("site.com", 0).await.unwrap_err();
        assert_validation(err, ValidationErrorKind::InvalidFormat, "site_url");

        let err = service.get_url_links(SITE, "/relative", 0).await.unwrap_err();
        assert_validation(err, ValidationErrorKind::InvalidFormat, "link");

        let err = service.get_all_link_counts("ftp://site.com", None).await.unwrap_err();
        assert_validation(err, ValidationErrorKind::InvalidFormat, "site_url");

        let err = service.add_connected_page(SITE, "master.com").await.unwrap_err();
        assert_validation(err, ValidationErrorKind::InvalidFormat, "master_url");

        let err = service.get_connected_pages("").await.unwrap_err();
        assert_validation(err, ValidationErrorKind::InvalidFormat, "site_url");
    }

    #[tokio::test]
    async fn test_get_link_counts_returns_envelope_unchanged() {
        let mut mock = MockLinkDataFetcher::new();
        mock.expect_fetch_link_counts_page()
            .withf(|site, page| site == SITE && *page == 0)
            .times(1)
            .returning(|_, _| Ok(link_counts_page(7, &[("http://a.com", 5)])));
        let service = LinkAnalysisService::new(Arc::new(mock));

        let page = service.get_link_counts(SITE, 0).await.unwrap();
        assert_eq!(page.total_pages, 7);
        assert_eq!(page.links[0].url(), "http://a.com");
        assert_eq!(page.links[0].count(), 5);
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty_not_error() {
        let (service, _) = service(InMemoryBackend::new().with_link_count_pages(
            SITE,
            vec![
                link_counts_page(2, &[("http://a.com", 5)]),
                link_counts_page(2, &[("http://b.com", 3)]),
            ],
        ));

        let first = service.get_link_counts(SITE, 0).await.unwrap();
        for page in [first.total_pages, first.total_pages + 1, 9999] {
            let envelope = service.get_link_counts(SITE, page as i64).await.unwrap();
            assert!(envelope.links.is_empty(), "page {page} should be empty");
        }
    }

    #[tokio::test]
    async fn test_remote_error_passthrough() {
        let mut mock = MockLinkDataFetcher::new();
        mock.expect_fetch_url_links_page()
            .returning(|_, _, _| Err(RemoteError::message("401 Unauthorized")));
        let service = LinkAnalysisService::new(Arc::new(mock));

        let err = service.get_url_links(SITE, SITE, 0).await.unwrap_err();
        assert!(matches!(err, WebmasterError::Remote(_)));
        assert!(err.to_string().contains("401 Unauthorized"));
    }

    #[tokio::test]
    async fn test_get_all_link_counts_two_pages() {
        let (service, backend) = service(InMemoryBackend::new().with_link_count_pages(
            SITE,
            vec![
                link_counts_page(2, &[("http://a.com", 5)]),
                link_counts_page(2, &[("http://b.com", 3)]),
                link_counts_page(2, &[]),
            ],
        ));

        let links = service.get_all_link_counts(SITE, None).await.unwrap();
        let flat: Vec<(&str, u64)> = links.iter().map(|l| (l.url(), l.count())).collect();
        assert_eq!(flat, vec![("http://a.com", 5), ("http://b.com", 3)]);
        assert!(backend.requested_link_count_pages(SITE).iter().all(|p| *p <= 2));

        let again = service.get_all_link_counts(SITE, None).await.unwrap();
        assert_eq!(again, links);
    }

    #[tokio::test]
    async fn test_get_all_link_counts_overlap_fails() {
        let (service, _) = service(InMemoryBackend::new().with_link_count_pages(
            SITE,
            vec![
                link_counts_page(2, &[("http://a.com", 5)]),
                link_counts_page(2, &[("http://a.com", 5)]),
            ],
        ));

        let err = service.get_all_link_counts(SITE, None).await.unwrap_err();
        match err {
            WebmasterError::Consistency(e) => {
                assert_eq!(e.kind, ConsistencyErrorKind::DuplicateRecord);
                assert_eq!(e.page, 1);
            }
            other => panic!("expected consistency error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_all_url_links() {
        let (service, backend) = service(InMemoryBackend::new().with_url_link_pages(
            SITE,
            SITE,
            vec![
                link_details_page(2, &[("http://a.com", "Example"), ("http://a.com", "")]),
                link_details_page(2, &[("http://b.com", "Example")]),
            ],
        ));

        let details = service.get_all_url_links(SITE, SITE, None).await.unwrap();
        assert_eq!(details.len(), 3);
        assert_eq!(
            backend.calls().first(),
            Some(&RecordedCall::UrlLinksPage {
                site_url: SITE.to_string(),
                link: SITE.to_string(),
                page: 0,
            })
        );
    }

    #[tokio::test]
    async fn test_pagination_cap_applies() {
        let pages = (0..5)
            .map(|i| link_counts_page(50, &[(format!("http://p{i}.com").as_str(), 1)]))
            .collect();
        let (service, backend) = service(InMemoryBackend::new().with_link_count_pages(SITE, pages));
        let service = service.with_pagination(PaginationConfig::new().with_max_pages(2));

        let links = service.get_all_link_counts(SITE, None).await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(backend.requested_link_count_pages(SITE), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_connected_page_lifecycle() {
        let master = "http://master.com";
        let (service, _) = service(InMemoryBackend::new().with_visibility_lag(1));

        service.add_connected_page(SITE, master).await.unwrap();
        let pages = service.get_connected_pages(SITE).await.unwrap();
        let matching = pages.iter().filter(|p| p.url == master).count();

        // Visibility is eventual: zero or one match, never more.
        assert!(matching <= 1);
    }

    #[tokio::test]
    async fn test_connected_page_becomes_visible() {
        let master = "http://master.com";
        let (service, _) = service(InMemoryBackend::new().with_visibility_lag(2));

        service.add_connected_page(SITE, master).await.unwrap();
        service.add_connected_page(SITE, master).await.unwrap();

        let mut matches = Vec::new();
        for _ in 0..5 {
            let pages = service.get_connected_pages(SITE).await.unwrap();
            matches.push(pages.iter().filter(|p| p.url == master).count());
        }
        assert_eq!(matches, vec![0, 0, 1, 1, 1]);
    }
}
