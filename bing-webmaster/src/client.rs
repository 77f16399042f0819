//! Entry point bundling both services over one backend.

use std::sync::Arc;

use crate::config::PaginationConfig;
#[cfg(feature = "http")]
use crate::config::ClientConfig;
#[cfg(feature = "http")]
use crate::errors::Result;
use crate::protocols::WebmasterBackend;
use crate::services::{LinkAnalysisService, UrlManagementService};

/// Client for the webmaster link-graph and URL-management operations.
///
/// ```rust,ignore
/// let client = WebmasterClient::from_env()?;
/// let counts = client.links.get_all_link_counts("https://example.com", None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct WebmasterClient {
    /// Link analysis operations.
    pub links: LinkAnalysisService,
    /// Query-parameter operations.
    pub urls: UrlManagementService,
}

impl WebmasterClient {
    /// Builds a client over any backend implementing both collaborator traits.
    #[must_use]
    pub fn with_backend<B>(backend: Arc<B>, pagination: PaginationConfig) -> Self
    where
        B: WebmasterBackend + 'static,
    {
        Self {
            links: LinkAnalysisService::new(backend.clone()).with_pagination(pagination),
            urls: UrlManagementService::new(backend),
        }
    }

    /// Builds a client talking to the live service.
    #[cfg(feature = "http")]
    pub fn new(config: ClientConfig) -> Result<Self> {
        let backend = crate::http::HttpBackend::new(&config)?;
        tracing::debug!(base_url = %config.base_url, "Webmaster client created");
        Ok(Self::with_backend(Arc::new(backend), config.pagination))
    }

    /// Builds a client from `BING_WEBMASTER_API_KEY` and friends.
    #[cfg(feature = "http")]
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{link_counts_page, InMemoryBackend};
    use pretty_assertions::assert_eq;

    const SITE: &str = "http://site.com";

    #[tokio::test]
    async fn test_services_share_backend() {
        let backend = Arc::new(InMemoryBackend::new().with_link_count_pages(
            SITE,
            vec![link_counts_page(1, &[("http://a.com", 2)])],
        ));
        let client = WebmasterClient::with_backend(backend.clone(), PaginationConfig::default());

        let links = client.links.get_all_link_counts(SITE, None).await.unwrap();
        assert_eq!(links.len(), 1);
        client.urls.add_query_parameter(SITE, "sort").await.unwrap();

        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_pagination_config_applied() {
        let backend = Arc::new(InMemoryBackend::new().with_link_count_pages(
            SITE,
            vec![
                link_counts_page(3, &[("http://a.com", 1)]),
                link_counts_page(3, &[("http://b.com", 1)]),
                link_counts_page(3, &[("http://c.com", 1)]),
            ],
        ));
        let client = WebmasterClient::with_backend(
            backend.clone(),
            PaginationConfig::new().with_max_pages(2),
        );

        let links = client.links.get_all_link_counts(SITE, None).await.unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(client.links.pagination().max_pages, Some(2));
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_new_validates_config() {
        let err = WebmasterClient::new(ClientConfig::new("key").with_base_url("ftp://x")).unwrap_err();
        assert_eq!(err.kind_name(), "ConfigError");
    }
}
