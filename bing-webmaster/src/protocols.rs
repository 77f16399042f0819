//! Protocol traits for the remote collaborator.
//!
//! The services only depend on these traits, so any transport (the bundled
//! HTTP backend, the in-memory test backend, a recording proxy) can be
//! plugged in. Implementations report their own failures as
//! [`RemoteError`]; the services pass them through uninterpreted.

use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::models::{ConnectedPage, LinkCounts, LinkDetails, QueryParamToken, QueryParameter};

/// Remote source of link-graph data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkDataFetcher: Send + Sync {
    /// Fetches one page of inbound-link counts for a site.
    ///
    /// A page past the end yields an envelope with no records, not an error.
    async fn fetch_link_counts_page(
        &self,
        site_url: &str,
        page: u64,
    ) -> Result<LinkCounts, RemoteError>;

    /// Fetches one page of inbound links (with anchor text) for a URL.
    async fn fetch_url_links_page(
        &self,
        site_url: &str,
        link: &str,
        page: u64,
    ) -> Result<LinkDetails, RemoteError>;

    /// Connects `master_url` to the site. Visibility is eventual.
    async fn add_connected_page(&self, site_url: &str, master_url: &str)
        -> Result<(), RemoteError>;

    /// Fetches the pages connected to a site.
    async fn fetch_connected_pages(&self, site_url: &str)
        -> Result<Vec<ConnectedPage>, RemoteError>;
}

/// Remote store of tracked query parameters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryParameterStore: Send + Sync {
    /// Fetches the query parameters tracked for a site.
    async fn fetch_query_parameters(&self, site_url: &str)
        -> Result<Vec<QueryParameter>, RemoteError>;

    /// Starts tracking a query parameter.
    async fn add_query_parameter(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
    ) -> Result<(), RemoteError>;

    /// Stops tracking a query parameter.
    async fn remove_query_parameter(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
    ) -> Result<(), RemoteError>;

    /// Enables or disables a tracked query parameter.
    async fn set_query_parameter_enabled(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
        enabled: bool,
    ) -> Result<(), RemoteError>;
}

/// A backend serving both link data and query parameters.
pub trait WebmasterBackend: LinkDataFetcher + QueryParameterStore {}

impl<T: LinkDataFetcher + QueryParameterStore> WebmasterBackend for T {}
