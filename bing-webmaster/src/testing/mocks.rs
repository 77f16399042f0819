//! In-memory backend for exercising the services without a network.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::errors::RemoteError;
use crate::models::{
    ConnectedPage, LinkCounts, LinkDetails, QueryParamToken, QueryParameter,
};
use crate::protocols::{LinkDataFetcher, QueryParameterStore};

/// Type tag the service attaches to query parameters.
const QUERY_PARAMETER_TYPE: &str = "QueryParameter:#Microsoft.Bing.Webmaster.Api";

/// A call observed by [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `fetch_link_counts_page`.
    LinkCountsPage {
        /// Site queried.
        site_url: String,
        /// Page requested.
        page: u64,
    },
    /// `fetch_url_links_page`.
    UrlLinksPage {
        /// Site queried.
        site_url: String,
        /// Link queried.
        link: String,
        /// Page requested.
        page: u64,
    },
    /// `add_connected_page`.
    AddConnectedPage {
        /// Site updated.
        site_url: String,
        /// Page connected.
        master_url: String,
    },
    /// `fetch_connected_pages`.
    ConnectedPages {
        /// Site queried.
        site_url: String,
    },
    /// `fetch_query_parameters`.
    QueryParameters {
        /// Site queried.
        site_url: String,
    },
    /// `add_query_parameter`.
    AddQueryParameter {
        /// Site updated.
        site_url: String,
        /// Parameter added.
        parameter: String,
    },
    /// `remove_query_parameter`.
    RemoveQueryParameter {
        /// Site updated.
        site_url: String,
        /// Parameter removed.
        parameter: String,
    },
    /// `set_query_parameter_enabled`.
    SetQueryParameterEnabled {
        /// Site updated.
        site_url: String,
        /// Parameter toggled.
        parameter: String,
        /// Requested state.
        enabled: bool,
    },
}

#[derive(Debug, Default)]
struct ConnectedState {
    visible: Vec<ConnectedPage>,
    // Page plus the number of reads it stays hidden for.
    pending: Vec<(ConnectedPage, usize)>,
}

/// Scripted, in-memory implementation of both collaborator traits.
///
/// Link pages are served by index; any page past the scripted ones is an
/// empty envelope carrying the first page's `total_pages`. Connected pages
/// become visible after a configurable number of reads, mimicking the
/// service's eventual consistency.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    link_counts: Mutex<HashMap<String, Vec<LinkCounts>>>,
    url_links: Mutex<HashMap<(String, String), Vec<LinkDetails>>>,
    connected: Mutex<HashMap<String, ConnectedState>>,
    query_parameters: Mutex<HashMap<String, Vec<QueryParameter>>>,
    visibility_lag: usize,
    failures: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the link-count pages of a site.
    #[must_use]
    pub fn with_link_count_pages(mut self, site_url: &str, pages: Vec<LinkCounts>) -> Self {
        self.link_counts.get_mut().insert(site_url.to_string(), pages);
        self
    }

    /// Scripts the link-detail pages of a (site, link) pair.
    #[must_use]
    pub fn with_url_link_pages(mut self, site_url: &str, link: &str, pages: Vec<LinkDetails>) -> Self {
        self.url_links
            .get_mut()
            .insert((site_url.to_string(), link.to_string()), pages);
        self
    }

    /// Seeds already-visible connected pages.
    #[must_use]
    pub fn with_connected_pages(mut self, site_url: &str, pages: Vec<ConnectedPage>) -> Self {
        self.connected
            .get_mut()
            .entry(site_url.to_string())
            .or_default()
            .visible
            .extend(pages);
        self
    }

    /// Seeds tracked query parameters.
    #[must_use]
    pub fn with_query_parameters(mut self, site_url: &str, params: Vec<QueryParameter>) -> Self {
        self.query_parameters
            .get_mut()
            .insert(site_url.to_string(), params);
        self
    }

    /// Hides new connected pages for `reads` subsequent reads.
    #[must_use]
    pub fn with_visibility_lag(mut self, reads: usize) -> Self {
        self.visibility_lag = reads;
        self
    }

    /// Makes the next call fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures.lock().push_back(message.into());
    }

    /// Returns every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the link-count pages requested for a site, in order.
    #[must_use]
    pub fn requested_link_count_pages(&self, site_url: &str) -> Vec<u64> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::LinkCountsPage { site_url: s, page } if s == site_url => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Resets call tracking.
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: RecordedCall) -> Result<(), RemoteError> {
        self.calls.lock().push(call);
        match self.failures.lock().pop_front() {
            Some(message) => Err(RemoteError::message(message)),
            None => Ok(()),
        }
    }
}

fn page_or_empty<E: Clone>(pages: Option<&Vec<E>>, page: u64, empty: impl FnOnce(Option<&E>) -> E) -> E {
    let pages = pages.map(Vec::as_slice).unwrap_or_default();
    usize::try_from(page)
        .ok()
        .and_then(|i| pages.get(i))
        .cloned()
        .unwrap_or_else(|| empty(pages.first()))
}

#[async_trait]
impl LinkDataFetcher for InMemoryBackend {
    async fn fetch_link_counts_page(
        &self,
        site_url: &str,
        page: u64,
    ) -> Result<LinkCounts, RemoteError> {
        self.record(RecordedCall::LinkCountsPage {
            site_url: site_url.to_string(),
            page,
        })?;
        let scripted = self.link_counts.lock();
        Ok(page_or_empty(scripted.get(site_url), page, |first| {
            LinkCounts::empty(first.map_or(0, |p| p.total_pages))
        }))
    }

    async fn fetch_url_links_page(
        &self,
        site_url: &str,
        link: &str,
        page: u64,
    ) -> Result<LinkDetails, RemoteError> {
        self.record(RecordedCall::UrlLinksPage {
            site_url: site_url.to_string(),
            link: link.to_string(),
            page,
        })?;
        let scripted = self.url_links.lock();
        let key = (site_url.to_string(), link.to_string());
        Ok(page_or_empty(scripted.get(&key), page, |first| {
            LinkDetails::empty(first.map_or(0, |p| p.total_pages))
        }))
    }

    async fn add_connected_page(&self, site_url: &str, master_url: &str) -> Result<(), RemoteError> {
        self.record(RecordedCall::AddConnectedPage {
            site_url: site_url.to_string(),
            master_url: master_url.to_string(),
        })?;
        let mut connected = self.connected.lock();
        let state = connected.entry(site_url.to_string()).or_default();
        let known = state.visible.iter().any(|p| p.url == master_url)
            || state.pending.iter().any(|(p, _)| p.url == master_url);
        if !known {
            state
                .pending
                .push((ConnectedPage::new(master_url), self.visibility_lag));
        }
        Ok(())
    }

    async fn fetch_connected_pages(&self, site_url: &str) -> Result<Vec<ConnectedPage>, RemoteError> {
        self.record(RecordedCall::ConnectedPages {
            site_url: site_url.to_string(),
        })?;
        let mut connected = self.connected.lock();
        let Some(state) = connected.get_mut(site_url) else {
            return Ok(Vec::new());
        };

        let mut still_pending = Vec::new();
        for (page, remaining) in state.pending.drain(..) {
            if remaining == 0 {
                state.visible.push(page);
            } else {
                still_pending.push((page, remaining - 1));
            }
        }
        state.pending = still_pending;
        Ok(state.visible.clone())
    }
}

#[async_trait]
impl QueryParameterStore for InMemoryBackend {
    async fn fetch_query_parameters(&self, site_url: &str) -> Result<Vec<QueryParameter>, RemoteError> {
        self.record(RecordedCall::QueryParameters {
            site_url: site_url.to_string(),
        })?;
        Ok(self
            .query_parameters
            .lock()
            .get(site_url)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_query_parameter(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
    ) -> Result<(), RemoteError> {
        self.record(RecordedCall::AddQueryParameter {
            site_url: site_url.to_string(),
            parameter: parameter.to_string(),
        })?;
        let mut store = self.query_parameters.lock();
        let params = store.entry(site_url.to_string()).or_default();
        if params.iter().any(|p| &p.parameter == parameter) {
            return Err(RemoteError::message(format!(
                "query parameter '{parameter}' already exists"
            )));
        }
        params.push(QueryParameter {
            kind: QUERY_PARAMETER_TYPE.to_string(),
            date: Utc::now(),
            is_enabled: true,
            parameter: parameter.clone(),
            source: 0,
        });
        Ok(())
    }

    async fn remove_query_parameter(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
    ) -> Result<(), RemoteError> {
        self.record(RecordedCall::RemoveQueryParameter {
            site_url: site_url.to_string(),
            parameter: parameter.to_string(),
        })?;
        let mut store = self.query_parameters.lock();
        let params = store.entry(site_url.to_string()).or_default();
        let before = params.len();
        params.retain(|p| &p.parameter != parameter);
        if params.len() == before {
            return Err(RemoteError::message(format!(
                "query parameter '{parameter}' not found"
            )));
        }
        Ok(())
    }

    async fn set_query_parameter_enabled(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
        enabled: bool,
    ) -> Result<(), RemoteError> {
        self.record(RecordedCall::SetQueryParameterEnabled {
            site_url: site_url.to_string(),
            parameter: parameter.to_string(),
            enabled,
        })?;
        let mut store = self.query_parameters.lock();
        let param = store
            .get_mut(site_url)
            .and_then(|params| params.iter_mut().find(|p| &p.parameter == parameter))
            .ok_or_else(|| RemoteError::message(format!("query parameter '{parameter}' not found")))?;
        param.is_enabled = enabled;
        param.date = Utc::now();
        Ok(())
    }
}
