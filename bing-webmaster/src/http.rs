//! HTTP transport for the JSON endpoint of the webmaster API.
//!
//! Every response body is wrapped as `{"d": <payload>}`; the API key travels
//! in the `apikey` query parameter. Failures of any kind are handed to the
//! caller as opaque [`RemoteError`]s. There is no retry.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::errors::{RemoteError, Result, WebmasterError};
use crate::models::{ConnectedPage, LinkCounts, LinkDetails, QueryParamToken, QueryParameter};
use crate::protocols::{LinkDataFetcher, QueryParameterStore};

#[derive(Debug, Error)]
enum TransportError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

// The request URL carries the API key.
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

impl From<TransportError> for RemoteError {
    fn from(err: TransportError) -> Self {
        RemoteError::new(err)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    d: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectedPageRequest<'a> {
    site_url: &'a str,
    master_url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryParameterRequest<'a> {
    site_url: &'a str,
    query_parameter: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_enabled: Option<bool>,
}

/// Talks to the live service with `reqwest`.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    /// Builds a backend from validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WebmasterError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<T, TransportError> {
        tracing::debug!(method, "GET request");
        let response = self
            .client
            .get(self.endpoint(method))
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;
        decode(&checked_body(response).await?)
    }

    async fn post<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> std::result::Result<(), TransportError> {
        tracing::debug!(method, "POST request");
        let response = self
            .client
            .post(self.endpoint(method))
            .query(&[("apikey", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;
        checked_body(response).await?;
        Ok(())
    }

    async fn post_query_parameter(
        &self,
        method: &str,
        site_url: &str,
        parameter: &QueryParamToken,
        is_enabled: Option<bool>,
    ) -> std::result::Result<(), RemoteError> {
        let request = QueryParameterRequest {
            site_url,
            query_parameter: parameter.as_str(),
            is_enabled,
        };
        Ok(self.post(method, &request).await?)
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

async fn checked_body(response: reqwest::Response) -> std::result::Result<String, TransportError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::debug!(status = status.as_u16(), "Service returned an error status");
        return Err(TransportError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn decode<T: DeserializeOwned>(body: &str) -> std::result::Result<T, TransportError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.d)
}

#[async_trait]
impl LinkDataFetcher for HttpBackend {
    async fn fetch_link_counts_page(
        &self,
        site_url: &str,
        page: u64,
    ) -> std::result::Result<LinkCounts, RemoteError> {
        let page = page.to_string();
        Ok(self
            .get("GetLinkCounts", &[("siteUrl", site_url), ("page", page.as_str())])
            .await?)
    }

    async fn fetch_url_links_page(
        &self,
        site_url: &str,
        link: &str,
        page: u64,
    ) -> std::result::Result<LinkDetails, RemoteError> {
        let page = page.to_string();
        Ok(self
            .get(
                "GetUrlLinks",
                &[("siteUrl", site_url), ("link", link), ("page", page.as_str())],
            )
            .await?)
    }

    async fn add_connected_page(
        &self,
        site_url: &str,
        master_url: &str,
    ) -> std::result::Result<(), RemoteError> {
        let request = ConnectedPageRequest {
            site_url,
            master_url,
        };
        Ok(self.post("AddConnectedPage", &request).await?)
    }

    async fn fetch_connected_pages(
        &self,
        site_url: &str,
    ) -> std::result::Result<Vec<ConnectedPage>, RemoteError> {
        let pages: Option<Vec<ConnectedPage>> = self
            .get("GetConnectedPages", &[("siteUrl", site_url)])
            .await?;
        Ok(pages.unwrap_or_default())
    }
}

#[async_trait]
impl QueryParameterStore for HttpBackend {
    async fn fetch_query_parameters(
        &self,
        site_url: &str,
    ) -> std::result::Result<Vec<QueryParameter>, RemoteError> {
        let params: Option<Vec<QueryParameter>> = self
            .get("GetQueryParameters", &[("siteUrl", site_url)])
            .await?;
        Ok(params.unwrap_or_default())
    }

    async fn add_query_parameter(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
    ) -> std::result::Result<(), RemoteError> {
        self.post_query_parameter("AddQueryParameter", site_url, parameter, None)
            .await
    }

    async fn remove_query_parameter(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
    ) -> std::result::Result<(), RemoteError> {
        self.post_query_parameter("RemoveQueryParameter", site_url, parameter, None)
            .await
    }

    async fn set_query_parameter_enabled(
        &self,
        site_url: &str,
        parameter: &QueryParamToken,
        enabled: bool,
    ) -> std::result::Result<(), RemoteError> {
        self.post_query_parameter(
            "EnableDisableQueryParameter",
            site_url,
            parameter,
            Some(enabled),
        )
        .await
    }
}
