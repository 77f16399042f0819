//! # bing-webmaster
//!
//! A typed async client for the link-graph and URL-management operations of
//! the Bing Webmaster API.
//!
//! The crate provides:
//!
//! - **Validated inputs**: URLs, page indices and query-parameter tokens are
//!   checked before any remote call is made
//! - **Full aggregation**: every page of a paginated endpoint concatenated in
//!   order, with duplicate records reported as a consistency error
//! - **Pluggable transport**: services depend on collaborator traits; an HTTP
//!   backend ships behind the `http` feature and an in-memory one in [`testing`]
//! - **Cancellation**: aggregations can be abandoned through a
//!   [`CancellationToken`](cancellation::CancellationToken)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bing_webmaster::prelude::*;
//!
//! let client = WebmasterClient::from_env()?;
//! let links = client
//!     .links
//!     .get_all_url_links("https://example.com", "https://example.com/page", None)
//!     .await?;
//! let summary = InboundLinkSummary::from_details(&links);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod analysis;
pub mod cancellation;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod protocols;
pub mod services;
pub mod testing;
pub mod validation;

#[cfg(feature = "http")]
pub mod http;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{InboundLinkSummary, QueryParameterSummary};
    pub use crate::cancellation::CancellationToken;
    pub use crate::client::WebmasterClient;
    pub use crate::config::{ClientConfig, PaginationConfig};
    pub use crate::errors::{
        ConsistencyError, RemoteError, ValidationError, ValidationErrorKind, WebmasterError,
    };
    pub use crate::models::{
        ConnectedPage, LinkCount, LinkCounts, LinkDetail, LinkDetails, QueryParamToken,
        QueryParameter,
    };
    pub use crate::protocols::{LinkDataFetcher, QueryParameterStore, WebmasterBackend};
    pub use crate::services::{LinkAnalysisService, UrlManagementService};
    pub use crate::validation::{validate_page, validate_query_parameter_token, validate_url};
}

pub use client::WebmasterClient;
pub use errors::{Result, WebmasterError};
