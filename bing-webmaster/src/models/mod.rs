//! Typed records decoded from the remote service.
//!
//! This module provides:
//! - Link-count and link-detail records with their page envelopes
//! - Connected pages
//! - Tracked query parameters
//! - The envelope traits the paginator is generic over

mod envelope;
mod links;
mod query;
pub mod wire_date;

pub use envelope::{PageEnvelope, PageRecord};
pub use links::{ConnectedPage, LinkCount, LinkCounts, LinkDetail, LinkDetails};
pub use query::{QueryParamToken, QueryParameter};
