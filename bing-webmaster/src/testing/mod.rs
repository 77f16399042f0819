//! Testing utilities for code built on the webmaster client.
//!
//! This module provides:
//! - An in-memory backend implementing the collaborator traits
//! - Builders for page envelopes and records

mod fixtures;
mod mocks;

pub use fixtures::{link_counts_page, link_details_page, query_parameter};
pub use mocks::{InMemoryBackend, RecordedCall};
