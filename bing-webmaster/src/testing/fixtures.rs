//! Builders for page envelopes and records used in tests.
//!
//! These helpers panic on invalid input; they are meant for literals.

#![allow(clippy::expect_used)]

use chrono::{DateTime, Utc};

use crate::models::{LinkCount, LinkCounts, LinkDetail, LinkDetails, QueryParamToken, QueryParameter};

/// Builds a link-count page from `(url, count)` pairs.
#[must_use]
pub fn link_counts_page(total_pages: u64, links: &[(&str, u64)]) -> LinkCounts {
    LinkCounts::new(
        total_pages,
        links
            .iter()
            .map(|(url, count)| LinkCount::new(*url, *count).expect("fixture URL must be absolute"))
            .collect(),
    )
}

/// Builds a link-detail page from `(url, anchor_text)` pairs.
#[must_use]
pub fn link_details_page(total_pages: u64, details: &[(&str, &str)]) -> LinkDetails {
    LinkDetails::new(
        total_pages,
        details
            .iter()
            .map(|(url, anchor)| LinkDetail::new(*url, *anchor).expect("fixture URL must be absolute"))
            .collect(),
    )
}

/// Builds a query parameter.
#[must_use]
pub fn query_parameter(parameter: &str, is_enabled: bool, date: DateTime<Utc>) -> QueryParameter {
    QueryParameter {
        kind: "QueryParameter:#Microsoft.Bing.Webmaster.Api".to_string(),
        date,
        is_enabled,
        parameter: QueryParamToken::parse(parameter).expect("fixture parameter must be valid"),
        source: 0,
    }
}
