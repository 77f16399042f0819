//! Link-graph records and their page envelopes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::envelope::{PageEnvelope, PageRecord};
use crate::errors::ValidationError;
use crate::validation::validate_url;

/// Aggregate inbound-link count for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", try_from = "LinkCountWire")]
pub struct LinkCount {
    url: String,
    count: u64,
}

impl LinkCount {
    /// Creates a link count, rejecting non-absolute URLs.
    pub fn new(url: impl Into<String>, count: u64) -> Result<Self, ValidationError> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self { url, count })
    }

    /// The linked URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of inbound links.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("url".to_string(), serde_json::json!(self.url));
        dict.insert("count".to_string(), serde_json::json!(self.count));
        dict
    }
}

impl PageRecord for LinkCount {
    type Key = String;

    fn dedup_key(&self) -> Self::Key {
        self.url.clone()
    }

    fn describe_key(key: &Self::Key) -> String {
        key.clone()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LinkCountWire {
    url: String,
    count: u64,
}

impl TryFrom<LinkCountWire> for LinkCount {
    type Error = ValidationError;

    fn try_from(wire: LinkCountWire) -> Result<Self, Self::Error> {
        Self::new(wire.url, wire.count)
    }
}

/// One page of link counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkCounts {
    /// Advisory number of pages for the query.
    #[serde(default)]
    pub total_pages: u64,
    /// Records on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub links: Vec<LinkCount>,
}

impl LinkCounts {
    /// Creates a page envelope.
    #[must_use]
    pub fn new(total_pages: u64, links: Vec<LinkCount>) -> Self {
        Self { total_pages, links }
    }

    /// An envelope for a page past the end.
    #[must_use]
    pub fn empty(total_pages: u64) -> Self {
        Self::new(total_pages, Vec::new())
    }
}

impl PageEnvelope for LinkCounts {
    type Record = LinkCount;

    fn total_pages(&self) -> u64 {
        self.total_pages
    }

    fn records(&self) -> &[LinkCount] {
        &self.links
    }

    fn into_records(self) -> Vec<LinkCount> {
        self.links
    }
}

/// Anchor text of one inbound link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", try_from = "LinkDetailWire")]
pub struct LinkDetail {
    url: String,
    anchor_text: String,
}

impl LinkDetail {
    /// Creates a link detail, rejecting non-absolute URLs.
    pub fn new(url: impl Into<String>, anchor_text: impl Into<String>) -> Result<Self, ValidationError> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self {
            url,
            anchor_text: anchor_text.into(),
        })
    }

    /// The linking URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The anchor text, possibly empty.
    #[must_use]
    pub fn anchor_text(&self) -> &str {
        &self.anchor_text
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("url".to_string(), serde_json::json!(self.url));
        dict.insert("anchor_text".to_string(), serde_json::json!(self.anchor_text));
        dict
    }
}

impl PageRecord for LinkDetail {
    type Key = (String, String);

    fn dedup_key(&self) -> Self::Key {
        (self.url.clone(), self.anchor_text.clone())
    }

    fn describe_key(key: &Self::Key) -> String {
        format!("{} (anchor text {:?})", key.0, key.1)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LinkDetailWire {
    url: String,
    #[serde(default)]
    anchor_text: Option<String>,
}

impl TryFrom<LinkDetailWire> for LinkDetail {
    type Error = ValidationError;

    fn try_from(wire: LinkDetailWire) -> Result<Self, Self::Error> {
        Self::new(wire.url, wire.anchor_text.unwrap_or_default())
    }
}

/// One page of link details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkDetails {
    /// Advisory number of pages for the query.
    #[serde(default)]
    pub total_pages: u64,
    /// Records on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub details: Vec<LinkDetail>,
}

impl LinkDetails {
    /// Creates a page envelope.
    #[must_use]
    pub fn new(total_pages: u64, details: Vec<LinkDetail>) -> Self {
        Self {
            total_pages,
            details,
        }
    }

    /// An envelope for a page past the end.
    #[must_use]
    pub fn empty(total_pages: u64) -> Self {
        Self::new(total_pages, Vec::new())
    }
}

impl PageEnvelope for LinkDetails {
    type Record = LinkDetail;

    fn total_pages(&self) -> u64 {
        self.total_pages
    }

    fn records(&self) -> &[LinkDetail] {
        &self.details
    }

    fn into_records(self) -> Vec<LinkDetail> {
        self.details
    }
}

/// A page connected to a site for verification or ranking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectedPage {
    /// The connected URL.
    pub url: String,
}

impl ConnectedPage {
    /// Creates a connected page.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

// The service sends `null` instead of `[]` for some empty pages.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_link_count_rejects_relative_url() {
        assert!(LinkCount::new("http://a.com", 5).is_ok());
        assert!(LinkCount::new("a.com", 5).is_err());
    }

    #[test]
    fn test_decode_link_counts_wire_format() {
        let json = r#"{
            "__type": "LinkCounts:#Microsoft.Bing.Webmaster.Api",
            "Links": [
                {"__type": "LinkCount:#Microsoft.Bing.Webmaster.Api", "Count": 5, "Url": "http://a.com"},
                {"Count": 3, "Url": "https://b.com/page"}
            ],
            "TotalPages": 2
        }"#;

        let page: LinkCounts = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.links[0].url(), "http://a.com");
        assert_eq!(page.links[0].count(), 5);
        assert_eq!(page.links[1].count(), 3);
    }

    #[test]
    fn test_decode_rejects_remote_url_without_scheme() {
        let json = r#"{"Links": [{"Count": 1, "Url": "a.com"}], "TotalPages": 1}"#;
        let err = serde_json::from_str::<LinkCounts>(json).unwrap_err();
        assert!(err.to_string().contains("must start with http"));
    }

    #[test]
    fn test_decode_rejects_negative_count() {
        let json = r#"{"Links": [{"Count": -1, "Url": "http://a.com"}], "TotalPages": 1}"#;
        assert!(serde_json::from_str::<LinkCounts>(json).is_err());
    }

    #[test]
    fn test_decode_null_links_as_empty() {
        let json = r#"{"Links": null, "TotalPages": 0}"#;
        let page: LinkCounts = serde_json::from_str(json).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_decode_link_details_with_missing_anchor_text() {
        let json = r#"{
            "Details": [
                {"AnchorText": "Example", "Url": "http://a.com/x"},
                {"AnchorText": null, "Url": "http://b.com"},
                {"Url": "http://c.com"}
            ],
            "TotalPages": 1
        }"#;

        let page: LinkDetails = serde_json::from_str(json).unwrap();
        let anchors: Vec<&str> = page.details.iter().map(LinkDetail::anchor_text).collect();
        assert_eq!(anchors, vec!["Example", "", ""]);
    }

    #[test]
    fn test_dedup_keys() {
        let count = LinkCount::new("http://a.com", 1).unwrap();
        assert_eq!(count.dedup_key(), "http://a.com");

        let detail = LinkDetail::new("http://a.com", "home").unwrap();
        assert_eq!(
            detail.dedup_key(),
            ("http://a.com".to_string(), "home".to_string())
        );
        assert_eq!(
            LinkDetail::describe_key(&detail.dedup_key()),
            "http://a.com (anchor text \"home\")"
        );
    }

    #[test]
    fn test_link_count_serializes_to_wire_names() {
        let count = LinkCount::new("http://a.com", 7).unwrap();
        let value = serde_json::to_value(&count).unwrap();
        assert_eq!(value, serde_json::json!({"Url": "http://a.com", "Count": 7}));

        let back: LinkCount = serde_json::from_value(value).unwrap();
        assert_eq!(back, count);
    }

    #[test]
    fn test_connected_page_decode() {
        let pages: Vec<ConnectedPage> =
            serde_json::from_str(r#"[{"Url": "http://master.com"}]"#).unwrap();
        assert_eq!(pages, vec![ConnectedPage::new("http://master.com")]);
    }
}
