//! Summaries computed over aggregated records.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{LinkDetail, QueryParameter};

/// Label used for links without anchor text.
pub const NO_ANCHOR_TEXT: &str = "[No Anchor Text]";

/// Breakdown of the inbound links pointing at one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InboundLinkSummary {
    /// Number of links analysed.
    pub total_links: usize,
    /// Links per source domain.
    pub domains: HashMap<String, usize>,
    /// Links per trimmed anchor text.
    pub anchor_texts: HashMap<String, usize>,
}

impl InboundLinkSummary {
    /// Builds a summary from aggregated link details.
    #[must_use]
    pub fn from_details(details: &[LinkDetail]) -> Self {
        let mut summary = Self {
            total_links: details.len(),
            ..Self::default()
        };

        for detail in details {
            let domain = extract_domain(detail.url()).unwrap_or_else(|| detail.url().to_string());
            *summary.domains.entry(domain).or_default() += 1;

            let anchor = detail.anchor_text().trim();
            let anchor = if anchor.is_empty() { NO_ANCHOR_TEXT } else { anchor };
            *summary.anchor_texts.entry(anchor.to_string()).or_default() += 1;
        }

        summary
    }

    /// Number of distinct source domains.
    #[must_use]
    pub fn unique_domains(&self) -> usize {
        self.domains.len()
    }

    /// The `n` domains with the most links.
    #[must_use]
    pub fn top_domains(&self, n: usize) -> Vec<(&str, usize)> {
        top_entries(&self.domains, n)
    }

    /// The `n` most frequent anchor texts.
    #[must_use]
    pub fn top_anchor_texts(&self, n: usize) -> Vec<(&str, usize)> {
        top_entries(&self.anchor_texts, n)
    }
}

/// Enabled/disabled breakdown of a site's query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParameterSummary {
    /// Names of enabled parameters.
    pub enabled: Vec<String>,
    /// Names of disabled parameters.
    pub disabled: Vec<String>,
    /// Parameter names keyed by the day they were last changed.
    pub by_date: BTreeMap<NaiveDate, Vec<String>>,
}

impl QueryParameterSummary {
    /// Builds a summary, keeping the input order within each group.
    #[must_use]
    pub fn from_parameters(parameters: &[QueryParameter]) -> Self {
        let mut summary = Self::default();
        for param in parameters {
            let name = param.parameter.to_string();
            if param.is_enabled {
                summary.enabled.push(name.clone());
            } else {
                summary.disabled.push(name.clone());
            }
            summary
                .by_date
                .entry(param.date.date_naive())
                .or_default()
                .push(name);
        }
        summary
    }

    /// Total number of parameters.
    #[must_use]
    pub fn total(&self) -> usize {
        self.enabled.len() + self.disabled.len()
    }
}

/// Extracts the host part of an absolute URL.
#[must_use]
pub fn extract_domain(url: &str) -> Option<String> {
    let start = url.find("://").map(|i| i + 3)?;
    let rest = &url[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let host = &rest[..end];
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}

fn top_entries(counts: &HashMap<String, usize>, n: usize) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(n);
    entries
}
