//! Page envelope abstraction shared by all paginated endpoints.

use std::fmt::Debug;
use std::hash::Hash;

/// A record that can appear in a paginated result set.
pub trait PageRecord {
    /// Identity used for cross-page duplicate detection.
    type Key: Eq + Hash + Debug;

    /// Returns this record's duplicate-detection key.
    fn dedup_key(&self) -> Self::Key;

    /// Renders a key for error reporting.
    fn describe_key(key: &Self::Key) -> String {
        format!("{key:?}")
    }
}

/// One response unit from a paginated endpoint.
pub trait PageEnvelope {
    /// Record type carried by the envelope.
    type Record: PageRecord;

    /// The remote service's advisory page count.
    fn total_pages(&self) -> u64;

    /// Records on this page.
    fn records(&self) -> &[Self::Record];

    /// Consumes the envelope, yielding its records.
    fn into_records(self) -> Vec<Self::Record>;

    /// Whether the page carried no records.
    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}
