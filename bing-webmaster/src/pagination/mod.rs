//! Pagination over the service's page envelopes.
//!
//! This module provides:
//! - The single-page contract used by the per-page service operations
//! - Full aggregation with cross-page duplicate detection
//! - The state machine that decides when to stop requesting pages

mod paginator;
mod state;

pub use paginator::{fetch_single_page, Paginator};
pub use state::{PaginationState, StopReason};
