//! Collaborator contracts.
//!
//! The backend (summaries listing, mailbox sync, report generation,
//! aggregate stats) is an external collaborator reachable through a fixed
//! REST contract. The core consumes it through these traits so the state
//! machines stay network-free and tests can script responses.

use std::future::Future;

use crate::error::Result;
use crate::filter::FilterPredicate;
use crate::model::{EmailSummary, MailboxStats};

/// One page of filtered summaries plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    /// Summaries matching the predicate (after `result_limit`).
    pub items: Vec<EmailSummary>,
    /// Total matches before the limit was applied.
    pub total: u64,
}

/// Parameters for one mailbox-sync call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    /// Maximum number of new summaries to ingest.
    pub limit: u32,
    /// How many days of history to scan.
    pub days_back: u32,
    /// Continuation token from the previous call, absent on a fresh sync.
    pub page_token: Option<String>,
}

/// Result of one mailbox-sync call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResponse {
    /// Continuation token for older items; absent when the mailbox window
    /// is exhausted.
    pub next_page_token: Option<String>,
}

/// A generated report plus the number of emails it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPayload {
    /// Markdown report text.
    pub report: String,
    /// How many summaries matched the predicate.
    pub email_count: u64,
}

/// Retrieves the filtered summary listing.
pub trait SummariesClient: Send + Sync + 'static {
    /// Fetch `(items, total)` for the given predicate.
    fn list_summaries(
        &self,
        filter: &FilterPredicate,
    ) -> impl Future<Output = Result<Listing>> + Send;
}

/// Triggers incremental fetch-from-mailbox operations.
pub trait MailboxClient: Send + Sync + 'static {
    /// Ingest one batch of emails, continuing from `page_token` if present.
    fn sync_mailbox(
        &self,
        request: &SyncRequest,
    ) -> impl Future<Output = Result<SyncResponse>> + Send;
}

/// Generates a natural-language report over the filtered set.
pub trait ReportClient: Send + Sync + 'static {
    /// Generate a report for the given predicate.
    fn generate_report(
        &self,
        filter: &FilterPredicate,
    ) -> impl Future<Output = Result<ReportPayload>> + Send;
}

/// Retrieves read-only aggregate statistics.
pub trait StatsClient: Send + Sync + 'static {
    /// Fetch counts by category, priority, and flags.
    fn fetch_stats(&self) -> impl Future<Output = Result<MailboxStats>> + Send;
}
