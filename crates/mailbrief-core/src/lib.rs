//! # mailbrief-core
//!
//! Client-side synchronization core for the `MailBrief` email-triage UI.
//!
//! This crate provides:
//! - Filter state store - canonical filter predicate with synchronous observers
//! - Deep-link synchronization - bidirectional filter/query-string mapping
//! - Pagination cursor manager - incremental mailbox-sync protocol
//! - Debounced report requester - race-safe on-demand AI report generation
//! - Listing fetcher - filtered summary retrieval with stale-response suppression
//!
//! Network collaborators are expressed as traits (see [`client`]); the
//! `mailbrief-api` crate binds them to the backend's REST contract.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod client;
pub mod debounce;
mod error;
pub mod filter;
pub mod listing;
pub mod mailbox;
pub mod model;
pub mod report;
pub mod seq;
pub mod session;
pub mod urlsync;

pub use client::{
    Listing, MailboxClient, ReportClient, ReportPayload, StatsClient, SummariesClient,
    SyncRequest, SyncResponse,
};
pub use error::{Error, Result};
pub use filter::{
    ActionRequired, AttachmentFilter, Category, DateRange, FilterChange, FilterPredicate,
    FilterStore, Priority, SenderType,
};
pub use listing::{ListingFetcher, ListingStatus};
pub use mailbox::{CursorMode, MailboxSyncer, SyncConfig, SyncOutcome};
pub use model::{EmailSummary, MailboxStats};
pub use report::{ReportHandle, ReportPhase, ReportStatus, spawn_report_worker};
pub use session::{SessionConfig, TriageSession};
pub use urlsync::{Location, MemoryLocation, UrlSync};
