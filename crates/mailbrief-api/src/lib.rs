//! # mailbrief-api
//!
//! `reqwest`-based binding of the `mailbrief-core` collaborator traits to
//! the triage backend's REST contract:
//!
//! - `GET /emails/summaries` - filtered listing (+ cache-busting param)
//! - `POST /emails/fetch/gmail` - incremental mailbox sync with
//!   continuation tokens
//! - `POST /reports/summary` - on-demand report generation
//! - `GET /emails/summaries/stats` - aggregate counts

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod wire;

pub use client::{ApiClient, ApiClientBuilder};
