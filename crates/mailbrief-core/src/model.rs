//! Domain models mirroring the triage backend's summary objects.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::{Category, Priority, SenderType};

const fn default_category() -> Category {
    Category::Primary
}

const fn default_priority() -> Priority {
    Priority::Medium
}

const fn default_sender_type() -> SenderType {
    SenderType::Company
}

/// One AI-summarized email, as stored and served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    /// Stable identifier derived from subject/sender/date.
    pub id: String,
    /// Original subject line.
    pub subject: String,
    /// Sender display string.
    pub sender: String,
    /// Recipient display string.
    #[serde(default)]
    pub recipient: String,
    /// When the email was received.
    pub date: DateTime<Utc>,
    /// One-line AI summary.
    pub summary: String,
    /// Truncated original body, when the backend kept it.
    #[serde(default)]
    pub original_body: Option<String>,
    /// When the backend ingested this email.
    pub fetched_at: DateTime<Utc>,
    /// AI-assigned category.
    #[serde(default = "default_category")]
    pub category: Category,
    /// AI-assigned priority.
    #[serde(default = "default_priority")]
    pub priority: Priority,
    /// AI-assigned sender kind.
    #[serde(default = "default_sender_type")]
    pub sender_type: SenderType,
    /// Whether the AI flagged this email as needing action.
    ///
    /// This is classification output on an individual email; the filter
    /// side uses the tri-state [`crate::filter::ActionRequired`] instead.
    #[serde(default)]
    pub action_required: bool,
    /// Free-form deadline text, when the AI detected one.
    #[serde(default)]
    pub action_deadline: Option<String>,
    /// Whether the original email carried attachments.
    #[serde(default)]
    pub has_attachments: bool,
}

/// Read-only aggregate counts over all stored summaries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MailboxStats {
    /// Total stored summaries.
    #[serde(default)]
    pub total: u64,
    /// How many are flagged action-required.
    #[serde(default)]
    pub action_required: u64,
    /// How many carry attachments.
    #[serde(default)]
    pub with_attachments: u64,
    /// Counts keyed by priority string.
    #[serde(default)]
    pub by_priority: HashMap<String, u64>,
    /// Counts keyed by category string.
    #[serde(default)]
    pub by_category: HashMap<String, u64>,
}
