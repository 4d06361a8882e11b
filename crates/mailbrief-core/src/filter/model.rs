//! The filter predicate and its field domains.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Email category assigned by the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Personal and important mail.
    Primary,
    /// Social network notifications.
    Social,
    /// Marketing and offers.
    Promotions,
    /// Receipts, confirmations, statements.
    Updates,
    /// Mailing lists and discussion groups.
    Forums,
}

impl Category {
    /// All values, in display order.
    pub const ALL: [Self; 5] = [
        Self::Primary,
        Self::Social,
        Self::Promotions,
        Self::Updates,
        Self::Forums,
    ];

    /// Parse from the query-string representation.
    ///
    /// Out-of-domain values yield `None`; the deep link is untrusted input.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Some(Self::Primary),
            "social" => Some(Self::Social),
            "promotions" => Some(Self::Promotions),
            "updates" => Some(Self::Updates),
            "forums" => Some(Self::Forums),
            _ => None,
        }
    }

    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Social => "social",
            Self::Promotions => "promotions",
            Self::Updates => "updates",
            Self::Forums => "forums",
        }
    }
}

/// Email priority assigned by the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention soon.
    High,
    /// Normal.
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// All values, in display order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Parse from the query-string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Kind of sender, as classified by the summarizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    /// A real human being.
    Person,
    /// A company writing directly.
    Company,
    /// A newsletter subscription.
    Newsletter,
    /// Machine-generated mail (alerts, CI, receipts).
    Automated,
}

impl SenderType {
    /// All values, in display order.
    pub const ALL: [Self; 4] = [
        Self::Person,
        Self::Company,
        Self::Newsletter,
        Self::Automated,
    ];

    /// Parse from the query-string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "person" => Some(Self::Person),
            "company" => Some(Self::Company),
            "newsletter" => Some(Self::Newsletter),
            "automated" => Some(Self::Automated),
            _ => None,
        }
    }

    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Company => "company",
            Self::Newsletter => "newsletter",
            Self::Automated => "automated",
        }
    }
}

/// Relative date window, resolved server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    /// Since local midnight.
    Today,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
}

impl DateRange {
    /// All values, in display order.
    pub const ALL: [Self; 3] = [Self::Today, Self::Week, Self::Month];

    /// Parse from the query-string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    /// Query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// The "action required" constraint.
///
/// Deliberately not a `bool`: absence ("show everything") is a different
/// state from any boolean value, and must survive serialization without
/// collapsing to `false` or an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionRequired {
    /// No constraint.
    #[default]
    Unconstrained,
    /// Only emails flagged as needing action.
    Required,
}

impl ActionRequired {
    /// Whether this field constrains the listing.
    #[must_use]
    pub const fn is_constrained(self) -> bool {
        matches!(self, Self::Required)
    }

    /// The opposite state. Applying twice is the identity.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Unconstrained => Self::Required,
            Self::Required => Self::Unconstrained,
        }
    }

    /// Parse from the query-string value. Only the literal `"true"` constrains.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "true" {
            Self::Required
        } else {
            Self::Unconstrained
        }
    }

    /// Query-string value, `None` when unconstrained (the key is omitted).
    #[must_use]
    pub const fn as_query_value(self) -> Option<&'static str> {
        match self {
            Self::Unconstrained => None,
            Self::Required => Some("true"),
        }
    }

    /// Request-body value for the report/listing collaborators.
    #[must_use]
    pub const fn as_body_value(self) -> Option<bool> {
        match self {
            Self::Unconstrained => None,
            Self::Required => Some(true),
        }
    }
}

/// The "has attachments" constraint. Same tri-state shape as
/// [`ActionRequired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentFilter {
    /// No constraint.
    #[default]
    Unconstrained,
    /// Only emails carrying attachments.
    WithAttachments,
}

impl AttachmentFilter {
    /// Whether this field constrains the listing.
    #[must_use]
    pub const fn is_constrained(self) -> bool {
        matches!(self, Self::WithAttachments)
    }

    /// The opposite state. Applying twice is the identity.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Unconstrained => Self::WithAttachments,
            Self::WithAttachments => Self::Unconstrained,
        }
    }

    /// Parse from the query-string value. Only the literal `"true"` constrains.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "true" {
            Self::WithAttachments
        } else {
            Self::Unconstrained
        }
    }

    /// Query-string value, `None` when unconstrained (the key is omitted).
    #[must_use]
    pub const fn as_query_value(self) -> Option<&'static str> {
        match self {
            Self::Unconstrained => None,
            Self::WithAttachments => Some("true"),
        }
    }

    /// Request-body value for the report/listing collaborators.
    #[must_use]
    pub const fn as_body_value(self) -> Option<bool> {
        match self {
            Self::Unconstrained => None,
            Self::WithAttachments => Some(true),
        }
    }
}

/// The canonical filter object: the combined set of active constraints
/// applied to the listing and the report.
///
/// Invariant: every field is either absent or holds one value from its
/// declared domain. `search_text` is never `Some` of an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPredicate {
    /// Category constraint.
    pub category: Option<Category>,
    /// Priority constraint.
    pub priority: Option<Priority>,
    /// Sender-type constraint.
    pub sender_type: Option<SenderType>,
    /// Date-window constraint.
    pub date_range: Option<DateRange>,
    /// Action-required constraint.
    pub action_required: ActionRequired,
    /// Attachment constraint.
    pub has_attachments: AttachmentFilter,
    /// Free-text search, matched server-side.
    pub search_text: Option<String>,
    /// Maximum number of results to return.
    pub result_limit: Option<NonZeroU32>,
}

impl FilterPredicate {
    /// `true` when no field constrains the listing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.priority.is_none()
            && self.sender_type.is_none()
            && self.date_range.is_none()
            && !self.action_required.is_constrained()
            && !self.has_attachments.is_constrained()
            && self.search_text.is_none()
            && self.result_limit.is_none()
    }

    /// Normalize a raw search string: the empty string means absent.
    #[must_use]
    pub fn normalize_search(raw: Option<String>) -> Option<String> {
        raw.filter(|s| !s.is_empty())
    }
}
