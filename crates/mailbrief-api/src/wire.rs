//! Wire types and response parsing for the backend's REST contract.
//!
//! Parsing is written over `(status, body)` pairs rather than live
//! responses so every error-mapping rule is unit testable.

use mailbrief_core::{
    EmailSummary, Error, FilterPredicate, Listing, MailboxStats, ReportPayload, Result,
    SyncRequest, SyncResponse,
};
use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// `GET /emails/summaries` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingDto {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub data: Vec<EmailSummary>,
}

/// `POST /emails/fetch/gmail` request body.
#[derive(Debug, Serialize)]
pub(crate) struct SyncRequestDto<'a> {
    pub limit: u32,
    pub days_back: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
}

impl<'a> From<&'a SyncRequest> for SyncRequestDto<'a> {
    fn from(request: &'a SyncRequest) -> Self {
        Self {
            limit: request.limit,
            days_back: request.days_back,
            page_token: request.page_token.as_deref(),
        }
    }
}

/// `POST /emails/fetch/gmail` response.
#[derive(Debug, Deserialize)]
pub(crate) struct SyncResponseDto {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// `POST /reports/summary` request body.
///
/// The backend's filter object: absent fields are omitted entirely, the
/// tri-state constraints become `true` or nothing, and there is no limit
/// field (the report always covers the whole filtered set).
#[derive(Debug, Serialize)]
pub(crate) struct ReportRequestDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_attachments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
}

impl<'a> From<&'a FilterPredicate> for ReportRequestDto<'a> {
    fn from(filter: &'a FilterPredicate) -> Self {
        Self {
            category: filter.category.map(|v| v.as_str()),
            priority: filter.priority.map(|v| v.as_str()),
            sender_type: filter.sender_type.map(|v| v.as_str()),
            date_range: filter.date_range.map(|v| v.as_str()),
            action_required: filter.action_required.as_body_value(),
            has_attachments: filter.has_attachments.as_body_value(),
            search: filter.search_text.as_deref(),
        }
    }
}

/// `POST /reports/summary` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ReportDto {
    #[serde(default)]
    pub email_count: u64,
    pub report: String,
}

/// Query parameters for the listing endpoint: only present filter fields,
/// plus a cache-busting timestamp.
pub(crate) fn summary_query_pairs(
    filter: &FilterPredicate,
    cache_bust_millis: i64,
) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(category) = filter.category {
        pairs.push(("category", category.as_str().to_string()));
    }
    if let Some(priority) = filter.priority {
        pairs.push(("priority", priority.as_str().to_string()));
    }
    if let Some(sender_type) = filter.sender_type {
        pairs.push(("sender_type", sender_type.as_str().to_string()));
    }
    if let Some(date_range) = filter.date_range {
        pairs.push(("date_range", date_range.as_str().to_string()));
    }
    if let Some(value) = filter.action_required.as_query_value() {
        pairs.push(("action_required", value.to_string()));
    }
    if let Some(value) = filter.has_attachments.as_query_value() {
        pairs.push(("has_attachments", value.to_string()));
    }
    if let Some(search) = &filter.search_text {
        pairs.push(("search", search.clone()));
    }
    if let Some(limit) = filter.result_limit {
        pairs.push(("limit", limit.to_string()));
    }
    pairs.push(("_", cache_bust_millis.to_string()));
    pairs
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Extract human-readable error text from a failure body.
///
/// Tries the given JSON keys in order, then falls back to the raw body.
fn rejection_text(body: &[u8], keys: &[&str]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in keys {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_string();
            }
        }
    }
    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        "request failed".to_string()
    } else {
        raw.to_string()
    }
}

fn decode_err(err: &serde_json::Error) -> Error {
    Error::Decode(err.to_string())
}

pub(crate) fn parse_listing(status: u16, body: &[u8]) -> Result<Listing> {
    if !is_success(status) {
        return Err(Error::Rejected {
            status,
            message: rejection_text(body, &["detail"]),
        });
    }
    let dto: ListingDto = serde_json::from_slice(body).map_err(|e| decode_err(&e))?;
    if !dto.success {
        return Err(Error::Rejected {
            status,
            message: rejection_text(body, &["detail", "message"]),
        });
    }
    Ok(Listing {
        items: dto.data,
        total: dto.total,
    })
}

pub(crate) fn parse_sync(status: u16, body: &[u8]) -> Result<SyncResponse> {
    if !is_success(status) {
        return Err(Error::Rejected {
            status,
            message: rejection_text(body, &["detail"]),
        });
    }
    let dto: SyncResponseDto = serde_json::from_slice(body).map_err(|e| decode_err(&e))?;
    if !dto.success {
        return Err(Error::Rejected {
            status,
            message: rejection_text(body, &["detail", "message"]),
        });
    }
    Ok(SyncResponse {
        next_page_token: dto.next_page_token,
    })
}

pub(crate) fn parse_report(status: u16, body: &[u8]) -> Result<ReportPayload> {
    if !is_success(status) {
        // The report endpoint puts its human-readable failure text under
        // the same `report` key it uses for success.
        return Err(Error::Rejected {
            status,
            message: rejection_text(body, &["report", "detail"]),
        });
    }
    let dto: ReportDto = serde_json::from_slice(body).map_err(|e| decode_err(&e))?;
    Ok(ReportPayload {
        report: dto.report,
        email_count: dto.email_count,
    })
}

pub(crate) fn parse_stats(status: u16, body: &[u8]) -> Result<MailboxStats> {
    if !is_success(status) {
        return Err(Error::Rejected {
            status,
            message: rejection_text(body, &["detail"]),
        });
    }
    serde_json::from_slice(body).map_err(|e| decode_err(&e))
}
