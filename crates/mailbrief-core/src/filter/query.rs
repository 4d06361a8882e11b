//! Deep-link codec: the bidirectional mapping between a [`FilterPredicate`]
//! and the address-bar query string.
//!
//! Serialization and parsing are inverses for every representable
//! predicate. Present fields become `key=value`; absent fields are
//! omitted entirely, never serialized as an empty string or `false`.
//! Parsing treats the query string as untrusted: unknown keys are ignored
//! and out-of-domain values normalize to absent.

use std::num::NonZeroU32;

use url::form_urlencoded;

use super::model::{
    ActionRequired, AttachmentFilter, Category, DateRange, FilterPredicate, Priority, SenderType,
};

const KEY_CATEGORY: &str = "category";
const KEY_PRIORITY: &str = "priority";
const KEY_SENDER_TYPE: &str = "sender_type";
const KEY_DATE_RANGE: &str = "date_range";
const KEY_ACTION_REQUIRED: &str = "action_required";
const KEY_HAS_ATTACHMENTS: &str = "has_attachments";
const KEY_SEARCH: &str = "search";
const KEY_LIMIT: &str = "limit";

impl FilterPredicate {
    /// Parse a query string (with or without a leading `?`) into a
    /// predicate. Never fails; malformed input degrades to absent fields.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut predicate = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                KEY_CATEGORY => predicate.category = Category::parse(&value),
                KEY_PRIORITY => predicate.priority = Priority::parse(&value),
                KEY_SENDER_TYPE => predicate.sender_type = SenderType::parse(&value),
                KEY_DATE_RANGE => predicate.date_range = DateRange::parse(&value),
                KEY_ACTION_REQUIRED => {
                    predicate.action_required = ActionRequired::parse(&value);
                }
                KEY_HAS_ATTACHMENTS => {
                    predicate.has_attachments = AttachmentFilter::parse(&value);
                }
                KEY_SEARCH => {
                    predicate.search_text = Self::normalize_search(Some(value.into_owned()));
                }
                KEY_LIMIT => {
                    predicate.result_limit = value.parse::<u32>().ok().and_then(NonZeroU32::new);
                }
                _ => {}
            }
        }

        predicate
    }

    /// Serialize into a query string (without a leading `?`).
    ///
    /// The all-absent predicate serializes to the empty string.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(category) = self.category {
            serializer.append_pair(KEY_CATEGORY, category.as_str());
        }
        if let Some(priority) = self.priority {
            serializer.append_pair(KEY_PRIORITY, priority.as_str());
        }
        if let Some(sender_type) = self.sender_type {
            serializer.append_pair(KEY_SENDER_TYPE, sender_type.as_str());
        }
        if let Some(date_range) = self.date_range {
            serializer.append_pair(KEY_DATE_RANGE, date_range.as_str());
        }
        if let Some(value) = self.action_required.as_query_value() {
            serializer.append_pair(KEY_ACTION_REQUIRED, value);
        }
        if let Some(value) = self.has_attachments.as_query_value() {
            serializer.append_pair(KEY_HAS_ATTACHMENTS, value);
        }
        if let Some(search) = &self.search_text {
            serializer.append_pair(KEY_SEARCH, search);
        }
        if let Some(limit) = self.result_limit {
            serializer.append_pair(KEY_LIMIT, &limit.to_string());
        }

        serializer.finish()
    }
}
