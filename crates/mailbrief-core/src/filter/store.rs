//! Canonical filter state store.
//!
//! Single source of truth for the active [`FilterPredicate`]. Every
//! mutation notifies registered observers synchronously, after the change
//! is fully applied, so no observer ever sees a half-updated predicate.

use std::num::NonZeroU32;

use tracing::debug;

use super::model::{
    ActionRequired, AttachmentFilter, Category, DateRange, FilterPredicate, Priority, SenderType,
};

/// A single-field mutation of the predicate.
///
/// Each variant replaces exactly one field and leaves the others untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// Replace the category constraint.
    Category(Option<Category>),
    /// Replace the priority constraint.
    Priority(Option<Priority>),
    /// Replace the sender-type constraint.
    SenderType(Option<SenderType>),
    /// Replace the date-window constraint.
    DateRange(Option<DateRange>),
    /// Set the action-required constraint.
    ///
    /// Setting `Required` while already `Required` toggles back to
    /// `Unconstrained`: the control acts as an on/off switch.
    ActionRequired(ActionRequired),
    /// Set the attachment constraint. Same toggle semantics as
    /// `ActionRequired`.
    HasAttachments(AttachmentFilter),
    /// Replace the search text. Empty strings normalize to absent.
    SearchText(Option<String>),
    /// Replace the result limit.
    ResultLimit(Option<NonZeroU32>),
    /// All fields reset to absent. Emitted by [`FilterStore::clear`] only.
    Cleared,
}

type Observer = Box<dyn FnMut(&FilterPredicate, &FilterChange) + Send>;

/// Owns the canonical predicate and its observers.
///
/// Created once per session and passed explicitly to consumers; there is
/// no ambient singleton.
pub struct FilterStore {
    predicate: FilterPredicate,
    observers: Vec<Observer>,
}

impl FilterStore {
    /// Create a store with the given initial predicate (usually parsed
    /// from the session's starting deep link).
    #[must_use]
    pub const fn new(initial: FilterPredicate) -> Self {
        Self {
            predicate: initial,
            observers: Vec::new(),
        }
    }

    /// Register an observer. Observers run synchronously on every
    /// mutation, in registration order.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&FilterPredicate, &FilterChange) + Send + 'static,
    ) {
        self.observers.push(Box::new(observer));
    }

    /// An immutable copy of the current predicate.
    #[must_use]
    pub fn snapshot(&self) -> FilterPredicate {
        self.predicate.clone()
    }

    /// Apply a single-field mutation and notify observers.
    pub fn apply(&mut self, change: FilterChange) {
        debug!(?change, "applying filter change");
        match &change {
            FilterChange::Category(value) => self.predicate.category = *value,
            FilterChange::Priority(value) => self.predicate.priority = *value,
            FilterChange::SenderType(value) => self.predicate.sender_type = *value,
            FilterChange::DateRange(value) => self.predicate.date_range = *value,
            FilterChange::ActionRequired(value) => {
                // Re-selecting the active constraint switches it off.
                self.predicate.action_required =
                    if *value == ActionRequired::Required && value == &self.predicate.action_required
                    {
                        ActionRequired::Unconstrained
                    } else {
                        *value
                    };
            }
            FilterChange::HasAttachments(value) => {
                self.predicate.has_attachments = if *value == AttachmentFilter::WithAttachments
                    && value == &self.predicate.has_attachments
                {
                    AttachmentFilter::Unconstrained
                } else {
                    *value
                };
            }
            FilterChange::SearchText(value) => {
                self.predicate.search_text = FilterPredicate::normalize_search(value.clone());
            }
            FilterChange::ResultLimit(value) => self.predicate.result_limit = *value,
            FilterChange::Cleared => self.predicate = FilterPredicate::default(),
        }
        self.notify(&change);
    }

    /// Reset every field to absent and notify observers once.
    pub fn clear(&mut self) {
        self.apply(FilterChange::Cleared);
    }

    fn notify(&mut self, change: &FilterChange) {
        for observer in &mut self.observers {
            observer(&self.predicate, change);
        }
    }
}
