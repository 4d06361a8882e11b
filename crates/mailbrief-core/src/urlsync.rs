//! Deep-link synchronization.
//!
//! Mirrors every filter mutation into the host environment's address bar
//! (or whatever stands in for it) with replace-current-location semantics.
//! History entries themselves belong to the host; this module only reads
//! the query string at startup and rewrites it on change.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::filter::FilterPredicate;

/// The address bar as a collaborator.
pub trait Location: Send + Sync {
    /// Current query string (without the leading `?`).
    fn query(&self) -> String;

    /// Replace the query string without pushing a history entry.
    fn replace_query(&self, query: &str);
}

/// In-memory [`Location`] for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    query: Mutex<String>,
}

impl MemoryLocation {
    /// Create a location holding the given initial query string.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            query: Mutex::new(initial.into()),
        }
    }
}

impl Location for MemoryLocation {
    fn query(&self) -> String {
        self.query
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_query(&self, query: &str) {
        *self.query.lock().unwrap_or_else(PoisonError::into_inner) = query.to_string();
    }
}

/// Binds the deep-link codec to a [`Location`].
#[derive(Clone)]
pub struct UrlSync {
    location: Arc<dyn Location>,
}

impl UrlSync {
    /// Create a synchronizer over the given location.
    #[must_use]
    pub fn new(location: Arc<dyn Location>) -> Self {
        Self { location }
    }

    /// Parse the location's current query string into a predicate.
    #[must_use]
    pub fn initial_predicate(&self) -> FilterPredicate {
        FilterPredicate::from_query(&self.location.query())
    }

    /// Rewrite the location's query string to match the predicate.
    pub fn mirror(&self, predicate: &FilterPredicate) {
        let query = predicate.to_query();
        debug!(%query, "mirroring filter state to location");
        self.location.replace_query(&query);
    }

    /// The query string currently held by the location.
    #[must_use]
    pub fn current_query(&self) -> String {
        self.location.query()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Category, Priority};

    #[test]
    fn test_initial_predicate_from_location() {
        let location = Arc::new(MemoryLocation::new("category=forums&priority=low"));
        let sync = UrlSync::new(location);

        let predicate = sync.initial_predicate();
        assert_eq!(predicate.category, Some(Category::Forums));
        assert_eq!(predicate.priority, Some(Priority::Low));
    }

    #[test]
    fn test_mirror_rewrites_query() {
        let location = Arc::new(MemoryLocation::new("category=forums"));
        let sync = UrlSync::new(Arc::clone(&location) as Arc<dyn Location>);

        let predicate = FilterPredicate {
            priority: Some(Priority::High),
            ..FilterPredicate::default()
        };
        sync.mirror(&predicate);

        assert_eq!(location.query(), "priority=high");
    }

    #[test]
    fn test_mirror_of_empty_predicate_clears_query() {
        let location = Arc::new(MemoryLocation::new("category=social"));
        let sync = UrlSync::new(Arc::clone(&location) as Arc<dyn Location>);

        sync.mirror(&FilterPredicate::default());

        assert_eq!(location.query(), "");
    }
}
