//! Session wiring: one store, all dependents.
//!
//! `TriageSession` is created once per browsing session and owns the
//! filter store; every other component observes it. There is no ambient
//! global state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use crate::client::{MailboxClient, ReportClient, StatsClient, SummariesClient};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::filter::{FilterChange, FilterPredicate, FilterStore};
use crate::listing::{ListingFetcher, ListingStatus};
use crate::mailbox::{CursorMode, MailboxSyncer, SyncConfig, SyncOutcome};
use crate::model::MailboxStats;
use crate::report::{ReportHandle, ReportStatus, spawn_report_worker};
use crate::urlsync::{Location, UrlSync};

/// Tunables for a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Quiescence window for the report requester.
    pub report_quiescence: Duration,
    /// Debounce window applied to search-text listing refreshes.
    pub search_debounce: Duration,
    /// Mailbox-sync batch parameters.
    pub sync: SyncConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            report_quiescence: Duration::from_secs(1),
            search_debounce: Duration::from_millis(300),
            sync: SyncConfig::default(),
        }
    }
}

/// A browsing session over the triage backend.
///
/// Data flow: user interaction mutates the filter store; the deep link is
/// mirrored and the listing fetcher and report requester re-run against
/// the new predicate. The pagination cursor is touched only by the
/// explicit sync actions.
pub struct TriageSession<C> {
    filters: FilterStore,
    url: UrlSync,
    listing: ListingFetcher<C>,
    report: ReportHandle,
    mailbox: MailboxSyncer<C>,
    client: Arc<C>,
}

impl<C> TriageSession<C>
where
    C: SummariesClient + MailboxClient + ReportClient + StatsClient,
{
    /// Build a session: parse the initial deep link, wire the observers,
    /// and kick off the first listing fetch.
    #[must_use]
    pub fn new(client: Arc<C>, location: Arc<dyn Location>, config: SessionConfig) -> Self {
        let url = UrlSync::new(location);
        let initial = url.initial_predicate();
        info!(deep_link = %initial.to_query(), "starting triage session");

        let mut filters = FilterStore::new(initial);
        let listing = ListingFetcher::new(Arc::clone(&client));
        let report = spawn_report_worker(Arc::clone(&client), config.report_quiescence);
        let mailbox = MailboxSyncer::new(Arc::clone(&client), config.sync);

        // Observer order matters: the deep link is mirrored before any
        // network activity is scheduled for the new predicate.
        {
            let url = url.clone();
            filters.subscribe(move |predicate, _| url.mirror(predicate));
        }
        {
            let report = report.clone();
            filters.subscribe(move |predicate, _| report.filter_changed(predicate.clone()));
        }
        {
            // Search keystrokes are debounced before they reach the
            // fetcher; committed changes refresh immediately.
            let search_debounce = Debouncer::spawn(config.search_debounce, {
                let listing = listing.clone();
                move |snapshot| listing.refresh(snapshot)
            });
            let listing = listing.clone();
            filters.subscribe(move |predicate, change| {
                if matches!(change, FilterChange::SearchText(_)) {
                    search_debounce.push(predicate.clone());
                } else {
                    listing.refresh(predicate.clone());
                }
            });
        }

        listing.refresh(filters.snapshot());

        Self {
            filters,
            url,
            listing,
            report,
            mailbox,
            client,
        }
    }

    /// Apply a single-field filter mutation.
    pub fn apply(&mut self, change: FilterChange) {
        self.filters.apply(change);
    }

    /// Reset every filter field to absent.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// An immutable copy of the active predicate.
    #[must_use]
    pub fn snapshot(&self) -> FilterPredicate {
        self.filters.snapshot()
    }

    /// The shareable deep-link query string for the current predicate.
    #[must_use]
    pub fn deep_link(&self) -> String {
        self.url.current_query()
    }

    /// Subscribe to listing updates.
    #[must_use]
    pub fn listing(&self) -> watch::Receiver<ListingStatus> {
        self.listing.subscribe()
    }

    /// The current listing state.
    #[must_use]
    pub fn listing_now(&self) -> ListingStatus {
        self.listing.current()
    }

    /// Subscribe to report updates.
    #[must_use]
    pub fn report(&self) -> watch::Receiver<ReportStatus> {
        self.report.subscribe()
    }

    /// The current report state.
    #[must_use]
    pub fn report_now(&self) -> ReportStatus {
        self.report.current()
    }

    /// Request a report for the active predicate immediately, bypassing
    /// the debounce window.
    pub fn regenerate_report(&self) {
        self.report.regenerate(self.filters.snapshot());
    }

    /// Current pagination cursor mode.
    #[must_use]
    pub fn cursor_mode(&self) -> CursorMode {
        self.mailbox.mode()
    }

    /// Discard the continuation token; the next sync fetches newest items.
    pub fn reset_to_newest(&self) {
        self.mailbox.reset_to_newest();
    }

    /// Run one mailbox-sync step, then refresh the listing so newly
    /// ingested summaries appear.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure; the cursor and listing are left
    /// unchanged.
    pub async fn sync_next(&self) -> Result<SyncOutcome> {
        let outcome = self.mailbox.sync_next().await?;
        if matches!(outcome, SyncOutcome::Synced { .. }) {
            self.listing.refresh(self.filters.snapshot());
        }
        Ok(outcome)
    }

    /// Fetch aggregate mailbox statistics.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure unchanged.
    pub async fn stats(&self) -> Result<MailboxStats> {
        self.client.fetch_stats().await
    }
}
