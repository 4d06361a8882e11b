//! Listing fetcher: retrieves the filtered summary list and totals.
//!
//! Unlike the report requester there is no built-in debounce; the listing
//! is the primary view and refreshes on every committed filter change.
//! Overlapping calls follow last-request-wins via [`SeqGate`] so rapid
//! filter changes can never leave a stale page on screen.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::client::SummariesClient;
use crate::filter::FilterPredicate;
use crate::model::EmailSummary;
use crate::seq::SeqGate;

/// User-visible listing state, published over a watch channel.
#[derive(Debug, Clone, Default)]
pub struct ListingStatus {
    /// Summaries currently on display.
    pub items: Vec<EmailSummary>,
    /// Total matches before the result limit; drives "N of M" displays.
    pub total: u64,
    /// Whether a refresh is outstanding.
    pub loading: bool,
    /// Error text from the most recent failed refresh, cleared by the
    /// next success. A failure never clears previously loaded items.
    pub error: Option<String>,
}

/// Fetches listings for predicate snapshots.
pub struct ListingFetcher<C> {
    client: Arc<C>,
    gate: Arc<SeqGate>,
    status: Arc<watch::Sender<ListingStatus>>,
}

impl<C> Clone for ListingFetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            gate: Arc::clone(&self.gate),
            status: Arc::clone(&self.status),
        }
    }
}

impl<C: SummariesClient> ListingFetcher<C> {
    /// Create a fetcher with an empty listing.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        let (status, _) = watch::channel(ListingStatus::default());
        Self {
            client,
            gate: Arc::new(SeqGate::new()),
            status: Arc::new(status),
        }
    }

    /// Subscribe to listing updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListingStatus> {
        self.status.subscribe()
    }

    /// The current listing state.
    #[must_use]
    pub fn current(&self) -> ListingStatus {
        self.status.borrow().clone()
    }

    /// Issue a refresh for the given predicate snapshot.
    ///
    /// Returns immediately; the result lands on the watch channel unless a
    /// later refresh completes first, in which case it is discarded.
    pub fn refresh(&self, snapshot: FilterPredicate) {
        let seq = self.gate.issue();
        debug!(seq, "refreshing listing");
        self.status.send_modify(|status| status.loading = true);

        let client = Arc::clone(&self.client);
        let gate = Arc::clone(&self.gate);
        let status = Arc::clone(&self.status);
        tokio::spawn(async move {
            let result = client.list_summaries(&snapshot).await;
            if !gate.admit(seq) {
                debug!(seq, "discarding stale listing response");
                return;
            }
            status.send_modify(|status| {
                status.loading = false;
                match result {
                    Ok(listing) => {
                        status.items = listing.items;
                        status.total = listing.total;
                        status.error = None;
                    }
                    Err(err) => status.error = Some(err.to_string()),
                }
            });
        });
    }
}
