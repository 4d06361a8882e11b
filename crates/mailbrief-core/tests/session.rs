//! Integration tests for the session wiring.
//!
//! These use a scripted in-process collaborator instead of a real backend
//! and an in-memory location instead of a browser address bar.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::advance;

use mailbrief_core::{
    ActionRequired, Category, CursorMode, Error, FilterChange, FilterPredicate, Listing,
    Location, MailboxClient, MailboxStats, MemoryLocation, Priority, ReportClient, ReportPayload,
    Result, SessionConfig, StatsClient, SummariesClient, SyncOutcome, SyncRequest, SyncResponse,
    TriageSession,
};

/// Collaborator that records every call and answers from fixed data.
#[derive(Default)]
struct FakeBackend {
    listing_calls: Mutex<Vec<FilterPredicate>>,
    report_calls: Mutex<Vec<FilterPredicate>>,
    sync_calls: Mutex<Vec<SyncRequest>>,
    next_page_token: Mutex<Option<String>>,
}

impl SummariesClient for FakeBackend {
    async fn list_summaries(&self, filter: &FilterPredicate) -> Result<Listing> {
        self.listing_calls.lock().unwrap().push(filter.clone());
        Ok(Listing {
            items: Vec::new(),
            total: 0,
        })
    }
}

impl MailboxClient for FakeBackend {
    async fn sync_mailbox(&self, request: &SyncRequest) -> Result<SyncResponse> {
        self.sync_calls.lock().unwrap().push(request.clone());
        Ok(SyncResponse {
            next_page_token: self.next_page_token.lock().unwrap().clone(),
        })
    }
}

impl ReportClient for FakeBackend {
    async fn generate_report(&self, filter: &FilterPredicate) -> Result<ReportPayload> {
        self.report_calls.lock().unwrap().push(filter.clone());
        Ok(ReportPayload {
            report: "## Executive summary".to_string(),
            email_count: 0,
        })
    }
}

impl StatsClient for FakeBackend {
    async fn fetch_stats(&self) -> Result<MailboxStats> {
        Ok(MailboxStats {
            total: 42,
            ..MailboxStats::default()
        })
    }
}

fn session_with(
    backend: Arc<FakeBackend>,
    initial_query: &str,
) -> TriageSession<FakeBackend> {
    let location: Arc<dyn Location> = Arc::new(MemoryLocation::new(initial_query));
    TriageSession::new(backend, location, SessionConfig::default())
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_initial_deep_link_seeds_the_predicate() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_with(
        Arc::clone(&backend),
        "category=promotions&action_required=true&ignored=x",
    );

    let predicate = session.snapshot();
    assert_eq!(predicate.category, Some(Category::Promotions));
    assert!(predicate.action_required.is_constrained());

    // Session start triggers the first listing fetch with that predicate.
    settle().await;
    let calls = backend.listing_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].category, Some(Category::Promotions));
}

#[tokio::test(start_paused = true)]
async fn test_mutation_mirrors_deep_link_and_refreshes_listing() {
    let backend = Arc::new(FakeBackend::default());
    let mut session = session_with(Arc::clone(&backend), "");
    settle().await;

    session.apply(FilterChange::Priority(Some(Priority::High)));
    settle().await;

    assert_eq!(session.deep_link(), "priority=high");
    let calls = backend.listing_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].priority, Some(Priority::High));
}

#[tokio::test(start_paused = true)]
async fn test_action_required_toggle_pair_round_trips_the_link() {
    let backend = Arc::new(FakeBackend::default());
    let mut session = session_with(backend, "");

    session.apply(FilterChange::ActionRequired(ActionRequired::Required));
    assert_eq!(session.deep_link(), "action_required=true");

    session.apply(FilterChange::ActionRequired(ActionRequired::Required));
    assert_eq!(session.deep_link(), "");
}

#[tokio::test(start_paused = true)]
async fn test_search_typing_is_debounced_before_the_listing() {
    let backend = Arc::new(FakeBackend::default());
    let mut session = session_with(Arc::clone(&backend), "");
    settle().await;
    assert_eq!(backend.listing_calls.lock().unwrap().len(), 1);

    // Three keystrokes in quick succession.
    for text in ["i", "in", "inv"] {
        session.apply(FilterChange::SearchText(Some(text.to_string())));
        settle().await;
        advance(Duration::from_millis(50)).await;
    }
    settle().await;

    // Nothing yet: the quiescence window has not elapsed.
    assert_eq!(backend.listing_calls.lock().unwrap().len(), 1);

    advance(Duration::from_millis(300)).await;
    settle().await;

    // One coalesced refresh carrying the final text.
    let calls = backend.listing_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].search_text.as_deref(), Some("inv"));
}

#[tokio::test(start_paused = true)]
async fn test_filter_changes_feed_the_report_requester() {
    let backend = Arc::new(FakeBackend::default());
    let mut session = session_with(Arc::clone(&backend), "");
    settle().await;

    session.apply(FilterChange::Category(Some(Category::Updates)));
    settle().await;
    assert!(backend.report_calls.lock().unwrap().is_empty());

    advance(Duration::from_secs(1)).await;
    settle().await;

    let calls = backend.report_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].category, Some(Category::Updates));
    assert_eq!(
        session.report_now().report.as_deref(),
        Some("## Executive summary")
    );
}

#[tokio::test(start_paused = true)]
async fn test_sync_flow_updates_cursor_and_refreshes_listing() {
    let backend = Arc::new(FakeBackend::default());
    *backend.next_page_token.lock().unwrap() = Some("token-1".to_string());
    let session = session_with(Arc::clone(&backend), "");
    settle().await;

    let outcome = session.sync_next().await.unwrap();
    assert_eq!(
        outcome,
        SyncOutcome::Synced {
            mode: CursorMode::Continuing
        }
    );
    settle().await;

    // Sync refreshed the listing on top of the initial fetch.
    assert_eq!(backend.listing_calls.lock().unwrap().len(), 2);

    // Reset discards the token; the next request starts from newest.
    session.reset_to_newest();
    assert_eq!(session.cursor_mode(), CursorMode::Fresh);
    session.sync_next().await.unwrap();
    let sync_calls = backend.sync_calls.lock().unwrap().clone();
    assert_eq!(sync_calls[1].page_token, None);
}

#[tokio::test(start_paused = true)]
async fn test_clear_resets_link_and_refetches() {
    let backend = Arc::new(FakeBackend::default());
    let mut session = session_with(Arc::clone(&backend), "category=social&limit=5");
    settle().await;

    session.clear_filters();
    settle().await;

    assert!(session.snapshot().is_empty());
    assert_eq!(session.deep_link(), "");
    let calls = backend.listing_calls.lock().unwrap().clone();
    assert!(calls.last().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stats_passthrough() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_with(backend, "");

    let stats = session.stats().await.unwrap();
    assert_eq!(stats.total, 42);
}

#[tokio::test(start_paused = true)]
async fn test_report_failure_does_not_disturb_listing() {
    /// Backend whose report generation always fails.
    struct FailingReports(FakeBackend);

    impl SummariesClient for FailingReports {
        async fn list_summaries(&self, filter: &FilterPredicate) -> Result<Listing> {
            self.0.list_summaries(filter).await
        }
    }
    impl MailboxClient for FailingReports {
        async fn sync_mailbox(&self, request: &SyncRequest) -> Result<SyncResponse> {
            self.0.sync_mailbox(request).await
        }
    }
    impl ReportClient for FailingReports {
        async fn generate_report(&self, _filter: &FilterPredicate) -> Result<ReportPayload> {
            Err(Error::Rejected {
                status: 500,
                message: "quota exceeded".to_string(),
            })
        }
    }
    impl StatsClient for FailingReports {
        async fn fetch_stats(&self) -> Result<MailboxStats> {
            self.0.fetch_stats().await
        }
    }

    let backend = Arc::new(FailingReports(FakeBackend::default()));
    let location: Arc<dyn Location> = Arc::new(MemoryLocation::new(""));
    let mut session = TriageSession::new(Arc::clone(&backend), location, SessionConfig::default());
    settle().await;

    session.apply(FilterChange::Category(Some(Category::Promotions)));
    settle().await;
    advance(Duration::from_secs(1)).await;
    settle().await;

    // The report shows the backend's error text verbatim...
    assert_eq!(
        session.report_now().error.as_deref(),
        Some("quota exceeded")
    );
    // ...while the listing carried on unaffected.
    assert_eq!(session.listing_now().error, None);
    assert_eq!(backend.0.listing_calls.lock().unwrap().len(), 2);
}
