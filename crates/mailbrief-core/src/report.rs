//! Debounced, race-safe on-demand report requester.
//!
//! A worker task observes filter changes, waits for a quiescence window,
//! issues a report-generation request, and guarantees only the most recent
//! response is ever surfaced. Outstanding network calls are never
//! cancelled; stale completions are discarded by sequence number.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::debug;

use crate::client::{ReportClient, ReportPayload};
use crate::debounce::wait_until;
use crate::error::Result;
use crate::filter::FilterPredicate;

/// Where the requester currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportPhase {
    /// No request pending, no timer running.
    #[default]
    Idle,
    /// A quiescence timer is running.
    PendingDebounce,
    /// At least one network request is outstanding.
    InFlight,
}

/// User-visible report state, published over a watch channel.
#[derive(Debug, Clone, Default)]
pub struct ReportStatus {
    /// Current cycle phase.
    pub phase: ReportPhase,
    /// The freshest successfully generated report, if any.
    pub report: Option<String>,
    /// How many emails the freshest report covers.
    pub email_count: Option<u64>,
    /// Error text from the most recent failed request, cleared by the
    /// next success.
    pub error: Option<String>,
}

enum Command {
    FilterChanged(FilterPredicate),
    Regenerate(FilterPredicate),
}

/// Cheap cloneable handle to the report worker task.
#[derive(Clone)]
pub struct ReportHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<ReportStatus>,
}

impl ReportHandle {
    /// Notify the worker that the filter predicate changed.
    ///
    /// (Re)starts the quiescence timer with this snapshot.
    pub fn filter_changed(&self, snapshot: FilterPredicate) {
        let _ = self.commands.send(Command::FilterChanged(snapshot));
    }

    /// Request a report immediately, bypassing the debounce timer.
    ///
    /// Still subject to sequence numbering and stale discard.
    pub fn regenerate(&self, snapshot: FilterPredicate) {
        let _ = self.commands.send(Command::Regenerate(snapshot));
    }

    /// Subscribe to status updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ReportStatus> {
        self.status.clone()
    }

    /// The current status.
    #[must_use]
    pub fn current(&self) -> ReportStatus {
        self.status.borrow().clone()
    }
}

/// Spawn the report worker and return its handle.
///
/// `quiescence` is the debounce window applied to filter changes.
#[must_use]
pub fn spawn_report_worker<C: ReportClient>(client: Arc<C>, quiescence: Duration) -> ReportHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(ReportStatus::default());
    let (response_tx, response_rx) = mpsc::unbounded_channel();

    let worker = ReportWorker {
        client,
        commands: command_rx,
        response_tx,
        responses: response_rx,
        status: status_tx,
        quiescence,
        pending: None,
        issued: 0,
        admitted: 0,
        outstanding: 0,
    };
    tokio::spawn(worker.run());

    ReportHandle {
        commands: command_tx,
        status: status_rx,
    }
}

struct ReportWorker<C> {
    client: Arc<C>,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Kept alive here so `responses.recv()` never yields `None`.
    response_tx: mpsc::UnboundedSender<(u64, Result<ReportPayload>)>,
    responses: mpsc::UnboundedReceiver<(u64, Result<ReportPayload>)>,
    status: watch::Sender<ReportStatus>,
    quiescence: Duration,
    /// Armed timer: fire deadline plus the predicate snapshot to send.
    pending: Option<(Instant, FilterPredicate)>,
    issued: u64,
    admitted: u64,
    outstanding: u32,
}

impl<C: ReportClient> ReportWorker<C> {
    async fn run(mut self) {
        loop {
            let deadline = self.pending.as_ref().map(|(deadline, _)| *deadline);
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    match command {
                        Command::FilterChanged(snapshot) => {
                            // Restart the window from zero; the previous
                            // pending snapshot is superseded.
                            self.pending = Some((Instant::now() + self.quiescence, snapshot));
                            self.publish_phase();
                        }
                        Command::Regenerate(snapshot) => {
                            self.pending = None;
                            self.issue(snapshot);
                        }
                    }
                }
                () = wait_until(deadline) => {
                    if let Some((_, snapshot)) = self.pending.take() {
                        self.issue(snapshot);
                    }
                }
                response = self.responses.recv() => {
                    if let Some((seq, result)) = response {
                        self.absorb(seq, result);
                    }
                }
            }
        }
    }

    /// Issue a request carrying the next sequence number. The network
    /// call runs detached; its completion comes back through `responses`.
    fn issue(&mut self, snapshot: FilterPredicate) {
        self.issued += 1;
        let seq = self.issued;
        self.outstanding += 1;
        debug!(seq, "issuing report request");
        self.publish_phase();

        let client = Arc::clone(&self.client);
        let response_tx = self.response_tx.clone();
        tokio::spawn(async move {
            let result = client.generate_report(&snapshot).await;
            let _ = response_tx.send((seq, result));
        });
    }

    /// Apply a completed response, unless a higher-numbered one already
    /// was.
    fn absorb(&mut self, seq: u64, result: Result<ReportPayload>) {
        self.outstanding = self.outstanding.saturating_sub(1);

        if seq > self.admitted {
            self.admitted = seq;
            self.status.send_modify(|status| match result {
                Ok(payload) => {
                    status.report = Some(payload.report);
                    status.email_count = Some(payload.email_count);
                    status.error = None;
                }
                Err(err) => {
                    status.error = Some(err.to_string());
                }
            });
        } else {
            debug!(seq, admitted = self.admitted, "discarding stale report response");
        }

        self.publish_phase();
    }

    fn publish_phase(&self) {
        let phase = if self.pending.is_some() {
            ReportPhase::PendingDebounce
        } else if self.outstanding > 0 {
            ReportPhase::InFlight
        } else {
            ReportPhase::Idle
        };
        self.status.send_modify(|status| status.phase = phase);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::time::{advance, sleep};

    use super::*;
    use crate::error::Error;
    use crate::filter::{Category, FilterChange, FilterStore, Priority};

    const WINDOW: Duration = Duration::from_secs(1);

    /// Scripted collaborator: records call snapshots and times, then
    /// waits the scripted delay before answering.
    struct ScriptedReports {
        calls: Mutex<Vec<(Instant, FilterPredicate)>>,
        script: Mutex<VecDeque<(Duration, Result<ReportPayload>)>>,
    }

    impl ScriptedReports {
        fn new(script: Vec<(Duration, Result<ReportPayload>)>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                script: Mutex::new(script.into_iter().collect()),
            })
        }

        fn calls(&self) -> Vec<(Instant, FilterPredicate)> {
            self.calls.lock().unwrap().clone()
        }

        fn payload(text: &str, email_count: u64) -> Result<ReportPayload> {
            Ok(ReportPayload {
                report: text.to_string(),
                email_count,
            })
        }
    }

    impl ReportClient for ScriptedReports {
        async fn generate_report(&self, filter: &FilterPredicate) -> Result<ReportPayload> {
            self.calls
                .lock()
                .unwrap()
                .push((Instant::now(), filter.clone()));
            let (delay, result) = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Duration::ZERO, ScriptedReports::payload("unscripted", 0)));
            if delay > Duration::ZERO {
                sleep(delay).await;
            }
            result
        }
    }

    fn predicate_with(priority: Priority) -> FilterPredicate {
        FilterPredicate {
            priority: Some(priority),
            ..FilterPredicate::default()
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_coalesce_into_one_request_at_quiescence() {
        let client = ScriptedReports::new(vec![(Duration::ZERO, ScriptedReports::payload("r", 1))]);
        let handle = spawn_report_worker(Arc::clone(&client), WINDOW);
        let start = Instant::now();

        // Mutations at t=0, t=200ms, t=900ms.
        handle.filter_changed(predicate_with(Priority::High));
        settle().await;
        advance(Duration::from_millis(200)).await;
        handle.filter_changed(predicate_with(Priority::Medium));
        settle().await;
        advance(Duration::from_millis(700)).await;
        handle.filter_changed(predicate_with(Priority::Low));
        settle().await;

        advance(Duration::from_millis(999)).await;
        settle().await;
        assert!(client.calls().is_empty());

        advance(Duration::from_millis(1)).await;
        settle().await;

        // Exactly one request, at t=1900, carrying the t=900 predicate.
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0 - start, Duration::from_millis(1900));
        assert_eq!(calls[0].1, predicate_with(Priority::Low));

        let status = handle.current();
        assert_eq!(status.report.as_deref(), Some("r"));
        assert_eq!(status.phase, ReportPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_overwrites_fresher_one() {
        let client = ScriptedReports::new(vec![
            (Duration::from_secs(5), ScriptedReports::payload("old", 1)),
            (Duration::from_millis(100), ScriptedReports::payload("new", 2)),
        ]);
        let handle = spawn_report_worker(Arc::clone(&client), WINDOW);

        handle.filter_changed(predicate_with(Priority::High));
        settle().await;
        advance(WINDOW).await;
        settle().await;
        assert_eq!(client.calls().len(), 1);

        // Mutation while in flight schedules a fresh cycle; no cancellation.
        handle.filter_changed(predicate_with(Priority::Low));
        settle().await;
        advance(WINDOW).await;
        settle().await;
        assert_eq!(client.calls().len(), 2);

        // Second (fresher) request resolves first.
        advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(handle.current().report.as_deref(), Some("new"));
        assert_eq!(handle.current().email_count, Some(2));

        // First request finally resolves; it must be discarded.
        advance(Duration::from_secs(5)).await;
        settle().await;
        let status = handle.current();
        assert_eq!(status.report.as_deref(), Some("new"));
        assert_eq!(status.phase, ReportPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_bypasses_debounce() {
        let client = ScriptedReports::new(vec![(
            Duration::ZERO,
            ScriptedReports::payload("manual", 3),
        )]);
        let handle = spawn_report_worker(Arc::clone(&client), WINDOW);

        handle.regenerate(predicate_with(Priority::High));
        settle().await;

        // Issued immediately, no time advanced.
        assert_eq!(client.calls().len(), 1);
        assert_eq!(handle.current().report.as_deref(), Some("manual"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_records_error_and_returns_to_idle() {
        let client = ScriptedReports::new(vec![(
            Duration::ZERO,
            Err(Error::Rejected {
                status: 500,
                message: "quota exceeded".to_string(),
            }),
        )]);
        let handle = spawn_report_worker(Arc::clone(&client), WINDOW);

        handle.filter_changed(FilterPredicate {
            category: Some(Category::Promotions),
            ..FilterPredicate::default()
        });
        settle().await;
        advance(WINDOW).await;
        settle().await;

        let status = handle.current();
        assert_eq!(status.error.as_deref(), Some("quota exceeded"));
        assert_eq!(status.report, None);
        assert_eq!(status.phase, ReportPhase::Idle);

        // No automatic retry.
        advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_success_clears_previous_error() {
        let client = ScriptedReports::new(vec![
            (
                Duration::ZERO,
                Err(Error::Transport("connection refused".to_string())),
            ),
            (Duration::ZERO, ScriptedReports::payload("recovered", 2)),
        ]);
        let handle = spawn_report_worker(Arc::clone(&client), WINDOW);

        handle.filter_changed(predicate_with(Priority::High));
        settle().await;
        advance(WINDOW).await;
        settle().await;
        assert!(handle.current().error.is_some());

        handle.regenerate(predicate_with(Priority::High));
        settle().await;

        let status = handle.current();
        assert_eq!(status.report.as_deref(), Some("recovered"));
        assert_eq!(status.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phases_track_the_cycle() {
        let client = ScriptedReports::new(vec![(
            Duration::from_millis(50),
            ScriptedReports::payload("r", 1),
        )]);
        let handle = spawn_report_worker(Arc::clone(&client), WINDOW);
        assert_eq!(handle.current().phase, ReportPhase::Idle);

        handle.filter_changed(predicate_with(Priority::High));
        settle().await;
        assert_eq!(handle.current().phase, ReportPhase::PendingDebounce);

        advance(WINDOW).await;
        settle().await;
        assert_eq!(handle.current().phase, ReportPhase::InFlight);

        advance(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(handle.current().phase, ReportPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_observer_feeds_worker() {
        let client = ScriptedReports::new(vec![(Duration::ZERO, ScriptedReports::payload("r", 1))]);
        let handle = spawn_report_worker(Arc::clone(&client), WINDOW);

        let mut store = FilterStore::new(FilterPredicate::default());
        {
            let handle = handle.clone();
            store.subscribe(move |predicate, _| handle.filter_changed(predicate.clone()));
        }

        store.apply(FilterChange::Priority(Some(Priority::High)));
        settle().await;
        advance(WINDOW).await;
        settle().await;

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.priority, Some(Priority::High));
    }
}
