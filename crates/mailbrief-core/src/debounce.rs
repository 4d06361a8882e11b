//! Generic quiescence-window debouncer.
//!
//! Delays an action until no new value has arrived for a full window.
//! Each arriving value restarts the window and supersedes the previous
//! pending value. The session uses this to bound listing request volume
//! while the user is typing a search term.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Awaits the deadline when present, forever otherwise.
///
/// Shaped for `tokio::select!` arms that only sometimes have a timer.
pub(crate) async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Handle to a debounce task.
///
/// Dropping every handle stops the task; a value still pending at that
/// point is discarded.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn a debounce task with the given quiescence window.
    ///
    /// `action` runs with the most recent value once the window elapses
    /// without a newer one arriving.
    pub fn spawn(window: Duration, mut action: impl FnMut(T) + Send + 'static) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            let mut pending: Option<(Instant, T)> = None;
            loop {
                let deadline = pending.as_ref().map(|(deadline, _)| *deadline);
                tokio::select! {
                    value = rx.recv() => {
                        match value {
                            Some(value) => pending = Some((Instant::now() + window, value)),
                            None => break,
                        }
                    }
                    () = wait_until(deadline) => {
                        if let Some((_, value)) = pending.take() {
                            action(value);
                        }
                    }
                }
            }
        });

        Self { tx }
    }

    /// Submit a value, restarting the quiescence window.
    pub fn push(&self, value: T) {
        // Send only fails when the task is gone, i.e. during teardown.
        let _ = self.tx.send(value);
    }
}
