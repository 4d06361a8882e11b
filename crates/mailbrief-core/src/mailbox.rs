//! Pagination cursor manager for the mailbox-sync collaborator.
//!
//! Tracks the opaque continuation token returned by the sync endpoint and
//! exposes "sync newest" vs "fetch more" semantics. Concurrent syncs are
//! collapsed, and a reset while a call is outstanding discards that call's
//! effect on the cursor (its listing-side effects still apply).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::client::{MailboxClient, SyncRequest};
use crate::error::Result;

/// How the next sync call will behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// No token stored; the next call fetches the newest items.
    Fresh,
    /// A token is stored; the next call appends older items.
    Continuing,
}

/// Outcome of a [`MailboxSyncer::sync_next`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The collaborator was called and the cursor updated.
    Synced {
        /// Cursor mode after the call.
        mode: CursorMode,
    },
    /// Another sync was already outstanding; no request was issued.
    Collapsed,
}

/// Batch parameters for sync calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum number of new summaries per call.
    pub limit: u32,
    /// How many days of history to scan.
    pub days_back: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        // Backend defaults.
        Self {
            limit: 10,
            days_back: 7,
        }
    }
}

/// Serializes sync calls and owns the continuation token.
pub struct MailboxSyncer<C> {
    client: Arc<C>,
    config: SyncConfig,
    token: Mutex<Option<String>>,
    /// Bumped by `reset_to_newest`; a completing sync only stores its
    /// token if the generation is unchanged since issuance.
    generation: AtomicU64,
    in_flight: AtomicBool,
}

impl<C: MailboxClient> MailboxSyncer<C> {
    /// Create a syncer starting in [`CursorMode::Fresh`].
    #[must_use]
    pub fn new(client: Arc<C>, config: SyncConfig) -> Self {
        Self {
            client,
            config,
            token: Mutex::new(None),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current cursor mode, derived from the stored token.
    #[must_use]
    pub fn mode(&self) -> CursorMode {
        if self.current_token().is_some() {
            CursorMode::Continuing
        } else {
            CursorMode::Fresh
        }
    }

    /// Unconditionally clear the token and return to [`CursorMode::Fresh`].
    ///
    /// An outstanding sync keeps running (no cancellation primitive over
    /// the transport), but its returned token will be discarded.
    pub fn reset_to_newest(&self) {
        debug!("resetting mailbox cursor to newest");
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.store_token(None);
    }

    /// Issue one sync call with the current cursor.
    ///
    /// A call made while another is outstanding is collapsed into a no-op
    /// so out-of-order responses can never corrupt the cursor.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure unchanged; the cursor is left
    /// exactly as it was.
    pub async fn sync_next(&self) -> Result<SyncOutcome> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("sync already outstanding, collapsing request");
            return Ok(SyncOutcome::Collapsed);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let request = SyncRequest {
            limit: self.config.limit,
            days_back: self.config.days_back,
            page_token: self.current_token(),
        };
        debug!(continuing = request.page_token.is_some(), "issuing mailbox sync");

        let result = self.client.sync_mailbox(&request).await;
        self.in_flight.store(false, Ordering::Release);

        match result {
            Ok(response) => {
                if self.generation.load(Ordering::Acquire) == generation {
                    self.store_token(response.next_page_token);
                } else {
                    debug!("cursor reset while sync was outstanding, token discarded");
                }
                Ok(SyncOutcome::Synced { mode: self.mode() })
            }
            Err(err) => {
                warn!(error = %err, "mailbox sync failed, cursor unchanged");
                Err(err)
            }
        }
    }

    fn current_token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_token(&self, token: Option<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }
}
