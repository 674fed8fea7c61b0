//! Synchronization between the local quote store and the remote mirror.
//!
//! A sync fetches the remote quote set, appends anything new to the local
//! collection (deduplicated), persists, pushes the result back and records the
//! sync time. At most one sync runs at a time; overlapping attempts return
//! immediately.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;

use crate::domain::{
    dedupe, Notification, Quote, QuoteCollection, Result, SyncOutcome, SyncPhase, SyncState,
};
use crate::infrastructure::RemoteMirror;

use super::quote_store::SharedStore;

/// Orchestrates reconciliation between the quote store and a remote mirror.
pub struct SyncEngine {
    store: SharedStore,
    remote: Arc<dyn RemoteMirror>,
    notifier: mpsc::UnboundedSender<Notification>,
    in_flight: AtomicBool,
    state: Mutex<SyncState>,
}

/// Releases the single-flight flag when dropped.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SyncEngine {
    /// Create an engine, restoring the persisted sync state.
    ///
    /// # Errors
    /// Returns error if the sync state cannot be read.
    pub async fn new(
        store: SharedStore,
        remote: Arc<dyn RemoteMirror>,
        notifier: mpsc::UnboundedSender<Notification>,
    ) -> Result<Self> {
        // A crash mid-sync leaves the flag set.
        let state = store.lock().await.storage().get_sync_state()?.completed();

        Ok(Self {
            store,
            remote,
            notifier,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(state),
        })
    }

    /// Whether a sync is currently running.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        if self.in_flight.load(Ordering::Acquire) {
            SyncPhase::Syncing
        } else {
            SyncPhase::Idle
        }
    }

    /// Snapshot of the sync state.
    pub async fn state(&self) -> SyncState {
        self.state.lock().await.clone()
    }

    /// Run one sync attempt.
    pub async fn run_sync(&self) -> SyncOutcome {
        let Some(_guard) = FlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync already in progress, skipping");
            return SyncOutcome::Skipped;
        };

        tracing::info!("Starting sync...");
        let start = Instant::now();
        self.transition(SyncState::syncing).await;

        let fetched = match self.remote.fetch().await {
            Ok(quotes) => quotes,
            Err(e) => return self.fail(e.to_string()).await,
        };

        let (added, changed, local) = match self.merge(&fetched).await {
            Ok(merged) => merged,
            Err(e) => return self.fail(e.to_string()).await,
        };

        if changed {
            self.notify(Notification::merged(added));
        }

        if let Err(e) = self.remote.push(&local).await {
            tracing::debug!(error = %e, "Push to remote failed");
        }

        let quote_count = local.len();
        self.transition(|state| {
            let mut state = state.with_sync_time().clear_error().completed();
            state.last_merged = added;
            state.quote_count = quote_count;
            state
        })
        .await;

        tracing::info!(
            fetched = fetched.len(),
            added = added,
            quotes = quote_count,
            duration_ms = start.elapsed().as_millis(),
            "Sync completed"
        );

        if changed {
            SyncOutcome::Merged { added }
        } else {
            SyncOutcome::Unchanged
        }
    }

    /// Append-merge `fetched` into the store.
    ///
    /// Returns the number of new entries, whether the remote content differed
    /// from the local collection, and the resulting collection.
    async fn merge(&self, fetched: &[Quote]) -> Result<(usize, bool, QuoteCollection)> {
        let mut store = self.store.lock().await;
        // Another process may have written since this handle loaded.
        let local = store.reload()?;

        // Full-content, order-sensitive comparison.
        if local == fetched {
            return Ok((0, false, local.to_vec()));
        }

        let merged = dedupe(&[local, fetched].concat());
        let added = merged.len().saturating_sub(local.len());

        store.replace_all(merged.clone())?;
        Ok((added, true, merged))
    }

    async fn fail(&self, message: String) -> SyncOutcome {
        tracing::warn!(error = %message, "Sync failed");
        self.notify(Notification::failed(&message));
        self.transition(|state| state.with_error(message.clone()))
            .await;
        SyncOutcome::Failed { message }
    }

    /// Apply `update` to the sync state and persist it.
    async fn transition(&self, update: impl FnOnce(SyncState) -> SyncState) {
        let snapshot = {
            let mut state = self.state.lock().await;
            *state = update(state.clone());
            state.clone()
        };

        if let Err(e) = self
            .store
            .lock()
            .await
            .storage()
            .update_sync_state(&snapshot)
        {
            tracing::warn!(error = %e, "Failed to persist sync state");
        }
    }

    fn notify(&self, notification: Notification) {
        if self.notifier.send(notification).is_err() {
            tracing::trace!("Notification receiver dropped");
        }
    }

    /// Run a sync on every tick of a fixed interval until `shutdown` resolves.
    ///
    /// The first tick fires immediately. Each sync runs on its own task, so a
    /// tick that lands while a sync is still running is skipped.
    pub async fn run_periodic<F>(self: Arc<Self>, period: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let period = period.max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!(interval_ms = period.as_millis(), "Sync loop started");

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    if self.phase() == SyncPhase::Syncing {
                        tracing::debug!("Previous sync still running");
                    }
                    let engine = Arc::clone(&self);
                    tokio::spawn(async move {
                        engine.run_sync().await;
                    });
                }
            }
        }

        tracing::info!("Sync loop stopped");
    }
}
