// ── Tracker: application state coordinator ──
//
// Single source of truth for the consumer's view: current snapshot,
// link state, loading flag, and inline error. Owns the full lifecycle
// of the live channel -- no other component may hold the raw connection.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use allertrack_api::transport::TransportConfig;
use allertrack_api::types::SnapshotResponse;
use allertrack_api::{AllergenClient, LinkState, LiveHandle};

use crate::config::TrackerConfig;
use crate::error::CoreError;
use crate::model::{ExposureSnapshot, FeedEntry, FoodItem, MealDraft, MealReceipt};
use crate::store::SnapshotStore;

// ── ViewState ────────────────────────────────────────────────────────

/// Presentation-facing flags next to the snapshot itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// A one-shot operation is in flight and no data has arrived yet
    /// (or a manual refresh is running).
    pub loading: bool,
    /// Inline error from the last one-shot operation, if it failed.
    /// Channel failures never land here; they only show through
    /// [`LinkState`].
    pub error: Option<String>,
}

// ── Tracker ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Call [`start`](Self::start) to populate
/// initial state and open the live channel, [`refresh`](Self::refresh)
/// for a manual recompute, and [`shutdown`](Self::shutdown) at teardown.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    config: TrackerConfig,
    client: AllergenClient,
    store: SnapshotStore,
    view: watch::Sender<ViewState>,
    link: watch::Sender<LinkState>,
    live: Mutex<Option<LiveHandle>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Tracker {
    /// Create a tracker from configuration. Does not touch the network --
    /// call [`start`](Self::start).
    pub fn new(config: TrackerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client = AllergenClient::new(config.server_url.clone(), &transport)?;
        let (view, _) = watch::channel(ViewState::default());
        let (link, _) = watch::channel(LinkState::Disconnected);

        Ok(Self {
            inner: Arc::new(TrackerInner {
                config,
                client,
                store: SnapshotStore::new(),
                view,
                link,
                live: Mutex::new(None),
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    /// The underlying snapshot store.
    pub fn store(&self) -> &SnapshotStore {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Populate initial state: opens the live channel (if enabled) and
    /// runs the one-shot fetch concurrently with it. Whichever source
    /// produces data first clears the loading flag; the store's
    /// monotonic guard makes the outcome independent of arrival order.
    ///
    /// A failed initial fetch is not fatal -- it surfaces in
    /// [`view`](Self::view) and the channel may still converge.
    pub async fn start(&self) {
        self.set_view(|v| {
            v.loading = true;
            v.error = None;
        });

        if self.inner.config.live_updates {
            self.open_channel().await;
        }

        if let Err(e) = self.fetch_once().await {
            warn!(error = %e, "initial fetch failed");
        }
    }

    /// Tear everything down: closes the live channel (cancelling any
    /// pending reconnect) and joins background tasks. Safe to call more
    /// than once.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        if let Some(handle) = self.inner.live.lock().await.take() {
            handle.close();
        }

        let mut tasks = self.inner.tasks.lock().await;
        for task in tasks.drain(..) {
            let _ = task.await;
        }

        let _ = self.inner.link.send(LinkState::Disconnected);
        debug!("tracker shut down");
    }

    // ── One-shot operations ──────────────────────────────────────────

    /// Fetch the current snapshot and apply it to the store. The loading
    /// flag clears whether this succeeds or fails.
    pub async fn fetch_once(&self) -> Result<Arc<ExposureSnapshot>, CoreError> {
        let outcome = self.fetch_and_apply().await;
        self.settle_view(&outcome);
        outcome
    }

    /// Manual refresh: trigger the server-side recompute, wait for it,
    /// then fetch the freshly computed snapshot. Errors from either step
    /// surface as one inline message; loading clears on every path.
    pub async fn refresh(&self) -> Result<Arc<ExposureSnapshot>, CoreError> {
        self.set_view(|v| {
            v.loading = true;
            v.error = None;
        });

        let outcome = self.recompute_then_fetch().await;
        self.settle_view(&outcome);
        outcome
    }

    async fn recompute_then_fetch(&self) -> Result<Arc<ExposureSnapshot>, CoreError> {
        let receipt = self.inner.client.trigger_recompute().await?;
        debug!(status = %receipt.status, computed_at = %receipt.last_updated, "recompute complete");
        self.fetch_and_apply().await
    }

    async fn fetch_and_apply(&self) -> Result<Arc<ExposureSnapshot>, CoreError> {
        let resp = self.inner.client.fetch_snapshot().await?;
        self.inner.store.apply(ExposureSnapshot::from(resp));

        // Return what the store now holds -- a fresher live update may
        // have superseded the fetch while it was in flight.
        self.inner
            .store
            .current()
            .ok_or_else(|| CoreError::Internal("store empty after apply".into()))
    }

    // ── Pass-through operations ──────────────────────────────────────

    /// Fetch the read-only feed history.
    pub async fn feed_log(&self) -> Result<Vec<FeedEntry>, CoreError> {
        let log = self.inner.client.fetch_feed_log().await?;
        Ok(log.entries.into_iter().map(FeedEntry::from).collect())
    }

    /// Check server health; returns the server's status message.
    pub async fn health(&self) -> Result<String, CoreError> {
        Ok(self.inner.client.health().await?.message)
    }

    /// Analyze a meal photo into a reviewable draft.
    pub async fn analyze_photo(
        &self,
        image: Vec<u8>,
        file_name: String,
    ) -> Result<MealDraft, CoreError> {
        let resp = self.inner.client.analyze_meal_photo(image, file_name).await?;
        Ok(MealDraft::from(resp))
    }

    /// Submit a reviewed draft, consuming it.
    pub async fn submit_meal(&self, draft: MealDraft) -> Result<MealReceipt, CoreError> {
        let resp = self.inner.client.submit_meal(draft.submission()).await?;
        Ok(MealReceipt::from(resp))
    }

    /// Fetch the food/allergen autocomplete table.
    pub async fn food_suggestions(&self) -> Result<Vec<FoodItem>, CoreError> {
        let resp = self.inner.client.food_suggestions().await?;
        Ok(resp.suggestions.into_iter().map(FoodItem::from).collect())
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to snapshot replacements.
    pub fn snapshot(&self) -> watch::Receiver<Option<Arc<ExposureSnapshot>>> {
        self.inner.store.subscribe()
    }

    /// Subscribe to loading/error changes.
    pub fn view(&self) -> watch::Receiver<ViewState> {
        self.inner.view.subscribe()
    }

    /// Subscribe to live channel connectivity.
    pub fn link_state(&self) -> watch::Receiver<LinkState> {
        self.inner.link.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    /// (Re)open the live channel, tearing down any prior handle first.
    async fn open_channel(&self) {
        let url = if let Some(url) = self.inner.config.live_url.clone() {
            url
        } else {
            match self.inner.client.live_url() {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "cannot derive live channel URL");
                    return;
                }
            }
        };

        let mut guard = self.inner.live.lock().await;
        if let Some(prev) = guard.take() {
            prev.close();
        }

        let handle = LiveHandle::open(
            url,
            self.inner.config.reconnect.clone(),
            self.inner.cancel.child_token(),
        );
        let updates = handle.subscribe();
        let states = handle.link_state();
        *guard = Some(handle);
        drop(guard);

        let mut tasks = self.inner.tasks.lock().await;
        tasks.push(tokio::spawn(pump_task(self.clone(), updates)));
        tasks.push(tokio::spawn(link_relay_task(self.clone(), states)));
    }

    /// Apply a live update. Always a full replacement; an accepted update
    /// is authoritative and clears loading and error.
    fn apply_live_update(&self, resp: SnapshotResponse) {
        if self.inner.store.apply(ExposureSnapshot::from(resp)) {
            self.set_view(|v| {
                v.loading = false;
                v.error = None;
            });
        }
    }

    fn set_view(&self, f: impl FnOnce(&mut ViewState)) {
        self.inner.view.send_modify(f);
    }

    /// Clear loading and record/clear the inline error per the outcome.
    fn settle_view<T>(&self, outcome: &Result<T, CoreError>) {
        let error = outcome.as_ref().err().map(CoreError::user_message);
        self.set_view(|v| {
            v.loading = false;
            v.error = error;
        });
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Forward live updates from the channel into the store, in wire order.
async fn pump_task(tracker: Tracker, mut updates: broadcast::Receiver<Arc<SnapshotResponse>>) {
    loop {
        match updates.recv().await {
            Ok(update) => tracker.apply_live_update(update.as_ref().clone()),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "live update consumer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("live update pump exiting");
}

/// Mirror the channel's link state into the tracker-owned watch, so
/// consumers keep one subscription across channel re-opens.
async fn link_relay_task(tracker: Tracker, mut states: watch::Receiver<LinkState>) {
    let _ = tracker.inner.link.send(*states.borrow());

    loop {
        tokio::select! {
            biased;
            _ = tracker.inner.cancel.cancelled() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    // Channel loop exited (terminal retry exhaustion).
                    break;
                }
                let _ = tracker.inner.link.send(*states.borrow_and_update());
            }
        }
    }

    let _ = tracker.inner.link.send(LinkState::Disconnected);
    debug!("link relay exiting");
}
