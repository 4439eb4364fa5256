//! Live sync channel with auto-reconnect.
//!
//! Maintains a single logical persistent connection to the tracker's
//! `/ws/allergens` endpoint and delivers validated full-replacement
//! snapshots through a [`tokio::sync::broadcast`] channel. Transient
//! failures are absorbed by a bounded exponential-backoff retry loop;
//! malformed frames are dropped without touching the connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use allertrack_api::live::{LiveHandle, ReconnectPolicy};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("ws://tracker.local:8000/ws/allergens")?;
//!
//! let handle = LiveHandle::open(url, ReconnectPolicy::default(), cancel.clone());
//! let mut rx = handle.subscribe();
//!
//! while let Ok(snapshot) = rx.recv().await {
//!     println!("{} allergens at {}", snapshot.allergens.len(), snapshot.last_updated);
//! }
//!
//! handle.close();
//! ```

mod connector;
mod policy;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::types::SnapshotResponse;

pub use connector::{Connector, FrameSource, WsConnector};
pub use policy::{ReconnectPolicy, RetryAction, RetryState};

// ── Broadcast channel capacity ───────────────────────────────────────

const UPDATE_CHANNEL_CAPACITY: usize = 64;

// ── LinkState ────────────────────────────────────────────────────────

/// Connectivity of the live channel, owned exclusively by the channel
/// loop and read-only everywhere else.
///
/// Starts `Connecting` when the channel opens, becomes `Connected` on a
/// successful handshake, and `Disconnected` on any termination -- after
/// which the loop reconnects on its own unless it was closed or the
/// retry budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

// ── LiveHandle ───────────────────────────────────────────────────────

/// Handle to a running live sync channel.
///
/// Dropping the handle does not stop the background loop; call
/// [`close`](Self::close), the single authoritative teardown path.
pub struct LiveHandle {
    update_rx: broadcast::Receiver<Arc<SnapshotResponse>>,
    state_rx: watch::Receiver<LinkState>,
    cancel: CancellationToken,
}

impl LiveHandle {
    /// Open the channel and spawn the reconnection loop.
    ///
    /// Returns immediately; the first connection attempt happens
    /// asynchronously. Subscribe to the update receiver to start
    /// consuming snapshots.
    pub fn open(url: Url, policy: ReconnectPolicy, cancel: CancellationToken) -> Self {
        Self::open_with(WsConnector, url, policy, cancel)
    }

    /// Open with a custom connector. Tests inject scripted fakes here.
    pub(crate) fn open_with<C: Connector>(
        connector: C,
        url: Url,
        policy: ReconnectPolicy,
        cancel: CancellationToken,
    ) -> Self {
        let (update_tx, update_rx) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(LinkState::Connecting);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            channel_loop(connector, url, update_tx, state_tx, policy, task_cancel).await;
        });

        Self {
            update_rx,
            state_rx,
            cancel,
        }
    }

    /// Get a new receiver for snapshot updates.
    ///
    /// Each valid wire frame yields exactly one received snapshot, in
    /// wire-arrival order. A consumer that falls behind receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<SnapshotResponse>> {
        self.update_rx.resubscribe()
    }

    /// Observe link state transitions.
    pub fn link_state(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    /// Tear the channel down: cancels any pending reconnect sleep and
    /// terminates the active connection. Safe to call multiple times.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect, read until the connection dies, then back off and
/// reconnect until cancelled or the retry budget is exhausted.
async fn channel_loop<C: Connector>(
    connector: C,
    url: Url,
    update_tx: broadcast::Sender<Arc<SnapshotResponse>>,
    state_tx: watch::Sender<LinkState>,
    policy: ReconnectPolicy,
    cancel: CancellationToken,
) {
    let mut retry = RetryState::new();

    loop {
        if cancel.is_cancelled() {
            break;
        }
        let _ = state_tx.send(LinkState::Connecting);

        let ended =
            run_connection(&connector, &url, &update_tx, &state_tx, &mut retry, &cancel).await;
        let _ = state_tx.send(LinkState::Disconnected);

        if cancel.is_cancelled() {
            break;
        }

        match ended {
            Ok(()) => tracing::info!("live channel disconnected"),
            Err(ref e) => {
                tracing::warn!(error = %e, attempt = retry.attempt(), "live channel error");
            }
        }

        match retry.disconnected(&policy) {
            RetryAction::Sleep(delay) => {
                tracing::info!(
                    delay_ms = delay.as_millis() as u64,
                    "waiting before reconnect"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
            RetryAction::GiveUp => {
                tracing::error!(
                    max_attempts = policy.max_attempts,
                    "reconnect budget exhausted, giving up until reopened"
                );
                break;
            }
        }
    }

    let _ = state_tx.send(LinkState::Disconnected);
    tracing::debug!("live channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one connection and read frames until it drops.
///
/// `Ok(())` means a clean end (server close, stream end, or caller
/// cancellation); an error means the connect or transport failed. Either
/// way the caller decides whether to retry.
async fn run_connection<C: Connector>(
    connector: &C,
    url: &Url,
    update_tx: &broadcast::Sender<Arc<SnapshotResponse>>,
    state_tx: &watch::Sender<LinkState>,
    retry: &mut RetryState,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to live channel");

    let mut source = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(()),
        result = connector.connect(url) => result?,
    };

    tracing::info!("live channel connected");
    let _ = state_tx.send(LinkState::Connected);
    retry.connected();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            frame = source.next_frame() => {
                match frame {
                    Some(Ok(text)) => decode_and_publish(&text, update_tx),
                    Some(Err(e)) => return Err(e),
                    None => return Ok(()),
                }
            }
        }
    }
}

// ── Frame decoding ───────────────────────────────────────────────────

/// Outcome of decoding one inbound text frame.
#[derive(Debug)]
pub(crate) enum FrameOutcome {
    /// A valid `update` frame: full-replacement snapshot.
    Update(SnapshotResponse),
    /// A well-formed frame of some other type. Not meaningful to us.
    Ignored,
    /// Unparseable or missing required fields. Dropped; never fatal and
    /// never a reason to reconnect.
    Malformed,
}

/// Decode a text frame. Only `{"type": "update", ...}` frames carry data.
pub(crate) fn decode_frame(text: &str) -> FrameOutcome {
    #[derive(Deserialize)]
    struct Probe {
        #[serde(rename = "type")]
        kind: String,
    }

    let Ok(probe) = serde_json::from_str::<Probe>(text) else {
        tracing::debug!("failed to parse live frame envelope");
        return FrameOutcome::Malformed;
    };

    if probe.kind != "update" {
        return FrameOutcome::Ignored;
    }

    match serde_json::from_str::<SnapshotResponse>(text) {
        Ok(snapshot) => FrameOutcome::Update(snapshot),
        Err(e) => {
            tracing::debug!(error = %e, "malformed update frame dropped");
            FrameOutcome::Malformed
        }
    }
}

fn decode_and_publish(text: &str, update_tx: &broadcast::Sender<Arc<SnapshotResponse>>) {
    match decode_frame(text) {
        FrameOutcome::Update(snapshot) => {
            // Ignore send errors -- just means no active subscribers right now.
            let _ = update_tx.send(Arc::new(snapshot));
        }
        FrameOutcome::Ignored => tracing::trace!("ignoring non-update frame"),
        FrameOutcome::Malformed => {}
    }
}

// ── Tests ────────────────────────────────────────────────────────────
