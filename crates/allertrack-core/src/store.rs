// ── Reactive snapshot store ──
//
// Single authoritative holder of the current ExposureSnapshot. Mutations
// are broadcast to subscribers via a `watch` channel. The store carries
// the monotonic guard that makes "slow fetch vs fresh live update"
// deterministic: whichever snapshot has the newer computed_at wins,
// regardless of arrival order.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::model::ExposureSnapshot;

/// Reactive store for the current allergen snapshot.
///
/// Snapshots are replaced wholesale; see [`apply`](Self::apply) for the
/// acceptance rule.
pub struct SnapshotStore {
    tx: watch::Sender<Option<Arc<ExposureSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current snapshot if it is not older than what we hold.
    ///
    /// A snapshot whose `computed_at` precedes the current one is
    /// rejected (a late-arriving fetch must not clobber a newer live
    /// update). Equal timestamps are accepted so a re-fetch of the same
    /// server state still registers. Returns whether the snapshot was
    /// accepted.
    pub fn apply(&self, snapshot: ExposureSnapshot) -> bool {
        let mut accepted = false;
        self.tx.send_if_modified(|current| {
            if let Some(held) = current {
                if snapshot.computed_at < held.computed_at {
                    debug!(
                        incoming = %snapshot.computed_at,
                        held = %held.computed_at,
                        "stale snapshot rejected"
                    );
                    return false;
                }
            }
            *current = Some(Arc::new(snapshot));
            accepted = true;
            true
        });
        accepted
    }

    /// The current snapshot, if any update has been applied yet.
    pub fn current(&self) -> Option<Arc<ExposureSnapshot>> {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ExposureSnapshot>>> {
        self.tx.subscribe()
    }

    /// Subscribe as a `Stream` for use with `StreamExt` combinators.
    pub fn stream(&self) -> SnapshotStream {
        SnapshotStream {
            inner: WatchStream::new(self.tx.subscribe()),
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `Stream` adapter backed by the store's `watch` channel.
///
/// Yields the current value on first poll, then one item per
/// replacement.
pub struct SnapshotStream {
    inner: WatchStream<Option<Arc<ExposureSnapshot>>>,
}

impl Stream for SnapshotStream {
    type Item = Option<Arc<ExposureSnapshot>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
