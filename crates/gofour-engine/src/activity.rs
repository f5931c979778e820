//! Best-effort state-change notifications.
//!
//! Every applied move publishes its resulting [`State`] to all current
//! subscribers. Publishing never blocks and never fails the move:
//!
//! - each subscriber owns a small bounded buffer; when it is full the event
//!   is dropped for that subscriber (observers re-fetch the full game
//!   snapshot, they do not rely on seeing every intermediate event);
//! - subscribers that went away are pruned on the next publish;
//! - publishing a terminal state (a winner or `Stale`) closes every
//!   subscription exactly once. Later subscriptions start out closed, so a
//!   late observer's first read returns end-of-stream immediately.
//!
//! The subscriber list and the closed flag sit behind one lock, so a
//! publish can never race a close.

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::State;

/// Per-subscriber buffer size used by [`Four`](crate::Four).
pub const DEFAULT_ACTIVITY_BUFFER: usize = 16;

#[derive(Debug)]
struct Inner {
    subscribers: Vec<mpsc::Sender<State>>,
    closed: bool,
}

/// The engine-owned publishing side.
#[derive(Debug)]
pub struct Activity {
    buffer: usize,
    inner: Mutex<Inner>,
}

impl Activity {
    /// Creates a channel whose subscribers each buffer up to `buffer`
    /// events (at least 1).
    pub fn new(buffer: usize) -> Self {
        Self {
            buffer: buffer.max(1),
            inner: Mutex::new(Inner {
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> ActivityReceiver {
        let (tx, rx) = mpsc::channel(self.buffer);
        let mut inner = self.inner.lock();
        if !inner.closed {
            inner.subscribers.push(tx);
        }
        // When closed, `tx` drops here and the receiver is already at its end.
        ActivityReceiver { rx }
    }

    /// Delivers `state` to every subscriber without waiting.
    ///
    /// A terminal `state` closes the channel after delivery.
    pub fn publish(&self, state: State) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }

        inner.subscribers.retain(|tx| match tx.try_send(state) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::trace!(%state, "activity buffer full, event dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });

        if state.is_terminal() {
            inner.subscribers.clear();
            inner.closed = true;
            tracing::debug!(%state, "activity channel closed");
        }
    }

    /// `true` once a terminal state has been published.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Number of live subscriptions (after the last prune).
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl Default for Activity {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_BUFFER)
    }
}

/// The observer side of an [`Activity`] subscription.
///
/// Dropping it is the only cancellation needed; the engine notices on its
/// next publish.
#[derive(Debug)]
pub struct ActivityReceiver {
    rx: mpsc::Receiver<State>,
}

impl ActivityReceiver {
    /// Waits for the next state change. Returns `None` once the game is
    /// over (or the game itself was dropped) and every buffered event has
    /// been read.
    pub async fn recv(&mut self) -> Option<State> {
        self.rx.recv().await
    }

    /// Non-blocking read: `Ok(Some(state))` for a buffered event,
    /// `Ok(None)` when nothing is buffered yet, `Err(())` at end-of-stream.
    #[allow(clippy::result_unit_err)]
    pub fn try_recv(&mut self) -> Result<Option<State>, ()> {
        match self.rx.try_recv() {
            Ok(state) => Ok(Some(state)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(()),
        }
    }

    /// Blocking read for observers running outside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<State> {
        self.rx.blocking_recv()
    }
}
