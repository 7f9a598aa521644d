//! Coalesced change signal for live sales subscribers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// Why [`ChangeSubscription::await_change`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// At least one change was signalled since the last observed one.
    Changed,
    /// The timeout elapsed without a change.
    Heartbeat,
    /// The notifier was dropped; no further changes will arrive.
    Closed,
}

/// Process-wide "sales changed" signal.
///
/// The signal carries no payload: subscribers re-read whatever they need
/// after waking. Any number of [`notify`](Self::notify) calls between two
/// waits of a subscriber collapse into a single wake for that subscriber.
/// Cloning is cheap and every clone signals the same subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: Arc<watch::Sender<u64>>,
}

impl ChangeNotifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signals a change to every subscriber.
    pub fn notify(&self) {
        self.sender.send_modify(|generation| {
            *generation = generation.wrapping_add(1);
        });
    }

    /// Registers a new subscriber.
    ///
    /// Changes signalled before this call are not reported to it.
    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the change signal.
///
/// Dropping the subscription releases it without affecting other
/// subscribers.
pub struct ChangeSubscription {
    receiver: watch::Receiver<u64>,
}

impl ChangeSubscription {
    /// Waits until a change is signalled or `timeout` elapses.
    ///
    /// Returns immediately if a change was signalled since this subscriber
    /// last observed one. Observing a change clears it.
    pub async fn await_change(&mut self, timeout: Duration) -> Wake {
        match tokio::time::timeout(timeout, self.receiver.changed()).await {
            Ok(Ok(())) => {
                self.receiver.borrow_and_update();
                Wake::Changed
            }
            Ok(Err(_)) => Wake::Closed,
            Err(_) => Wake::Heartbeat,
        }
    }

    /// Returns true if a change is pending for this subscriber.
    pub fn has_pending_change(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}
