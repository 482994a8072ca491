//! Cascading invalidation when a transport goes away.
//!
//! Unregistering a transport is two-phase: the registry removes the entry
//! under its lock, releases it, and only then notifies a
//! [`DescendantInvalidator`]. The manager's invalidator is an
//! [`InvalidationQueue`] that turns the notification into an event processed
//! asynchronously, so the registry's and the manager's locks never nest.

use btm_core::BluetoothUrl;
use tokio::sync::mpsc;
use tracing::debug;

/// Receiver of "everything under this root is gone" notifications
#[cfg_attr(test, mockall::automock)]
pub trait DescendantInvalidator: Send + Sync {
    /// Called once per unregister with the transport's root URL
    /// (e.g. `tinyb://`). Must not call back into the registry synchronously
    /// in a way that waits on the caller.
    fn invalidate_descendants(&self, root: &BluetoothUrl);
}

/// A pending invalidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationEvent {
    /// Scope to evict; every object strictly below it is stale
    pub root: BluetoothUrl,
}

/// Sending half of the invalidation channel
#[derive(Debug, Clone)]
pub struct InvalidationQueue {
    tx: mpsc::UnboundedSender<InvalidationEvent>,
}

impl InvalidationQueue {
    /// Create a queue together with the receiver the manager drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<InvalidationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DescendantInvalidator for InvalidationQueue {
    fn invalidate_descendants(&self, root: &BluetoothUrl) {
        let event = InvalidationEvent { root: root.clone() };
        if self.tx.send(event).is_err() {
            // Manager already dropped: nothing left to invalidate.
            debug!(root = %root, "Invalidation receiver closed, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_delivers_events_in_order() {
        let (queue, mut rx) = InvalidationQueue::channel();
        queue.invalidate_descendants(&BluetoothUrl::with_protocol_only("tinyb"));
        queue.invalidate_descendants(&BluetoothUrl::with_protocol_only("dbus"));

        assert_eq!(
            rx.try_recv().unwrap().root,
            BluetoothUrl::with_protocol_only("tinyb")
        );
        assert_eq!(
            rx.try_recv().unwrap().root,
            BluetoothUrl::with_protocol_only("dbus")
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_is_not_an_error() {
        let (queue, rx) = InvalidationQueue::channel();
        drop(rx);
        queue.invalidate_descendants(&BluetoothUrl::with_protocol_only("tinyb"));
    }
}
