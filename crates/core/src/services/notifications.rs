//! Channel-backed notifier.
//!
//! The UI side owns the receiving end and decides how long each message
//! stays on screen.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use crate::ports::{Notification, Notifier};

/// [`Notifier`] that forwards every notification to an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        debug!(level = ?notification.level, message = %notification.message, "Notify");
        if self.tx.send(notification).is_err() {
            warn!("Notification receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NotificationLevel;

    #[test]
    fn test_notifications_arrive_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::success("Patient created successfully"));
        notifier.notify(Notification::error("Failed to save patient. Please try again."));

        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Success);
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Error);
        assert!(rx.try_recv().is_err());
    }

    // Un récepteur fermé ne doit pas faire paniquer le service
    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notification::info("ignored"));
    }
}
