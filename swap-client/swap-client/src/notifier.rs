//! The channel through which user-facing notifications reach the UI shell

use swap_client_api::notification::Notification;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// The receiving end of the notification channel, drained by the UI shell
pub type NotificationReceiver = UnboundedReceiver<Notification>;

/// Sends notifications to the UI shell
#[derive(Clone, Debug)]
pub struct Notifier {
    /// The sending end of the channel
    sender: UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the receiver its notifications arrive on
    pub fn new() -> (Self, NotificationReceiver) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Send a notification, logging it as well
    pub fn notify(&self, notification: Notification) {
        let description = notification.description.as_deref().unwrap_or_default();
        if notification.is_destructive() {
            warn!("{}: {description}", notification.title);
        } else {
            info!("{}: {description}", notification.title);
        }

        if self.sender.send(notification).is_err() {
            debug!("notification receiver dropped");
        }
    }
}
