//! Fire-and-forget notifications.
//!
//! The engine only ever pushes onto an unbounded channel, so a slow or failing sink can
//! never block or change a match outcome. A dispatcher task drains the channel into a
//! [`NotificationSink`] and logs delivery failures.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use tutormatch_core::notify::{Notification, NotificationKind, Recipient};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> eyre::Result<()>;
}

/// Default sink: writes each notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, notification: &Notification) -> eyre::Result<()> {
        info!(
            kind = ?notification.kind,
            recipient = ?notification.recipient,
            payload = %notification.payload,
            "notification"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

/// Receiving half of a [`Notifier`].
#[derive(Debug)]
pub struct NotificationQueue {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl Notifier {
    pub fn channel() -> (Notifier, NotificationQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, NotificationQueue { rx })
    }

    pub fn notify(&self, kind: NotificationKind, recipient: Recipient, payload: Value) {
        if self
            .tx
            .send(Notification::new(kind, recipient, payload))
            .is_err()
        {
            warn!(?kind, ?recipient, "notification dropped, dispatcher is gone");
        }
    }
}

impl NotificationQueue {
    /// Delivers until every [`Notifier`] clone has been dropped.
    pub async fn run(mut self, sink: Arc<dyn NotificationSink>) {
        while let Some(notification) = self.rx.recv().await {
            if let Err(err) = sink.deliver(&notification).await {
                warn!(
                    kind = ?notification.kind,
                    recipient = ?notification.recipient,
                    "notification delivery failed: {err:#}"
                );
            }
        }
        debug!("notification dispatcher stopped");
    }

    pub fn spawn(self, sink: Arc<dyn NotificationSink>) -> JoinHandle<()> {
        tokio::spawn(self.run(sink))
    }

    /// Everything queued so far, without waiting.
    pub fn drain_pending(&mut self) -> Vec<Notification> {
        let mut pending = Vec::new();
        while let Ok(notification) = self.rx.try_recv() {
            pending.push(notification);
        }
        pending
    }
}
