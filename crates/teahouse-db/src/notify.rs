//! # Order Notifications
//!
//! What happens after an order commits. Notifiers receive an
//! [`OrderSummary`] and may print, email or forward it; the coordinator
//! only logs their failures, so a broken notifier never undoes a sale.
//!
//! ## Provided Notifiers
//! - [`TracingNotifier`] - logs the plain-text receipt
//! - [`ChannelNotifier`] - hands summaries to another task over a bounded channel

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use teahouse_core::summary::OrderSummary;

/// Why a notifier could not deliver a summary.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The receiving side is gone.
    #[error("Notification channel closed")]
    Closed,

    /// The receiving side is not keeping up.
    #[error("Notification queue full")]
    Full,

    /// The notifier did not finish in time.
    #[error("Notification timed out after {0} ms")]
    TimedOut(u64),

    #[error("Notification failed: {0}")]
    Failed(String),
}

/// Receives every committed order.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn notify(&self, summary: &OrderSummary) -> Result<(), NotificationError>;
}

/// Logs the receipt at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl OrderNotifier for TracingNotifier {
    async fn notify(&self, summary: &OrderSummary) -> Result<(), NotificationError> {
        info!(
            order_id = %summary.order_id,
            recipient = summary.recipient_email.as_deref().unwrap_or("-"),
            "Order receipt\n{}",
            summary.render_receipt()
        );
        Ok(())
    }
}

/// Forwards summaries to a receiver, e.g. a mail worker.
///
/// Never waits for queue space: a full queue is reported as
/// [`NotificationError::Full`] and the summary is dropped.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<OrderSummary>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver it feeds.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OrderSummary>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (ChannelNotifier { sender }, receiver)
    }
}

#[async_trait]
impl OrderNotifier for ChannelNotifier {
    async fn notify(&self, summary: &OrderSummary) -> Result<(), NotificationError> {
        self.sender
            .try_send(summary.clone())
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => NotificationError::Full,
                mpsc::error::TrySendError::Closed(_) => NotificationError::Closed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary(order_id: &str) -> OrderSummary {
        OrderSummary {
            order_id: order_id.to_string(),
            customer_name: "Customer".to_string(),
            recipient_email: None,
            total_cents: 450,
            placed_at: Utc::now(),
            items: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_channel_notifier_forwards() {
        let (notifier, mut receiver) = ChannelNotifier::new(4);
        notifier.notify(&summary("o-1")).await.unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.order_id, "o-1");
    }

    #[tokio::test]
    async fn test_channel_notifier_full_and_closed() {
        let (notifier, receiver) = ChannelNotifier::new(1);
        notifier.notify(&summary("o-1")).await.unwrap();
        assert!(matches!(
            notifier.notify(&summary("o-2")).await,
            Err(NotificationError::Full)
        ));

        drop(receiver);
        assert!(matches!(
            notifier.notify(&summary("o-3")).await,
            Err(NotificationError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_tracing_notifier_never_fails() {
        assert!(TracingNotifier.notify(&summary("o-1")).await.is_ok());
    }
}
