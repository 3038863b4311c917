use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

/// Outcome of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyStatus {
  Success,
  /// Notifications are not configured.
  Skipped,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub status: NotifyStatus,
  pub detail: String,
}

impl Notification {
  pub fn success(detail: impl Into<String>) -> Self {
    Self {
      status: NotifyStatus::Success,
      detail: detail.into(),
    }
  }

  pub fn skipped(detail: impl Into<String>) -> Self {
    Self {
      status: NotifyStatus::Skipped,
      detail: detail.into(),
    }
  }

  pub fn error(detail: impl Into<String>) -> Self {
    Self {
      status: NotifyStatus::Error,
      detail: detail.into(),
    }
  }
}

/// Sends a message to a customer address.
///
/// Implementations report failures through [`NotifyStatus::Error`] rather
/// than an error return, so a notification problem never aborts pricing.
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn send(&self, address: &str, subject: &str, body: &str) -> Notification;
}

/// Skips every message.
#[derive(Debug, Clone, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
  async fn send(&self, _address: &str, _subject: &str, _body: &str) -> Notification {
    Notification::skipped("notifications not configured")
  }
}

/// A message handed to a [`ChannelNotifier`] consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
  pub from: String,
  pub to: String,
  pub subject: String,
  pub body: String,
}

/// A notifier that sends messages to an unbounded channel.
///
/// The consumer owns actual delivery (mail relay, queue, test assertions).
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  from: String,
  sender: mpsc::UnboundedSender<OutgoingMessage>,
}

impl ChannelNotifier {
  pub fn new(from: impl Into<String>, sender: mpsc::UnboundedSender<OutgoingMessage>) -> Self {
    Self {
      from: from.into(),
      sender,
    }
  }

  /// Create a notifier together with the receiving end of its channel.
  pub fn channel(from: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<OutgoingMessage>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(from, sender), receiver)
  }
}

#[async_trait]
impl Notifier for ChannelNotifier {
  async fn send(&self, address: &str, subject: &str, body: &str) -> Notification {
    let message = OutgoingMessage {
      from: self.from.clone(),
      to: address.to_string(),
      subject: subject.to_string(),
      body: body.to_string(),
    };

    match self.sender.send(message) {
      Ok(()) => {
        debug!(to = %address, subject = %subject, "notification queued");
        Notification::success("message queued")
      }
      Err(_) => Notification::error("notification receiver closed"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_disabled_skips() {
    let result = DisabledNotifier.send("a@example.com", "s", "b").await;
    assert_eq!(result.status, NotifyStatus::Skipped);
  }

  #[tokio::test]
  async fn test_channel_delivers_message() {
    let (notifier, mut receiver) = ChannelNotifier::channel("quotes@example.com");
    let result = notifier.send("a@example.com", "Hello", "<p>hi</p>").await;
    assert_eq!(result.status, NotifyStatus::Success);

    let message = receiver.recv().await.unwrap();
    assert_eq!(message.from, "quotes@example.com");
    assert_eq!(message.to, "a@example.com");
    assert_eq!(message.subject, "Hello");
  }

  #[tokio::test]
  async fn test_channel_reports_closed_receiver() {
    let (notifier, receiver) = ChannelNotifier::channel("quotes@example.com");
    drop(receiver);
    let result = notifier.send("a@example.com", "Hello", "body").await;
    assert_eq!(result.status, NotifyStatus::Error);
    assert_eq!(result.detail, "notification receiver closed");
  }
}
