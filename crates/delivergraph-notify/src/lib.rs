//! DeliverGraph Notify
//!
//! Delivery of price quotes to customers.
//!
//! A [`Notifier`] never fails the caller: every outcome, including transport
//! errors, comes back as a [`Notification`] whose [`NotifyStatus`] the
//! pricing pipeline records in its action log.
//!
//! - [`DisabledNotifier`] skips every message
//! - [`ChannelNotifier`] hands [`OutgoingMessage`]s to a consumer over a tokio channel
//!
//! [`render_quote`] turns a [`QuoteMessage`] into a subject and HTML body.

mod error;
mod notifier;
mod template;

pub use error::NotifyError;
pub use notifier::{
  ChannelNotifier, DisabledNotifier, Notification, Notifier, NotifyStatus, OutgoingMessage,
};
pub use template::{QuoteMessage, render_quote};
