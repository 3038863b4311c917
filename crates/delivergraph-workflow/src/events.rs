//! Execution events for observing invocations.
//!
//! The engine reports progress through an [`ExecutionListener`]. Consumers
//! decide what to do with each event (record it, stream it, ignore it).

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted while a compiled workflow runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  WorkflowStarted {
    workflow: String,
    entry: String,
  },

  NodeStarted {
    workflow: String,
    node: String,
    step: usize,
  },

  /// A node returned. `next` is the resolved destination.
  NodeCompleted {
    workflow: String,
    node: String,
    next: String,
  },

  /// The terminal marker was reached. `failed` is true when the record
  /// carries an error message.
  WorkflowCompleted {
    workflow: String,
    steps: usize,
    failed: bool,
  },

  /// An engine invariant was violated.
  WorkflowFailed { workflow: String, error: String },
}

/// Receives execution events.
pub trait ExecutionListener: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopListener;

impl ExecutionListener for NoopListener {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelListener {
  // NOTE: unbounded so a slow consumer never stalls an invocation. Volume is
  // two events per node.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelListener {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionListener for ChannelListener {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
