use thiserror::Error;

/// Errors raised while declaring or compiling a graph.
///
/// These are configuration mistakes: they surface before any invocation and
/// are never recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  #[error("node already registered: {0}")]
  DuplicateNode(String),

  #[error("node not registered: {0}")]
  UnknownNode(String),

  #[error("node '{0}' already has an outgoing transition")]
  DuplicateTransition(String),

  #[error("entry node already set to '{0}'")]
  EntryAlreadySet(String),

  #[error("'{0}' is reserved for the terminal marker")]
  ReservedName(String),

  #[error("incomplete graph: {reason}")]
  IncompleteGraph { reason: String },
}

impl GraphError {
  pub(crate) fn incomplete(reason: impl Into<String>) -> Self {
    Self::IncompleteGraph {
      reason: reason.into(),
    }
  }
}

/// Engine invariant violations raised by [`CompiledWorkflow::invoke`].
///
/// A compiled graph should never produce these. Seeing one means the routing
/// table was built wrong, not that the request was bad.
///
/// [`CompiledWorkflow::invoke`]: crate::CompiledWorkflow::invoke
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
  #[error("node '{node}' routed to key '{key}' which has no destination")]
  Routing { node: String, key: String },

  #[error("step limit of {limit} exceeded, graph contains a cycle")]
  CycleDetected { limit: usize },

  #[error("node not found in routing table: {0}")]
  NodeNotFound(String),
}
