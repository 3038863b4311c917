/// Contract every state record threaded through a workflow must satisfy.
///
/// The engine itself never inspects the record beyond this trait: a set
/// `error_message` is the only signal routers consult, and the engine uses it
/// to report whether an invocation ended on the failure path.
pub trait WorkflowState: Send + 'static {
  /// The domain failure recorded by a step, if any.
  fn error_message(&self) -> Option<&str>;

  /// Whether a step has recorded a domain failure.
  fn has_error(&self) -> bool {
    self.error_message().is_some()
  }
}
