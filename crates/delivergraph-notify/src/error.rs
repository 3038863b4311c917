/// Errors from building a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
  #[error("failed to render quote template: {0}")]
  Template(#[from] minijinja::Error),
}
