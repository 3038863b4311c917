use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("unknown {kind} '{value}', expected one of: {expected}")]
  UnknownOption {
    kind: &'static str,
    value: String,
    expected: String,
  },

  #[error("invalid config: {0}")]
  Invalid(String),
}
