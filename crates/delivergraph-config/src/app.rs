use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pricing::PricingConfig;

/// Environment variable that overrides [`AppConfig::database_url`].
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Settings for a running pricing service.
///
/// ```json
/// {
///   "database_url": "sqlite://delivergraph.db",
///   "notification": { "enabled": true, "from_address": "quotes@example.com" },
///   "pricing": { "distance_rate_per_km": 4.5 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub database_url: String,
  pub notification: NotificationConfig,
  pub pricing: PricingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
  /// When false, quote notifications are skipped.
  pub enabled: bool,
  pub from_address: String,
  /// Prefix for the "view details" link, the ticket id is appended.
  pub details_base_url: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: "sqlite://delivergraph.db".to_string(),
      notification: NotificationConfig::default(),
      pricing: PricingConfig::default(),
    }
  }
}

impl Default for NotificationConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      from_address: "noreply@delivergraph.ai".to_string(),
      details_base_url: "http://localhost:8000/delivery".to_string(),
    }
  }
}

impl AppConfig {
  /// Parse and validate a JSON document.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    let config: Self = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Load a JSON file, then apply environment overrides.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_json(&content)?;
    Ok(config.with_database_url(std::env::var(DATABASE_URL_ENV).ok()))
  }

  /// Replace the database URL when an override is present and non-empty.
  pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
    if let Some(url) = database_url.filter(|url| !url.trim().is_empty()) {
      self.database_url = url;
    }
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.database_url.trim().is_empty() {
      return Err(ConfigError::Invalid("database_url must not be empty".to_string()));
    }
    if self.notification.enabled && !self.notification.from_address.contains('@') {
      return Err(ConfigError::Invalid(format!(
        "notification from_address is not an address: {}",
        self.notification.from_address
      )));
    }
    self.pricing.validate()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_empty_document_uses_defaults() {
    let config = AppConfig::from_json("{}").unwrap();
    assert_eq!(config, AppConfig::default());
    assert!(!config.notification.enabled);
  }

  #[test]
  fn test_nested_override() {
    let config = AppConfig::from_json(
      r#"{ "notification": { "enabled": true }, "pricing": { "distance_rate_per_km": 4.5 } }"#,
    )
    .unwrap();

    assert!(config.notification.enabled);
    assert_eq!(config.notification.from_address, "noreply@delivergraph.ai");
    assert_eq!(config.pricing.distance_rate_per_km, 4.5);
    assert_eq!(config.pricing.weight.surcharge_per_kg, 5.0);
  }

  #[test]
  fn test_invalid_sender_rejected() {
    let err = AppConfig::from_json(
      r#"{ "notification": { "enabled": true, "from_address": "nobody" } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
  }

  #[test]
  fn test_unknown_material_key_rejected() {
    let err = AppConfig::from_json(r#"{ "pricing": { "material_base_prices": { "gold": 1.0 } } }"#)
      .unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn test_database_url_override() {
    let config = AppConfig::default().with_database_url(Some("sqlite::memory:".to_string()));
    assert_eq!(config.database_url, "sqlite::memory:");

    let config = AppConfig::default().with_database_url(Some("  ".to_string()));
    assert_eq!(config.database_url, "sqlite://delivergraph.db");
  }

  #[test]
  fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "database_url": "sqlite://quotes.db" }}"#).unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    // DATABASE_URL may be set in the environment running the tests
    if std::env::var(DATABASE_URL_ENV).is_err() {
      assert_eq!(config.database_url, "sqlite://quotes.db");
    }
    assert_eq!(config.pricing, PricingConfig::default());
  }

  #[test]
  fn test_load_missing_file() {
    let err = AppConfig::load(Path::new("/nonexistent/delivergraph.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
