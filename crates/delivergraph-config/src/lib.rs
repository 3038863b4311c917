//! DeliverGraph Config
//!
//! Serializable configuration for the pricing pipeline:
//! - [`PricingConfig`]: rate tables the pricing steps read
//! - option enums ([`MaterialType`], [`Urgency`], [`LocationType`]) and the
//!   string validators built on them
//! - [`AppConfig`]: database and notification settings for a running service
//!
//! Configuration is JSON. Every field has a default, so an empty object is a
//! valid file.

mod app;
mod error;
mod options;
mod pricing;

pub use app::{AppConfig, DATABASE_URL_ENV, NotificationConfig};
pub use error::ConfigError;
pub use options::{
  LocationType, MaterialType, Urgency, ValidOptions, valid_options, validate_location_type,
  validate_material_type, validate_urgency,
};
pub use pricing::{PricingConfig, WeightSurcharge};
