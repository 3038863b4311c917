//! DeliverGraph Store
//!
//! Storage trait and implementations for the records pricing steps touch:
//! users, deliveries and the error log.
//!
//! The [`Store`] trait defines operations for:
//! - Creating and looking up users
//! - Creating, updating and listing delivery records
//! - Appending to and querying the error log
//! - Aggregate delivery statistics
//!
//! [`SqliteStore`] persists to SQLite through sqlx. [`MemoryStore`] keeps
//! everything in process and is meant for tests and fakes.

mod memory;
mod sqlite;
mod types;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{
  Delivery, DeliveryStats, DeliveryStatus, DeliveryUpdate, ErrorLog, NewDelivery, NewErrorLog,
  User,
};

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A record with the same key already exists.
  #[error("already exists: {0}")]
  Conflict(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Generate a short user id (first eight characters of a v4 uuid).
pub fn generate_user_id() -> String {
  uuid::Uuid::new_v4().to_string()[..8].to_string()
}

/// Storage trait for users, deliveries and the error log.
#[async_trait]
pub trait Store: Send + Sync {
  /// Create a new user with a generated id.
  async fn create_user(
    &self,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<User, Error>;

  async fn get_user(&self, user_id: &str) -> Result<Option<User>, Error>;

  async fn list_users(&self, limit: u32) -> Result<Vec<User>, Error>;

  /// Create a pending delivery with an empty action log. Returns its ticket id.
  async fn create_delivery(&self, delivery: &NewDelivery) -> Result<String, Error>;

  /// Apply a partial update. Fails with [`Error::NotFound`] for an unknown ticket.
  async fn update_delivery(&self, ticket_id: &str, update: &DeliveryUpdate) -> Result<(), Error>;

  async fn get_delivery(&self, ticket_id: &str) -> Result<Option<Delivery>, Error>;

  /// Most recent first.
  async fn list_deliveries(&self, limit: u32) -> Result<Vec<Delivery>, Error>;

  /// Most recent first.
  async fn list_user_deliveries(&self, user_id: &str, limit: u32) -> Result<Vec<Delivery>, Error>;

  async fn log_error(&self, entry: &NewErrorLog) -> Result<ErrorLog, Error>;

  async fn errors_for_ticket(&self, ticket_id: &str) -> Result<Vec<ErrorLog>, Error>;

  /// Most recent first.
  async fn list_errors(&self, limit: u32) -> Result<Vec<ErrorLog>, Error>;

  async fn delivery_stats(&self) -> Result<DeliveryStats, Error>;
}
