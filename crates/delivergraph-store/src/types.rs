use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Lifecycle of a delivery record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DeliveryStatus {
  Pending,
  Completed,
  Failed,
}

/// A customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
  pub user_id: String,
  pub name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// A delivery request and its pricing outcome, keyed by ticket id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Delivery {
  pub ticket_id: String,
  pub user_id: String,
  pub material_type: String,
  pub distance: f64,
  pub urgency: String,
  pub weight: f64,
  pub location_type: String,
  pub total_price: Option<f64>,
  pub status: DeliveryStatus,
  pub action_log: Json<Vec<String>>,
  pub created_at: DateTime<Utc>,
}

/// Fields for a new delivery. The ticket id is chosen by the caller so the
/// stored record and the in-flight request share one identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDelivery {
  pub ticket_id: String,
  pub user_id: String,
  pub material_type: String,
  pub distance: f64,
  pub urgency: String,
  pub weight: f64,
  pub location_type: String,
}

/// Partial update of a delivery. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryUpdate {
  pub total_price: Option<f64>,
  pub status: Option<DeliveryStatus>,
  pub action_log: Option<Vec<String>>,
}

impl DeliveryUpdate {
  pub fn completed(total_price: f64, action_log: Vec<String>) -> Self {
    Self {
      total_price: Some(total_price),
      status: Some(DeliveryStatus::Completed),
      action_log: Some(action_log),
    }
  }

  pub fn failed(action_log: Vec<String>) -> Self {
    Self {
      total_price: None,
      status: Some(DeliveryStatus::Failed),
      action_log: Some(action_log),
    }
  }
}

/// A failure recorded against a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ErrorLog {
  pub id: i64,
  pub ticket_id: String,
  pub error_type: String,
  pub error_message: String,
  pub node_name: String,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewErrorLog {
  pub ticket_id: String,
  pub error_type: String,
  pub error_message: String,
  pub node_name: String,
}

/// Aggregate counts across all deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStats {
  pub total_deliveries: i64,
  pub completed: i64,
  pub failed: i64,
  pub pending: i64,
  /// Sum of every priced delivery.
  pub total_revenue: f64,
  /// Revenue divided by completed deliveries, 0 when none completed.
  pub average_price: f64,
}

impl DeliveryStats {
  pub(crate) fn new(
    total_deliveries: i64,
    completed: i64,
    failed: i64,
    pending: i64,
    total_revenue: f64,
  ) -> Self {
    let average_price = if completed > 0 {
      total_revenue / completed as f64
    } else {
      0.0
    };
    Self {
      total_deliveries,
      completed,
      failed,
      pending,
      total_revenue,
      average_price,
    }
  }
}
