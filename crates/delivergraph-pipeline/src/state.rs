use delivergraph_workflow::WorkflowState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pricing request as submitted by a caller.
///
/// Input fields are optional so that an incomplete request can still be
/// represented and rejected by the input step with a precise message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryRequest {
  pub user_id: String,
  pub user_email: Option<String>,
  pub material_type: Option<String>,
  /// Kilometres.
  pub distance: Option<f64>,
  pub urgency: Option<String>,
  /// Kilograms.
  pub weight: Option<f64>,
  pub location_type: Option<String>,
}

/// The record threaded through every pricing step.
///
/// `action_log` is append-only and `error_message` is never cleared once a
/// step sets it. `retry_count` is carried but no step reads or writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryState {
  pub ticket_id: String,
  pub user_id: String,
  pub user_email: Option<String>,

  pub material_type: Option<String>,
  pub distance: Option<f64>,
  pub urgency: Option<String>,
  pub weight: Option<f64>,
  pub location_type: Option<String>,

  pub base_price: Option<f64>,
  pub urgency_multiplier: Option<f64>,
  pub weight_surcharge: Option<f64>,
  pub location_adjustment: Option<f64>,
  pub total_price: Option<f64>,

  pub action_log: Vec<String>,
  pub error_message: Option<String>,
  pub retry_count: u32,

  /// Set by the input step once this invocation has created the stored
  /// record under `ticket_id`. Cleared on entry, never read from input.
  #[serde(skip)]
  pub record_created: bool,
}

impl DeliveryState {
  /// Append an entry to the action log.
  pub fn log(&mut self, entry: impl Into<String>) {
    self.action_log.push(entry.into());
  }

  /// Record a domain failure and log it. The first failure wins.
  pub fn fail(&mut self, message: impl Into<String>) {
    let message = message.into();
    self.log(format!("FAILED: {}", message));
    if self.error_message.is_none() {
      self.error_message = Some(message);
    }
  }

  /// Assign a fresh ticket id unless one is already present.
  pub fn ensure_ticket_id(&mut self) -> bool {
    if !self.ticket_id.trim().is_empty() {
      return false;
    }
    self.ticket_id = generate_ticket_id();
    true
  }

  /// Whether the record reached the success path.
  pub fn is_priced(&self) -> bool {
    self.total_price.is_some() && self.error_message.is_none()
  }
}

impl From<DeliveryRequest> for DeliveryState {
  fn from(request: DeliveryRequest) -> Self {
    Self {
      user_id: request.user_id,
      user_email: request.user_email,
      material_type: request.material_type,
      distance: request.distance,
      urgency: request.urgency,
      weight: request.weight,
      location_type: request.location_type,
      ..Default::default()
    }
  }
}

impl WorkflowState for DeliveryState {
  fn error_message(&self) -> Option<&str> {
    self.error_message.as_deref()
  }
}

/// `DEL-` followed by eight upper-case hex digits.
pub fn generate_ticket_id() -> String {
  let hex = Uuid::new_v4().simple().to_string();
  format!("DEL-{}", hex[..8].to_uppercase())
}
