use std::sync::Arc;

use async_trait::async_trait;
use delivergraph_config::{
  LocationType, MaterialType, Urgency, validate_location_type, validate_material_type,
  validate_urgency,
};
use delivergraph_store::{Error as StoreError, NewDelivery, Store};
use delivergraph_workflow::Node;
use tracing::{debug, warn};

use crate::state::{DeliveryState, generate_ticket_id};

/// Attempts at creating a record under a generated ticket id.
const TICKET_ATTEMPTS: usize = 3;

/// Entry step: assigns the ticket id, validates the request and creates the
/// pending delivery record.
pub struct InputNode {
  store: Arc<dyn Store>,
}

impl InputNode {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }
}

/// Validated request fields, borrowed from the state.
struct ValidInput<'a> {
  material_type: &'a str,
  distance: f64,
  urgency: &'a str,
  weight: f64,
  location_type: &'a str,
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Check the request fields in order, returning the first complaint.
fn validate(state: &DeliveryState) -> Result<ValidInput<'_>, String> {
  let material_type = present(&state.material_type);
  let urgency = present(&state.urgency);
  let location_type = present(&state.location_type);

  let missing: Vec<&str> = [
    ("material_type", material_type.is_none()),
    ("distance", state.distance.is_none()),
    ("urgency", urgency.is_none()),
    ("weight", state.weight.is_none()),
    ("location_type", location_type.is_none()),
  ]
  .into_iter()
  .filter_map(|(field, is_missing)| is_missing.then_some(field))
  .collect();

  let (
    Some(material_type),
    Some(distance),
    Some(urgency),
    Some(weight),
    Some(location_type),
  ) = (material_type, state.distance, urgency, state.weight, location_type)
  else {
    return Err(format!("Missing required fields: {}", missing.join(", ")));
  };

  if !validate_material_type(material_type) {
    return Err(format!(
      "Invalid material_type: {}. Must be: {}",
      material_type,
      MaterialType::valid_list()
    ));
  }
  if !validate_urgency(urgency) {
    return Err(format!(
      "Invalid urgency: {}. Must be: {}",
      urgency,
      Urgency::valid_list()
    ));
  }
  if !validate_location_type(location_type) {
    return Err(format!(
      "Invalid location_type: {}. Must be: {}",
      location_type,
      LocationType::valid_list()
    ));
  }

  if !distance.is_finite() || distance <= 0.0 {
    return Err("Distance must be greater than 0 km".to_string());
  }
  if !weight.is_finite() || weight <= 0.0 {
    return Err("Weight must be greater than 0 kg".to_string());
  }

  Ok(ValidInput {
    material_type,
    distance,
    urgency,
    weight,
    location_type,
  })
}

impl InputNode {
  /// Create the pending record. A generated ticket id that collides with an
  /// existing record is replaced and the create retried; a caller-supplied
  /// one is not.
  async fn create(
    &self,
    state: &mut DeliveryState,
    mut record: NewDelivery,
    generated: bool,
  ) -> Result<(), StoreError> {
    let mut attempt = 1;
    loop {
      match self.store.create_delivery(&record).await {
        Err(StoreError::Conflict(_)) if generated && attempt < TICKET_ATTEMPTS => {
          debug!(ticket_id = %record.ticket_id, attempt, "ticket id taken, regenerating");
          record.ticket_id = generate_ticket_id();
          state.ticket_id = record.ticket_id.clone();
          attempt += 1;
        }
        result => return result.map(|_| ()),
      }
    }
  }
}

#[async_trait]
impl Node<DeliveryState> for InputNode {
  async fn run(&self, mut state: DeliveryState) -> DeliveryState {
    state.record_created = false;
    let generated = state.ensure_ticket_id();
    if generated {
      debug!(ticket_id = %state.ticket_id, "generated ticket id");
    }

    let validated = validate(&state).map(|input| NewDelivery {
      ticket_id: state.ticket_id.clone(),
      user_id: state.user_id.clone(),
      material_type: input.material_type.to_string(),
      distance: input.distance,
      urgency: input.urgency.to_string(),
      weight: input.weight,
      location_type: input.location_type.to_string(),
    });

    let record = match validated {
      Ok(record) => record,
      Err(message) => {
        debug!(ticket_id = %state.ticket_id, error = %message, "input rejected");
        state.fail(message);
        return state;
      }
    };

    match self.create(&mut state, record, generated).await {
      Ok(()) => {
        state.record_created = true;
        state.log("Input validated and ticket created");
      }
      Err(e) => {
        warn!(ticket_id = %state.ticket_id, error = %e, "failed to create delivery record");
        state.fail(format!("Database error: {}", e));
      }
    }
    state
  }
}
