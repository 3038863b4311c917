use std::sync::Arc;

use async_trait::async_trait;
use delivergraph_store::{DeliveryUpdate, Error as StoreError, NewErrorLog, Store};
use delivergraph_workflow::Node;
use tracing::{debug, error, warn};

use crate::state::DeliveryState;

pub const ERROR_TYPE: &str = "workflow_error";

/// Records the failure and marks the delivery failed.
///
/// Never fails itself: a store problem is appended to the action log as a
/// warning and the walk still ends.
pub struct ErrorHandlerNode {
  store: Arc<dyn Store>,
  node_name: String,
}

impl ErrorHandlerNode {
  pub fn new(store: Arc<dyn Store>, node_name: impl Into<String>) -> Self {
    Self {
      store,
      node_name: node_name.into(),
    }
  }

  async fn record(&self, state: &DeliveryState, message: &str) -> Result<(), StoreError> {
    self
      .store
      .log_error(&NewErrorLog {
        ticket_id: state.ticket_id.clone(),
        error_type: ERROR_TYPE.to_string(),
        error_message: message.to_string(),
        node_name: self.node_name.clone(),
      })
      .await?;

    // A record under this ticket id may belong to another request
    if !state.record_created {
      debug!(ticket_id = %state.ticket_id, "no delivery record of ours to mark failed");
      return Ok(());
    }

    let update = DeliveryUpdate::failed(state.action_log.clone());
    self.store.update_delivery(&state.ticket_id, &update).await
  }
}

#[async_trait]
impl Node<DeliveryState> for ErrorHandlerNode {
  async fn run(&self, mut state: DeliveryState) -> DeliveryState {
    let message = state
      .error_message
      .clone()
      .unwrap_or_else(|| "Unknown error".to_string());
    error!(ticket_id = %state.ticket_id, error = %message, "delivery pricing failed");

    match self.record(&state, &message).await {
      Ok(()) => state.log(format!("Error logged: {}", message)),
      Err(e) => {
        warn!(ticket_id = %state.ticket_id, error = %e, "failed to record pricing error");
        state.log(format!("WARNING: error logging failed: {}", e));
      }
    }
    state
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use delivergraph_store::{DeliveryStatus, MemoryStore, NewDelivery};

  async fn store_with_record(ticket_id: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
      .create_delivery(&NewDelivery {
        ticket_id: ticket_id.to_string(),
        user_id: "u1".to_string(),
        material_type: "standard".to_string(),
        distance: 5.0,
        urgency: "standard".to_string(),
        weight: 1.0,
        location_type: "urban".to_string(),
      })
      .await
      .unwrap();
    store
  }

  fn failed_state(record_created: bool) -> DeliveryState {
    let mut state = DeliveryState {
      ticket_id: "DEL-00C0FFEE".to_string(),
      record_created,
      ..Default::default()
    };
    state.fail("Invalid distance provided");
    state
  }

  #[tokio::test]
  async fn test_marks_own_record_failed() {
    let store = store_with_record("DEL-00C0FFEE").await;
    let node = ErrorHandlerNode::new(store.clone(), "error_handler");

    let state = node.run(failed_state(true)).await;

    assert_eq!(
      state.action_log.last().map(String::as_str),
      Some("Error logged: Invalid distance provided")
    );
    let record = store.get_delivery("DEL-00C0FFEE").await.unwrap().unwrap();
    assert_eq!(record.status, DeliveryStatus::Failed);
    assert_eq!(record.action_log.0, ["FAILED: Invalid distance provided"]);
  }

  #[tokio::test]
  async fn test_leaves_foreign_record_alone() {
    let store = store_with_record("DEL-00C0FFEE").await;
    let node = ErrorHandlerNode::new(store.clone(), "error_handler");

    node.run(failed_state(false)).await;

    let record = store.get_delivery("DEL-00C0FFEE").await.unwrap().unwrap();
    assert_eq!(record.status, DeliveryStatus::Pending);
    assert!(record.action_log.0.is_empty());
    assert_eq!(store.errors_for_ticket("DEL-00C0FFEE").await.unwrap().len(), 1);
  }
}
