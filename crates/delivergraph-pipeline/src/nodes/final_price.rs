use std::sync::Arc;

use async_trait::async_trait;
use delivergraph_store::{DeliveryUpdate, Store};
use delivergraph_workflow::Node;
use tracing::warn;

use crate::pricing;
use crate::state::DeliveryState;

/// Combines the price components and marks the delivery completed.
///
/// A failed write is only a warning: the quote is still valid.
pub struct FinalPriceNode {
  store: Arc<dyn Store>,
}

impl FinalPriceNode {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl Node<DeliveryState> for FinalPriceNode {
  async fn run(&self, mut state: DeliveryState) -> DeliveryState {
    let base = state.base_price.unwrap_or(0.0);
    let multiplier = state.urgency_multiplier.unwrap_or(1.0);
    let surcharge = state.weight_surcharge.unwrap_or(0.0);
    let location = state.location_adjustment.unwrap_or(0.0);
    let total = pricing::total_price(base, multiplier, surcharge, location);

    state.total_price = Some(total);
    state.log(format!(
      "Final calculation: ({:.2} x {}) + {:.2} + {:.2} = {:.2}",
      base, multiplier, surcharge, location, total
    ));

    let update = DeliveryUpdate::completed(total, state.action_log.clone());
    match self.store.update_delivery(&state.ticket_id, &update).await {
      Ok(()) => state.log("Price saved to database"),
      Err(e) => {
        warn!(ticket_id = %state.ticket_id, error = %e, "failed to save price");
        state.log(format!("WARNING: database update failed: {}", e));
      }
    }
    state
  }
}
