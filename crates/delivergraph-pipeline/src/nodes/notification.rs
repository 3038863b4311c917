use std::sync::Arc;

use async_trait::async_trait;
use delivergraph_notify::{Notifier, NotifyStatus, QuoteMessage, render_quote};
use delivergraph_store::Store;
use delivergraph_workflow::Node;
use tracing::{info, warn};

use crate::state::DeliveryState;

/// Sends the quote to the customer when an address is known.
///
/// The address comes from the request, falling back to the stored user.
/// Every outcome is logged; none of them fail the request.
pub struct NotificationNode {
  store: Arc<dyn Store>,
  notifier: Arc<dyn Notifier>,
  details_base_url: Option<String>,
}

impl NotificationNode {
  pub fn new(
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    details_base_url: Option<String>,
  ) -> Self {
    Self {
      store,
      notifier,
      details_base_url,
    }
  }

  async fn resolve_address(&self, state: &mut DeliveryState) -> Option<String> {
    if let Some(email) = state.user_email.as_deref().filter(|e| !e.trim().is_empty()) {
      return Some(email.to_string());
    }

    match self.store.get_user(&state.user_id).await {
      Ok(user) => user.and_then(|u| u.email).filter(|e| !e.trim().is_empty()),
      Err(e) => {
        warn!(user_id = %state.user_id, error = %e, "failed to look up user");
        state.log(format!("WARNING: user lookup failed: {}", e));
        None
      }
    }
  }

  fn quote(&self, state: &DeliveryState) -> QuoteMessage {
    QuoteMessage {
      ticket_id: state.ticket_id.clone(),
      total_price: state.total_price.unwrap_or(0.0),
      base_price: state.base_price.unwrap_or(0.0),
      urgency_multiplier: state.urgency_multiplier.unwrap_or(1.0),
      weight_surcharge: state.weight_surcharge.unwrap_or(0.0),
      location_adjustment: state.location_adjustment.unwrap_or(0.0),
      details_url: self
        .details_base_url
        .as_ref()
        .map(|base| format!("{}/{}", base.trim_end_matches('/'), state.ticket_id)),
    }
  }
}

#[async_trait]
impl Node<DeliveryState> for NotificationNode {
  async fn run(&self, mut state: DeliveryState) -> DeliveryState {
    match self.resolve_address(&mut state).await {
      Some(address) => match render_quote(&self.quote(&state)) {
        Ok((subject, body)) => {
          let result = self.notifier.send(&address, &subject, &body).await;
          match result.status {
            NotifyStatus::Success => {
              info!(ticket_id = %state.ticket_id, to = %address, "quote sent");
              state.log(format!("Email sent to {}", address));
            }
            NotifyStatus::Skipped => {
              state.log("Email notification skipped (not configured)");
            }
            NotifyStatus::Error => {
              warn!(ticket_id = %state.ticket_id, error = %result.detail, "quote delivery failed");
              state.log(format!("WARNING: email failed: {}", result.detail));
            }
          }
        }
        Err(e) => {
          warn!(ticket_id = %state.ticket_id, error = %e, "failed to render quote");
          state.log(format!("WARNING: email failed: {}", e));
        }
      },
      None => state.log("No email provided for notification"),
    }

    state.log("Notification ready for display");
    state
  }
}
