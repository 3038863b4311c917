use std::sync::Arc;

use delivergraph_config::PricingConfig;
use delivergraph_notify::Notifier;
use delivergraph_store::Store;
use delivergraph_workflow::{
  CompiledWorkflow, END, GraphError, Route, StateGraph, node_fn, route_on_error,
};

use crate::nodes::{ErrorHandlerNode, FinalPriceNode, InputNode, NotificationNode, steps};
use crate::state::DeliveryState;

pub const WORKFLOW_NAME: &str = "delivery_pricing";

pub const INPUT: &str = "input";
pub const DISTANCE: &str = "distance";
pub const MATERIAL: &str = "material";
pub const URGENCY: &str = "urgency";
pub const WEIGHT: &str = "weight";
pub const LOCATION: &str = "location";
pub const FINAL_PRICE: &str = "final_price";
pub const NOTIFICATION: &str = "notification";
pub const ERROR_HANDLER: &str = "error_handler";

/// Everything the pricing steps call out to.
#[derive(Clone)]
pub struct Collaborators {
  pub store: Arc<dyn Store>,
  pub notifier: Arc<dyn Notifier>,
  pub pricing: Arc<PricingConfig>,
  /// Prefix for the details link in quote messages.
  pub details_base_url: Option<String>,
}

/// Wire the pricing steps into a compiled workflow.
///
/// ```text
/// input ──► distance ──► material ─► urgency ─► weight ─► location ─► final_price ─► notification ─► END
///   │           │
///   └─────┬─────┘ (error)
///         ▼
///   error_handler ─► END
/// ```
pub fn build_workflow(
  collaborators: &Collaborators,
) -> Result<CompiledWorkflow<DeliveryState>, GraphError> {
  let Collaborators {
    store,
    notifier,
    pricing,
    details_base_url,
  } = collaborators;

  let mut graph = StateGraph::<DeliveryState>::new(WORKFLOW_NAME);

  let material_rates = Arc::clone(pricing);
  let urgency_rates = Arc::clone(pricing);
  let weight_rates = Arc::clone(pricing);
  let location_rates = Arc::clone(pricing);

  graph
    .register_node(INPUT, InputNode::new(Arc::clone(store)))?
    .register_node(DISTANCE, node_fn(steps::check_distance))?
    .register_node(
      MATERIAL,
      node_fn(move |s: DeliveryState| steps::material(&material_rates, s)),
    )?
    .register_node(URGENCY, node_fn(move |s: DeliveryState| steps::urgency(&urgency_rates, s)))?
    .register_node(WEIGHT, node_fn(move |s: DeliveryState| steps::weight(&weight_rates, s)))?
    .register_node(
      LOCATION,
      node_fn(move |s: DeliveryState| steps::location(&location_rates, s)),
    )?
    .register_node(FINAL_PRICE, FinalPriceNode::new(Arc::clone(store)))?
    .register_node(
      NOTIFICATION,
      NotificationNode::new(
        Arc::clone(store),
        Arc::clone(notifier),
        details_base_url.clone(),
      ),
    )?
    .register_node(
      ERROR_HANDLER,
      ErrorHandlerNode::new(Arc::clone(store), ERROR_HANDLER),
    )?;

  graph.set_entry(INPUT)?;

  graph
    .add_conditional_edge(
      INPUT,
      route_on_error,
      [(Route::Continue, DISTANCE), (Route::ErrorHandler, ERROR_HANDLER)],
    )?
    .add_conditional_edge(
      DISTANCE,
      route_on_error,
      [(Route::Continue, MATERIAL), (Route::ErrorHandler, ERROR_HANDLER)],
    )?
    .add_edge(MATERIAL, URGENCY)?
    .add_edge(URGENCY, WEIGHT)?
    .add_edge(WEIGHT, LOCATION)?
    .add_edge(LOCATION, FINAL_PRICE)?
    .add_edge(FINAL_PRICE, NOTIFICATION)?
    .add_edge(NOTIFICATION, END)?
    .add_edge(ERROR_HANDLER, END)?;

  graph.compile()
}
