//! DeliverGraph Pipeline
//!
//! The delivery pricing workflow: the [`DeliveryState`] record, the steps
//! that fill it in, and [`build_workflow`], which wires them into a
//! [`CompiledWorkflow`](delivergraph_workflow::CompiledWorkflow).
//!
//! Steps receive their collaborators (store, notifier, rate tables) at
//! construction through [`Collaborators`], so tests can swap in fakes.

pub mod nodes;
pub mod pricing;
mod state;
mod workflow;

pub use state::{DeliveryRequest, DeliveryState, generate_ticket_id};
pub use workflow::{
  Collaborators, DISTANCE, ERROR_HANDLER, FINAL_PRICE, INPUT, LOCATION, MATERIAL, NOTIFICATION,
  URGENCY, WEIGHT, WORKFLOW_NAME, build_workflow,
};
