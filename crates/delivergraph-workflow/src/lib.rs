//! DeliverGraph Workflow
//!
//! A small state-graph engine. Named nodes are wired together with
//! unconditional and conditional edges, compiled once into an immutable
//! routing table, and then invoked against a per-request state record.
//!
//! - [`StateGraph`] accumulates nodes and edges and validates them.
//! - [`CompiledWorkflow`] is the frozen routing table; `invoke` walks it from
//!   the entry node to [`END`], one node at a time.
//! - Conditional edges route on a closed [`RouteKey`] type, so a mapping that
//!   misses a key is rejected at compile time.
//!
//! The engine never fails because a step failed. Steps record domain failures
//! on the state record ([`WorkflowState::error_message`]) and routers such as
//! [`route_on_error`] steer the walk towards an error-handling node.

mod builder;
mod error;
mod events;
mod graph;
mod node;
mod route;
mod state;
mod workflow;

pub use builder::StateGraph;
pub use error::{ExecutionError, GraphError};
pub use events::{ChannelListener, ExecutionEvent, ExecutionListener, NoopListener};
pub use graph::Graph;
pub use node::{FnNode, Node, node_fn};
pub use route::{END, Route, RouteKey, Target, route_on_error};
pub use state::WorkflowState;
pub use workflow::CompiledWorkflow;
