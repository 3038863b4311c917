use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::error::ExecutionError;
use crate::events::{ExecutionEvent, ExecutionListener, NoopListener};
use crate::graph::Graph;
use crate::node::Node;
use crate::route::{Target, Transition};
use crate::state::WorkflowState;

/// An immutable routing table ready to run.
///
/// Produced by [`StateGraph::compile`]. Holds no per-invocation state, so one
/// instance can serve any number of concurrent [`invoke`] calls, each on its
/// own record.
///
/// [`StateGraph::compile`]: crate::StateGraph::compile
/// [`invoke`]: CompiledWorkflow::invoke
pub struct CompiledWorkflow<S> {
  name: String,
  entry: String,
  order: Vec<String>,
  nodes: HashMap<String, Box<dyn Node<S>>>,
  transitions: HashMap<String, Transition<S>>,
  graph: Graph,
  step_limit: usize,
  listener: Arc<dyn ExecutionListener>,
}

impl<S: WorkflowState> CompiledWorkflow<S> {
  pub(crate) fn new(
    name: String,
    entry: String,
    order: Vec<String>,
    nodes: HashMap<String, Box<dyn Node<S>>>,
    transitions: HashMap<String, Transition<S>>,
    graph: Graph,
  ) -> Self {
    // An acyclic walk visits each node at most once.
    let step_limit = order.len();
    Self {
      name,
      entry,
      order,
      nodes,
      transitions,
      graph,
      step_limit,
      listener: Arc::new(NoopListener),
    }
  }

  /// Attach a listener that receives [`ExecutionEvent`]s for every run.
  pub fn with_listener(mut self, listener: Arc<dyn ExecutionListener>) -> Self {
    self.listener = listener;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn entry(&self) -> &str {
    &self.entry
  }

  /// Node names in registration order.
  pub fn node_names(&self) -> &[String] {
    &self.order
  }

  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  /// Possible next destinations of a node: one for a plain edge, one per
  /// key for a conditional edge. Empty for an unknown name.
  pub fn successors(&self, name: &str) -> &[Target] {
    self.graph.downstream(name)
  }

  /// Maximum number of node executions per invocation.
  pub fn step_limit(&self) -> usize {
    self.step_limit
  }

  /// Run the workflow from the entry node until the terminal marker.
  ///
  /// Domain failures come back as `Ok` with the record's error message set.
  /// `Err` is reserved for routing-table invariant violations.
  #[instrument(
    name = "workflow_invoke",
    skip(self, state),
    fields(workflow = %self.name)
  )]
  pub async fn invoke(&self, state: S) -> Result<S, ExecutionError> {
    self.listener.notify(ExecutionEvent::WorkflowStarted {
      workflow: self.name.clone(),
      entry: self.entry.clone(),
    });
    info!(entry = %self.entry, "workflow_started");

    let result = self.run(state).await;

    match &result {
      Ok(state) => match state.error_message() {
        Some(message) => warn!(error = %message, "workflow_completed_with_error"),
        None => info!("workflow_completed"),
      },
      Err(e) => {
        error!(error = %e, "workflow_failed");
        self.listener.notify(ExecutionEvent::WorkflowFailed {
          workflow: self.name.clone(),
          error: e.to_string(),
        });
      }
    }

    result
  }

  async fn run(&self, mut state: S) -> Result<S, ExecutionError> {
    let mut current = self.entry.clone();
    let mut steps = 0;

    loop {
      if steps >= self.step_limit {
        return Err(ExecutionError::CycleDetected {
          limit: self.step_limit,
        });
      }
      steps += 1;

      let node = self
        .nodes
        .get(&current)
        .ok_or_else(|| ExecutionError::NodeNotFound(current.clone()))?;

      self.listener.notify(ExecutionEvent::NodeStarted {
        workflow: self.name.clone(),
        node: current.clone(),
        step: steps,
      });

      state = node.run(state).await;

      let next = self.resolve_next(&current, &state)?;
      debug!(node = %current, next = %next, step = steps, "node_completed");
      self.listener.notify(ExecutionEvent::NodeCompleted {
        workflow: self.name.clone(),
        node: current.clone(),
        next: next.to_string(),
      });

      match next {
        Target::End => {
          self.listener.notify(ExecutionEvent::WorkflowCompleted {
            workflow: self.name.clone(),
            steps,
            failed: state.has_error(),
          });
          return Ok(state);
        }
        Target::Node(name) => current = name,
      }
    }
  }

  fn resolve_next(&self, node: &str, state: &S) -> Result<Target, ExecutionError> {
    let transition = self
      .transitions
      .get(node)
      .ok_or_else(|| ExecutionError::NodeNotFound(node.to_string()))?;

    match transition {
      Transition::Direct(target) => Ok(target.clone()),
      Transition::Conditional(router) => {
        router
          .resolve(state)
          .cloned()
          .map_err(|key| ExecutionError::Routing {
            node: node.to_string(),
            key: key.to_string(),
          })
      }
    }
  }
}

#[cfg(test)]
impl<S: WorkflowState> CompiledWorkflow<S> {
  pub(crate) fn set_step_limit(&mut self, limit: usize) {
    self.step_limit = limit;
  }

  pub(crate) fn force_transition(&mut self, from: &str, transition: Transition<S>) {
    self.transitions.insert(from.to_string(), transition);
  }
}
