use std::collections::HashMap;

use tracing::debug;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::node::Node;
use crate::route::{ConditionalRouter, END, RouteKey, Target, Transition};
use crate::state::WorkflowState;
use crate::workflow::CompiledWorkflow;

/// Accumulates nodes and transitions and validates them into a
/// [`CompiledWorkflow`].
///
/// Every mutating call validates what it can immediately; [`compile`]
/// re-checks the whole graph before producing the routing table.
///
/// ```ignore
/// let mut graph = StateGraph::new("pricing");
/// graph.register_node("input", InputNode::new(store))?;
/// graph.register_node("error_handler", ErrorHandlerNode::new(store))?;
/// graph.set_entry("input")?;
/// graph.add_conditional_edge("input", route_on_error, [
///   (Route::Continue, END),
///   (Route::ErrorHandler, "error_handler"),
/// ])?;
/// graph.add_edge("error_handler", END)?;
/// let workflow = graph.compile()?;
/// ```
///
/// [`compile`]: StateGraph::compile
pub struct StateGraph<S> {
  name: String,
  nodes: HashMap<String, Box<dyn Node<S>>>,
  /// Registration order, kept for stable reporting.
  order: Vec<String>,
  transitions: HashMap<String, Transition<S>>,
  entry: Option<String>,
}

impl<S: WorkflowState> StateGraph<S> {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      nodes: HashMap::new(),
      order: Vec::new(),
      transitions: HashMap::new(),
      entry: None,
    }
  }

  /// Register a node under a unique name.
  pub fn register_node(
    &mut self,
    name: impl Into<String>,
    node: impl Node<S> + 'static,
  ) -> Result<&mut Self, GraphError> {
    let name = name.into();
    if name == END {
      return Err(GraphError::ReservedName(name));
    }
    if self.nodes.contains_key(&name) {
      return Err(GraphError::DuplicateNode(name));
    }

    self.order.push(name.clone());
    self.nodes.insert(name, Box::new(node));
    Ok(self)
  }

  /// Designate the node execution starts from.
  pub fn set_entry(&mut self, name: &str) -> Result<&mut Self, GraphError> {
    self.require_node(name)?;
    if let Some(existing) = &self.entry {
      return Err(GraphError::EntryAlreadySet(existing.clone()));
    }

    self.entry = Some(name.to_string());
    Ok(self)
  }

  /// Add an unconditional transition. `to` may be [`END`].
  pub fn add_edge(&mut self, from: &str, to: &str) -> Result<&mut Self, GraphError> {
    self.require_source(from)?;
    let target = self.require_target(to)?;

    self
      .transitions
      .insert(from.to_string(), Transition::Direct(target));
    Ok(self)
  }

  /// Add a transition whose destination is picked at runtime.
  ///
  /// `predicate` maps the state to a key of type `K`; `mapping` maps keys to
  /// destination names (or [`END`]). The mapping must cover every value of
  /// `K`, which [`compile`](StateGraph::compile) enforces.
  pub fn add_conditional_edge<K, P, I, T>(
    &mut self,
    from: &str,
    predicate: P,
    mapping: I,
  ) -> Result<&mut Self, GraphError>
  where
    K: RouteKey,
    P: Fn(&S) -> K + Send + Sync + 'static,
    I: IntoIterator<Item = (K, T)>,
    T: AsRef<str>,
  {
    self.require_source(from)?;

    let mut routes = HashMap::new();
    for (key, to) in mapping {
      routes.insert(key, self.require_target(to.as_ref())?);
    }
    if routes.is_empty() {
      return Err(GraphError::incomplete(format!(
        "conditional edge from '{}' has an empty mapping",
        from
      )));
    }

    self.transitions.insert(
      from.to_string(),
      Transition::Conditional(Box::new(ConditionalRouter::new(predicate, routes))),
    );
    Ok(self)
  }

  /// Validate the declaration and freeze it into a routing table.
  pub fn compile(self) -> Result<CompiledWorkflow<S>, GraphError> {
    let entry = self
      .entry
      .clone()
      .ok_or_else(|| GraphError::incomplete("no entry node set"))?;

    for name in &self.order {
      let transition = self.transitions.get(name).ok_or_else(|| {
        GraphError::incomplete(format!("node '{}' has no outgoing transition", name))
      })?;

      if let Transition::Conditional(router) = transition {
        let unmapped = router.unmapped_keys();
        if !unmapped.is_empty() {
          return Err(GraphError::incomplete(format!(
            "conditional edge from '{}' does not map key(s): {}",
            name,
            unmapped.join(", ")
          )));
        }
      }

      for target in transition.targets() {
        if let Target::Node(to) = target {
          if !self.nodes.contains_key(to) {
            return Err(GraphError::UnknownNode(to.clone()));
          }
        }
      }
    }

    let graph = Graph::new(&entry, &self.transitions);
    let unreachable = graph.unreachable();
    if !unreachable.is_empty() {
      return Err(GraphError::incomplete(format!(
        "unreachable from entry '{}': {}",
        entry,
        unreachable.join(", ")
      )));
    }

    debug!(
      workflow = %self.name,
      entry = %entry,
      nodes = self.order.len(),
      "workflow compiled"
    );

    Ok(CompiledWorkflow::new(
      self.name,
      entry,
      self.order,
      self.nodes,
      self.transitions,
      graph,
    ))
  }

  fn require_node(&self, name: &str) -> Result<(), GraphError> {
    if name == END {
      return Err(GraphError::ReservedName(name.to_string()));
    }
    if !self.nodes.contains_key(name) {
      return Err(GraphError::UnknownNode(name.to_string()));
    }
    Ok(())
  }

  fn require_source(&self, from: &str) -> Result<(), GraphError> {
    self.require_node(from)?;
    if self.transitions.contains_key(from) {
      return Err(GraphError::DuplicateTransition(from.to_string()));
    }
    Ok(())
  }

  fn require_target(&self, to: &str) -> Result<Target, GraphError> {
    let target = Target::parse(to);
    if let Target::Node(name) = &target {
      if !self.nodes.contains_key(name) {
        return Err(GraphError::UnknownNode(name.clone()));
      }
    }
    Ok(target)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::node::node_fn;
  use crate::route::{Route, route_on_error};

  #[derive(Debug, Default)]
  struct Record {
    error: Option<String>,
  }

  impl WorkflowState for Record {
    fn error_message(&self) -> Option<&str> {
      self.error.as_deref()
    }
  }

  fn identity() -> impl Node<Record> {
    node_fn(|s: Record| s)
  }

  #[test]
  fn test_duplicate_node_rejected() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();

    let err = graph.register_node("a", identity()).err().unwrap();
    assert_eq!(err, GraphError::DuplicateNode("a".to_string()));
  }

  #[test]
  fn test_terminal_name_reserved() {
    let mut graph = StateGraph::<Record>::new("test");
    let err = graph.register_node(END, identity()).err().unwrap();
    assert_eq!(err, GraphError::ReservedName(END.to_string()));
  }

  #[test]
  fn test_entry_must_be_registered() {
    let mut graph = StateGraph::<Record>::new("test");
    let err = graph.set_entry("missing").err().unwrap();
    assert_eq!(err, GraphError::UnknownNode("missing".to_string()));
  }

  #[test]
  fn test_entry_set_once() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();
    graph.register_node("b", identity()).unwrap();
    graph.set_entry("a").unwrap();

    let err = graph.set_entry("b").err().unwrap();
    assert_eq!(err, GraphError::EntryAlreadySet("a".to_string()));
  }

  #[test]
  fn test_edge_to_unknown_node_rejected() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();

    let err = graph.add_edge("a", "ghost").err().unwrap();
    assert_eq!(err, GraphError::UnknownNode("ghost".to_string()));
  }

  #[test]
  fn test_edge_from_unknown_node_rejected() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();

    let err = graph.add_edge("ghost", "a").err().unwrap();
    assert_eq!(err, GraphError::UnknownNode("ghost".to_string()));
  }

  #[test]
  fn test_second_transition_rejected() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();
    graph.register_node("b", identity()).unwrap();
    graph.add_edge("a", "b").unwrap();

    let err = graph
      .add_conditional_edge("a", route_on_error, [(Route::Continue, END)])
      .err()
      .unwrap();
    assert_eq!(err, GraphError::DuplicateTransition("a".to_string()));
  }

  #[test]
  fn test_conditional_edge_to_unknown_node_rejected() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();

    let err = graph
      .add_conditional_edge(
        "a",
        route_on_error,
        [(Route::Continue, END), (Route::ErrorHandler, "ghost")],
      )
      .err()
      .unwrap();
    assert_eq!(err, GraphError::UnknownNode("ghost".to_string()));
  }

  #[test]
  fn test_empty_mapping_rejected() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();

    let err = graph
      .add_conditional_edge("a", route_on_error, Vec::<(Route, &str)>::new())
      .err()
      .unwrap();
    assert!(matches!(err, GraphError::IncompleteGraph { .. }));
  }

  #[test]
  fn test_compile_requires_entry() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();
    graph.add_edge("a", END).unwrap();

    let err = graph.compile().err().unwrap();
    assert_eq!(
      err,
      GraphError::IncompleteGraph {
        reason: "no entry node set".to_string()
      }
    );
  }

  #[test]
  fn test_compile_requires_every_transition() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();
    graph.register_node("b", identity()).unwrap();
    graph.set_entry("a").unwrap();
    graph.add_edge("a", "b").unwrap();

    let err = graph.compile().err().unwrap();
    assert_eq!(
      err,
      GraphError::IncompleteGraph {
        reason: "node 'b' has no outgoing transition".to_string()
      }
    );
  }

  #[test]
  fn test_compile_rejects_non_exhaustive_mapping() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();
    graph.set_entry("a").unwrap();
    graph
      .add_conditional_edge("a", route_on_error, [(Route::Continue, END)])
      .unwrap();

    let err = graph.compile().err().unwrap();
    assert_eq!(
      err,
      GraphError::IncompleteGraph {
        reason: "conditional edge from 'a' does not map key(s): error_handler".to_string()
      }
    );
  }

  #[test]
  fn test_compile_rejects_unreachable_nodes() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();
    graph.register_node("orphan", identity()).unwrap();
    graph.set_entry("a").unwrap();
    graph.add_edge("a", END).unwrap();
    graph.add_edge("orphan", END).unwrap();

    let err = graph.compile().err().unwrap();
    assert_eq!(
      err,
      GraphError::IncompleteGraph {
        reason: "unreachable from entry 'a': orphan".to_string()
      }
    );
  }

  #[test]
  fn test_compile_straight_line() {
    let mut graph = StateGraph::<Record>::new("test");
    graph.register_node("a", identity()).unwrap();
    graph.register_node("b", identity()).unwrap();
    graph.set_entry("a").unwrap();
    graph.add_edge("a", "b").unwrap();
    graph.add_edge("b", END).unwrap();

    let workflow = graph.compile().unwrap();
    assert_eq!(workflow.entry(), "a");
    assert_eq!(workflow.node_names(), &["a".to_string(), "b".to_string()]);
    assert_eq!(workflow.graph().upstream("b"), &["a".to_string()]);
    assert_eq!(workflow.graph().downstream("b"), &[Target::End]);
  }
}
