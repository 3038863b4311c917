use std::marker::PhantomData;

use async_trait::async_trait;

/// A unit of computation in a workflow.
///
/// A node takes ownership of the state record and hands back the updated
/// record. Nodes must be total: failures inside the step are written into the
/// record (see [`WorkflowState`]), never returned to the engine. A node may
/// await its own collaborators; the engine treats the whole call as one step.
///
/// [`WorkflowState`]: crate::WorkflowState
#[async_trait]
pub trait Node<S>: Send + Sync {
  async fn run(&self, state: S) -> S;
}

/// Adapter that turns a synchronous `Fn(S) -> S` into a [`Node`].
pub struct FnNode<S, F> {
  f: F,
  _state: PhantomData<fn(S) -> S>,
}

/// Lift a plain function into a node.
///
/// ```ignore
/// graph.add_node("double", node_fn(|mut s: Counter| { s.value *= 2; s }))?;
/// ```
pub fn node_fn<S, F>(f: F) -> FnNode<S, F>
where
  F: Fn(S) -> S + Send + Sync,
{
  FnNode {
    f,
    _state: PhantomData,
  }
}

#[async_trait]
impl<S, F> Node<S> for FnNode<S, F>
where
  S: Send + 'static,
  F: Fn(S) -> S + Send + Sync,
{
  async fn run(&self, state: S) -> S {
    (self.f)(state)
  }
}
