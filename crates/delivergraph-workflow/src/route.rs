use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::state::WorkflowState;

/// Reserved destination that ends an invocation. Never a real node.
pub const END: &str = "__end__";

/// Where a transition leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
  Node(String),
  End,
}

impl Target {
  pub(crate) fn parse(name: &str) -> Self {
    if name == END {
      Self::End
    } else {
      Self::Node(name.to_string())
    }
  }

  /// The destination node name, or `None` for the terminal marker.
  pub fn node(&self) -> Option<&str> {
    match self {
      Self::Node(name) => Some(name),
      Self::End => None,
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Node(name) => f.write_str(name),
      Self::End => f.write_str(END),
    }
  }
}

/// A closed set of routing keys a conditional edge can produce.
///
/// `all()` must list every value the type can take; the builder uses it to
/// reject a mapping that leaves any key without a destination.
pub trait RouteKey: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
  fn all() -> &'static [Self];

  fn as_str(&self) -> &'static str;
}

/// Keys produced by [`route_on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
  Continue,
  ErrorHandler,
}

impl RouteKey for Route {
  fn all() -> &'static [Self] {
    &[Self::Continue, Self::ErrorHandler]
  }

  fn as_str(&self) -> &'static str {
    match self {
      Self::Continue => "continue",
      Self::ErrorHandler => "error_handler",
    }
  }
}

/// Route to the error handler once any step has recorded a failure.
pub fn route_on_error<S: WorkflowState>(state: &S) -> Route {
  if state.has_error() {
    Route::ErrorHandler
  } else {
    Route::Continue
  }
}

/// Type-erased conditional edge, so one routing table can hold edges keyed by
/// different [`RouteKey`] types.
pub(crate) trait Router<S>: Send + Sync {
  /// Evaluate the predicate. `Err` carries a key with no destination.
  fn resolve(&self, state: &S) -> Result<&Target, &'static str>;

  fn targets(&self) -> Vec<&Target>;

  fn unmapped_keys(&self) -> Vec<&'static str>;
}

pub(crate) struct ConditionalRouter<S, K, P> {
  predicate: P,
  mapping: HashMap<K, Target>,
  _state: PhantomData<fn(&S)>,
}

impl<S, K, P> ConditionalRouter<S, K, P> {
  pub(crate) fn new(predicate: P, mapping: HashMap<K, Target>) -> Self {
    Self {
      predicate,
      mapping,
      _state: PhantomData,
    }
  }
}

impl<S, K, P> Router<S> for ConditionalRouter<S, K, P>
where
  K: RouteKey,
  P: Fn(&S) -> K + Send + Sync,
{
  fn resolve(&self, state: &S) -> Result<&Target, &'static str> {
    let key = (self.predicate)(state);
    self.mapping.get(&key).ok_or(key.as_str())
  }

  fn targets(&self) -> Vec<&Target> {
    self.mapping.values().collect()
  }

  fn unmapped_keys(&self) -> Vec<&'static str> {
    K::all()
      .iter()
      .filter(|key| !self.mapping.contains_key(key))
      .map(|key| key.as_str())
      .collect()
  }
}

/// The single outgoing rule of one node.
pub(crate) enum Transition<S> {
  Direct(Target),
  Conditional(Box<dyn Router<S>>),
}

impl<S> Transition<S> {
  pub(crate) fn targets(&self) -> Vec<&Target> {
    match self {
      Self::Direct(target) => vec![target],
      Self::Conditional(router) => router.targets(),
    }
  }
}
