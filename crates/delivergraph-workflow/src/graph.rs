use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::route::{Target, Transition};

/// Adjacency view of a routing table, for traversal and analysis.
#[derive(Debug, Clone)]
pub struct Graph {
  /// node -> every destination its transition can pick (terminal included).
  adjacency: HashMap<String, Vec<Target>>,
  /// node -> nodes that can transition into it.
  reverse_adjacency: HashMap<String, Vec<String>>,
  entry: String,
}

impl Graph {
  pub(crate) fn new<'a, S: 'a>(
    entry: &str,
    transitions: impl IntoIterator<Item = (&'a String, &'a Transition<S>)>,
  ) -> Self {
    let mut adjacency: HashMap<String, Vec<Target>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    for (from, transition) in transitions {
      let mut targets: Vec<Target> = transition.targets().into_iter().cloned().collect();
      targets.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
      targets.dedup();

      for target in &targets {
        if let Target::Node(to) = target {
          reverse_adjacency
            .entry(to.clone())
            .or_default()
            .push(from.clone());
        }
      }
      adjacency.insert(from.clone(), targets);
    }

    Self {
      adjacency,
      reverse_adjacency,
      entry: entry.to_string(),
    }
  }

  /// The node execution starts from.
  pub fn entry(&self) -> &str {
    &self.entry
  }

  /// Destinations reachable in one hop from `node_id`.
  pub fn downstream(&self, node_id: &str) -> &[Target] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Nodes that may hand control to `node_id`.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Every node reachable from the entry, breadth first.
  pub fn reachable(&self) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([self.entry.clone()]);

    while let Some(node_id) = queue.pop_front() {
      if !seen.insert(node_id.clone()) {
        continue;
      }
      for target in self.downstream(&node_id) {
        if let Target::Node(next) = target {
          queue.push_back(next.clone());
        }
      }
    }

    seen
  }

  /// Registered nodes the entry can never reach, sorted by name.
  pub fn unreachable(&self) -> Vec<String> {
    let reachable = self.reachable();
    self
      .adjacency
      .keys()
      .filter(|id| !reachable.contains(*id))
      .cloned()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect()
  }
}
