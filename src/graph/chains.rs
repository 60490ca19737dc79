//! Reference chain enumeration.

use std::collections::HashSet;
use std::fmt;

use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::ReferenceGraph;

/// Entities from the root to a terminal entity, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReferenceChain(Vec<String>);

impl ReferenceChain {
    pub fn entities(&self) -> &[String] {
        &self.0
    }

    pub fn root(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ReferenceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}

impl<S: Into<String>> FromIterator<S> for ReferenceChain {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ReferenceChain(iter.into_iter().map(Into::into).collect())
    }
}

/// Depth-first walk from the root. A node whose neighbors are all on the
/// current path ends a chain; mutual references are cut at their second
/// occurrence within a path. A root with no references yields nothing.
pub(super) fn enumerate(graph: &ReferenceGraph) -> Vec<ReferenceChain> {
    let mut chains = Vec::new();
    if graph.neighbor_indices(graph.root).is_empty() {
        return chains;
    }

    let mut path = Vec::new();
    let mut in_path = HashSet::new();
    dfs(graph, graph.root, &mut path, &mut in_path, &mut chains);

    tracing::debug!(root = graph.root(), chains = chains.len(), "enumerated reference chains");
    chains
}

fn dfs(
    graph: &ReferenceGraph,
    node: NodeIndex,
    path: &mut Vec<NodeIndex>,
    in_path: &mut HashSet<NodeIndex>,
    chains: &mut Vec<ReferenceChain>,
) {
    path.push(node);
    in_path.insert(node);

    let next: Vec<NodeIndex> = graph
        .neighbor_indices(node)
        .into_iter()
        .filter(|n| !in_path.contains(n))
        .collect();

    if next.is_empty() {
        chains.push(path.iter().map(|&n| graph.graph[n].as_str()).collect());
    } else {
        for n in next {
            dfs(graph, n, path, in_path, chains);
        }
    }

    in_path.remove(&node);
    path.pop();
}
