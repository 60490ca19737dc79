//! Reference graph: which entities a filter reaches through reference keys.
//!
//! Built breadth-first from a parsed root filter. The graph is an arena of
//! entity nodes (petgraph) with one edge per `parent -> referenced` hop that
//! was discovered before the referenced entity was expanded.
//!
//! Each entity is expanded at most once per build, using the first nested
//! filter that reached it. A reference to an entity that has already been
//! expanded records no edge, so its nested filter contributes nothing to the
//! chains derived from this graph.

mod chains;

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::registry::ParsedFilter;

pub use chains::ReferenceChain;

/// Adjacency of entity references discovered in one filter.
#[derive(Debug, Clone)]
pub struct ReferenceGraph {
    graph: DiGraph<String, ()>,
    entity_index: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl ReferenceGraph {
    /// Breadth-first expansion of `filter` and its nested reference filters.
    pub fn build(filter: &ParsedFilter) -> Self {
        let mut graph = DiGraph::new();
        let mut entity_index = HashMap::new();
        let root = graph.add_node(filter.entity().to_string());
        entity_index.insert(filter.entity().to_string(), root);

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&ParsedFilter> = VecDeque::from([filter]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.entity()) {
                continue;
            }
            let Some(&from) = entity_index.get(current.entity()) else {
                continue;
            };

            for nested in current.partition().references {
                let target = nested.entity();
                if visited.contains(target) {
                    tracing::trace!(from = current.entity(), to = target, "reference already expanded");
                    continue;
                }

                let to = *entity_index
                    .entry(target.to_string())
                    .or_insert_with(|| graph.add_node(target.to_string()));
                if graph.find_edge(from, to).is_none() {
                    graph.add_edge(from, to, ());
                }
                queue.push_back(nested);
            }
        }

        tracing::debug!(
            root = filter.entity(),
            entities = graph.node_count(),
            edges = graph.edge_count(),
            "built reference graph"
        );

        Self {
            graph,
            entity_index,
            root,
        }
    }

    /// Enumerate the reference chains from the root.
    pub fn chains(&self) -> Vec<ReferenceChain> {
        chains::enumerate(self)
    }

    pub fn root(&self) -> &str {
        &self.graph[self.root]
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entity_index.contains_key(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Referenced entities of `entity`, in discovery order.
    pub fn neighbors(&self, entity: &str) -> Vec<&str> {
        self.entity_index
            .get(entity)
            .map(|&node| {
                self.neighbor_indices(node)
                    .into_iter()
                    .map(|n| self.graph[n].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The whole graph as `entity -> referenced entities`.
    pub fn adjacency(&self) -> BTreeMap<&str, Vec<&str>> {
        self.graph
            .node_indices()
            .map(|node| {
                (
                    self.graph[node].as_str(),
                    self.neighbor_indices(node)
                        .into_iter()
                        .map(|n| self.graph[n].as_str())
                        .collect(),
                )
            })
            .collect()
    }

    fn neighbor_indices(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(id, _)| id.index());
        edges.into_iter().map(|(_, target)| target).collect()
    }
}
