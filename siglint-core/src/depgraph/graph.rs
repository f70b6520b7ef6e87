//! Method → callee map and reachability over it.
//!
//! The map is supplied from outside (an upstream call-reference extractor),
//! as JSON of the shape `{ "Graph::a": ["Graph::b", "helper"], ... }`.
//! Calls dispatched through trait objects or generic bounds are only present
//! if that extractor emitted them.

use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::common::GraphTraversal;
use crate::error::{IoResultExt, SiglintError, SiglintResult};

/// Immutable-after-load adjacency map, sorted for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON dependency map. Duplicate callees collapse.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads a dependency map file.
    pub fn load(path: &Path) -> SiglintResult<Self> {
        let text = fs::read_to_string(path).with_path(path)?;
        let graph = Self::from_json_str(&text)
            .map_err(|e| SiglintError::artifact(path, format!("invalid dependency map: {}", e)))?;
        debug!(
            path = %path.display(),
            methods = graph.method_count(),
            edges = graph.edge_count(),
            "loaded dependency map"
        );
        Ok(graph)
    }

    /// Loads and unions several maps, in the given order.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> SiglintResult<Self> {
        let mut graph = Self::new();
        for path in paths {
            graph.merge(Self::load(path.as_ref())?);
        }
        Ok(graph)
    }

    /// Unions `other` into `self`; callee sets of shared methods are merged.
    pub fn merge(&mut self, other: DependencyGraph) {
        for (method, callees) in other.edges {
            self.edges.entry(method).or_default().extend(callees);
        }
    }

    pub fn contains(&self, method: &str) -> bool {
        self.edges.contains_key(method)
    }

    pub fn callees(&self, method: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(method)
    }

    pub fn method_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Every method transitively referenced from `start`, including `start`.
    ///
    /// Callees missing from the map are kept as leaves.
    ///
    /// # Errors
    /// `UnknownStartMethod` if `start` is not a key of the map.
    pub fn reachable_from(&self, start: &str) -> SiglintResult<BTreeSet<String>> {
        if !self.contains(start) {
            return Err(SiglintError::unknown_start(start));
        }
        let reachable = self.reachable_set([start.to_string()]);
        info!(start, reachable = reachable.len(), "computed reachable set");
        Ok(reachable)
    }

    /// Directed graph restricted to edges between two `reachable` methods.
    ///
    /// Nodes and edges are inserted in sorted order so iteration is stable.
    pub fn subgraph<'a>(&'a self, reachable: &'a BTreeSet<String>) -> DiGraphMap<&'a str, ()> {
        let mut g = DiGraphMap::with_capacity(reachable.len(), reachable.len() * 2);
        for method in reachable {
            g.add_node(method.as_str());
        }
        for method in reachable {
            let Some(callees) = self.callees(method) else {
                continue;
            };
            for callee in callees.iter().filter(|c| reachable.contains(*c)) {
                g.add_edge(method.as_str(), callee.as_str(), ());
            }
        }
        g
    }
}

impl GraphTraversal for DependencyGraph {
    type Node = String;

    fn neighbors(&self, node: &String) -> Vec<String> {
        self.callees(node)
            .map(|callees| callees.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn contains_node(&self, node: &String) -> bool {
        self.contains(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        DependencyGraph {
            edges: edges
                .iter()
                .map(|(from, callees)| {
                    (from.to_string(), callees.iter().map(|c| c.to_string()).collect())
                })
                .collect(),
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_outgoing_edges_is_singleton() {
        let g = graph(&[("a", &[]), ("b", &["a"])]);
        assert_eq!(g.reachable_from("a").unwrap(), set(&["a"]));
    }

    #[test]
    fn test_cycle_terminates() {
        let g = graph(&[("A", &["B"]), ("B", &["A"])]);
        assert_eq!(g.reachable_from("A").unwrap(), set(&["A", "B"]));
    }

    #[test]
    fn test_missing_callee_is_leaf() {
        let g = graph(&[("a", &["b", "external"]), ("b", &["c"])]);
        assert_eq!(
            g.reachable_from("a").unwrap(),
            set(&["a", "b", "c", "external"])
        );
    }

    #[test]
    fn test_unknown_start() {
        let g = graph(&[("a", &["b"])]);
        let err = g.reachable_from("b").unwrap_err();
        assert!(matches!(err, SiglintError::UnknownStartMethod { ref method } if method == "b"));
    }

    #[test]
    fn test_from_json_and_merge() {
        let mut g = DependencyGraph::from_json_str(r#"{"a": ["b", "b"], "b": []}"#).unwrap();
        assert_eq!(g.edge_count(), 1);
        g.merge(DependencyGraph::from_json_str(r#"{"a": ["c"], "c": ["a"]}"#).unwrap());
        assert_eq!(g.callees("a").unwrap(), &set(&["b", "c"]));
        assert_eq!(g.method_count(), 3);
        assert!(DependencyGraph::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_subgraph_keeps_only_reachable_edges() {
        let g = graph(&[
            ("start", &["x", "y"]),
            ("x", &["start"]),
            ("y", &[]),
            ("z", &["x"]),
        ]);
        let reachable = g.reachable_from("start").unwrap();
        let sub = g.subgraph(&reachable);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 3);
        assert!(sub.contains_edge("x", "start"));
        assert!(!sub.contains_node("z"));
        let nodes: Vec<&str> = sub.nodes().collect();
        assert_eq!(nodes, vec!["start", "x", "y"]);
    }
}
