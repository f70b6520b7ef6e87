//! Shared graph traversal abstraction.
//!
//! Reachability is written once here; graph types only expose their nodes
//! and outgoing edges.

use std::collections::BTreeSet;

/// Node/edge access plus a provided reachability walk.
///
/// `DependencyGraph` implements this with method names as nodes:
///
/// ```ignore
/// let reachable = deps.reachable_set(["Graph::new".to_string()]);
/// ```
pub trait GraphTraversal {
    type Node: Clone + Ord;

    /// Returns all outgoing neighbors of a node; empty for unknown nodes.
    fn neighbors(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Whether `node` is a key of the graph.
    fn contains_node(&self, node: &Self::Node) -> bool;

    /// Work-list traversal from every root: push roots; pop; if unvisited,
    /// mark and push its unvisited neighbors; stop when the list is empty.
    ///
    /// Each node is marked once, so cycles terminate. Roots are included
    /// whether or not the graph knows them; callers that need the root to
    /// exist check `contains_node` first.
    ///
    /// Complexity: O(|V| + |E|) over the reachable part.
    fn reachable_set<I>(&self, roots: I) -> BTreeSet<Self::Node>
    where
        I: IntoIterator<Item = Self::Node>,
    {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<Self::Node> = roots.into_iter().collect();

        while let Some(node) = stack.pop() {
            if visited.contains(&node) {
                continue;
            }
            for neighbor in self.neighbors(&node) {
                if !visited.contains(&neighbor) {
                    stack.push(neighbor);
                }
            }
            visited.insert(node);
        }

        visited
    }
}
