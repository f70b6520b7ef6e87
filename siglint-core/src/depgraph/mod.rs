//! Dependency-map reachability and rendering.
//!
//! `graph` holds the externally supplied method → callee map and computes
//! reachable sets; `render` turns a reachable subgraph into DOT or JSON.

pub mod graph;
pub mod render;

pub use graph::DependencyGraph;
pub use render::{render_dot, CategoryIndex, GraphEdge, GraphNode, ReachableGraph, OTHER_CATEGORY};
