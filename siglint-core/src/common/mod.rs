//! Utilities shared across analyzer modules.

mod graph_trait;

pub use graph_trait::GraphTraversal;
