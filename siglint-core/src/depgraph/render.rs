//! Rendering of a reachable subgraph: Graphviz DOT and typed JSON.
//!
//! Every node carries a category, the declaring type of the method as found
//! in the parsed records, or [`OTHER_CATEGORY`] when no record owns it.

use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write;
use tracing::error;

use crate::signature::FunctionRecord;

/// Category of methods no record claims.
pub const OTHER_CATEGORY: &str = "other";

/// Fill colours handed out to categories in sorted order.
const PALETTE: &[&str] = &[
    "lightblue",
    "lightgreen",
    "khaki",
    "plum",
    "lightsalmon",
    "paleturquoise",
    "wheat",
    "thistle",
];

const OTHER_COLOR: &str = "lightgrey";

/// Method name → declaring type.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    by_method: HashMap<String, String>,
}

impl CategoryIndex {
    /// Indexes every method record under both `name` and `Owner::name`.
    ///
    /// When a plain name is declared by several types, the first record wins.
    pub fn from_records(records: &[FunctionRecord]) -> Self {
        let mut by_method = HashMap::new();
        for record in records {
            let Some(owner) = &record.owning_struct else {
                continue;
            };
            by_method
                .entry(record.qualified_name())
                .or_insert_with(|| owner.clone());
            by_method
                .entry(record.name.clone())
                .or_insert_with(|| owner.clone());
        }
        Self { by_method }
    }

    pub fn category_of(&self, method: &str) -> &str {
        self.by_method
            .get(method)
            .map_or(OTHER_CATEGORY, String::as_str)
    }
}

/// Category → colour, stable for a given set of categories.
fn color_map<'a>(categories: &BTreeSet<&'a str>) -> BTreeMap<&'a str, &'static str> {
    categories
        .iter()
        .filter(|c| **c != OTHER_CATEGORY)
        .enumerate()
        .map(|(i, c)| (*c, PALETTE[i % PALETTE.len()]))
        .chain(std::iter::once((OTHER_CATEGORY, OTHER_COLOR)))
        .collect()
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Generates a Graphviz DOT description of a reachable subgraph.
///
/// - fill colour per category, listed in a legend comment
/// - the start method drawn with a bold double outline
/// - edges only between reachable methods
pub fn render_dot(graph: &DiGraphMap<&str, ()>, start: &str, categories: &CategoryIndex) -> String {
    // ~100 bytes/node + ~40 bytes/edge + header/footer
    let estimated_capacity = graph.node_count() * 100 + graph.edge_count() * 40 + 200;
    let mut dot = String::with_capacity(estimated_capacity);

    if let Err(e) = write_dot_content(&mut dot, graph, start, categories) {
        error!(error = %e, "failed to generate DOT string");
        return "digraph reachable {\n}\n".to_string();
    }
    dot
}

fn write_dot_content(
    dot: &mut String,
    graph: &DiGraphMap<&str, ()>,
    start: &str,
    categories: &CategoryIndex,
) -> std::fmt::Result {
    let used: BTreeSet<&str> = graph.nodes().map(|n| categories.category_of(n)).collect();
    let colors = color_map(&used);

    writeln!(dot, "digraph reachable {{")?;
    writeln!(dot, "  rankdir=LR;")?;
    writeln!(
        dot,
        "  node [shape=box, style=filled, fontname=\"JetBrains Mono\"];"
    )?;
    for category in &used {
        writeln!(
            dot,
            "  // category {} = {}",
            category,
            colors.get(category).copied().unwrap_or(OTHER_COLOR)
        )?;
    }
    writeln!(dot)?;

    for node in graph.nodes() {
        let category = categories.category_of(node);
        let color = colors.get(category).copied().unwrap_or(OTHER_COLOR);
        if node == start {
            writeln!(
                dot,
                "  \"{}\" [category=\"{}\", fillcolor={}, penwidth=3, peripheries=2];",
                escape(node),
                escape(category),
                color
            )?;
        } else {
            writeln!(
                dot,
                "  \"{}\" [category=\"{}\", fillcolor={}];",
                escape(node),
                escape(category),
                color
            )?;
        }
    }

    writeln!(dot)?;

    for (from, to, _) in graph.all_edges() {
        writeln!(dot, "  \"{}\" -> \"{}\";", escape(from), escape(to))?;
    }

    writeln!(dot, "}}")?;
    Ok(())
}

/// A node in the JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: usize,
    pub name: String,
    pub category: String,
    pub is_start: bool,
}

/// An edge in the JSON output, by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
}

/// Typed JSON form of a reachable subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachableGraph {
    pub start: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Categories present, sorted
    pub categories: Vec<String>,
}

impl ReachableGraph {
    pub fn build(graph: &DiGraphMap<&str, ()>, start: &str, categories: &CategoryIndex) -> Self {
        let ids: HashMap<&str, usize> = graph.nodes().enumerate().map(|(i, n)| (n, i)).collect();

        let nodes: Vec<GraphNode> = graph
            .nodes()
            .enumerate()
            .map(|(id, name)| GraphNode {
                id,
                name: name.to_string(),
                category: categories.category_of(name).to_string(),
                is_start: name == start,
            })
            .collect();

        let edges = graph
            .all_edges()
            .filter_map(|(from, to, _)| {
                Some(GraphEdge {
                    from: *ids.get(from)?,
                    to: *ids.get(to)?,
                })
            })
            .collect();

        let used: BTreeSet<&str> = nodes.iter().map(|n| n.category.as_str()).collect();
        let categories = used.into_iter().map(str::to_string).collect();

        Self {
            start: start.to_string(),
            nodes,
            edges,
            categories,
        }
    }
}
