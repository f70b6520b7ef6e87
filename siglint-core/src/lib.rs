//! siglint-core: lightweight signature parsing and API documentation linting
//!
//! Turns raw Rust source text into structured function records, checks the
//! documentation of one type's public methods, and renders the part of an
//! externally supplied call map reachable from a chosen method.
//!
//! # Features
//!
//! - **Signature parsing**: visibility, qualifiers, generics, typed parameters
//!   and return types from `fn` items, with the owning type of impl blocks
//! - **Failure isolation**: a malformed item becomes a diagnostic, the rest of
//!   the file is still parsed
//! - **Doc coverage**: `# Arguments` / `# Example` / `# Safety` / `# Raises`
//!   rules with per-kind suppression
//! - **Reachability**: work-list traversal over a method → callee map, rendered
//!   as Graphviz DOT or JSON
//! - **Artifacts**: JSON record and finding files, written atomically
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use siglint_core::{gather_rs_files, parse_sources, read_sources, DocChecker};
//!
//! let files = gather_rs_files(Path::new("src"), &[])?;
//! let sources = read_sources(&files)?;
//! let outcome = parse_sources(&sources);
//!
//! let report = DocChecker::new("Graph").check(&outcome.records);
//! std::process::exit(report.exit_code());
//! ```
//!
//! # Module Organization
//!
//! - [`signature`]: delimiter scanner, type parser, fn/impl parser, corpus driver
//! - [`doc`]: doc-block sections and coverage rules
//! - [`depgraph`]: dependency map, reachability and rendering
//! - [`artifact`]: JSON artifacts with atomic writes
//! - [`scan`]: parallel file discovery
//! - [`config`]: `siglint.toml` loading
//! - [`error`]: typed error handling
//!
//! # Cargo Features
//!
//! - `depgraph` (default): dependency-map reachability and rendering
//! - `full`: enable all optional features

// Core modules (always available)
pub mod artifact;
pub mod common;
pub mod config;
pub mod doc;
pub mod error;
pub mod logging;
pub mod report;
pub mod scan;
pub mod signature;

// Common trait re-exports
pub use common::GraphTraversal;

// Feature-gated modules
#[cfg(feature = "depgraph")]
pub mod depgraph;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{IoResultExt, SiglintError, SiglintResult};

// Artifacts
pub use artifact::{
    load_doc_artifact, load_records, save_doc_artifact, save_records, write_atomic, DocArtifact,
    RecordsArtifact,
};

// Configuration
pub use config::{load_config, DocsConfig, OutputConfig, ScanConfig, SiglintConfig, CONFIG_FILE};

// Documentation checking
pub use doc::{ArgumentEntry, DocCheckReport, DocChecker, DocSection, Finding, ParsedDoc};

// Logging
pub use logging::{init_structured_logging, log_event};

// Reporting
pub use report::{
    format_doc_report_plain, format_reachable_plain, format_summary_plain, print_doc_report,
    print_reachable, print_summary, ParseSummary,
};

// File scanning
pub use scan::gather_rs_files;

// Signature parsing
pub use signature::{
    corpus_digest, parse_identifier, parse_parameters, parse_source, parse_sources, parse_type,
    parse_type_str, read_sources, split_delimited, split_top_level, Diagnostic, FunctionRecord,
    GenericArg, Modifiers, Param, ParseOutcome, SourceFile, TypeExpr,
};

// Feature-gated re-exports
#[cfg(feature = "depgraph")]
pub use depgraph::{
    render_dot, CategoryIndex, DependencyGraph, GraphEdge, GraphNode, ReachableGraph,
    OTHER_CATEGORY,
};
