//! siglint CLI - signature parser and API doc linter for Rust sources.
//!
//! Features:
//! - Rayon-powered parallel parsing with per-item failure isolation
//! - Documentation coverage check for one type's public methods
//! - Reachability over an external method → callee map, as DOT or JSON
//! - JSON artifacts for records and findings

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use siglint_core::{
    corpus_digest, gather_rs_files, init_structured_logging, load_config, log_event,
    parse_sources, print_doc_report, print_reachable, print_summary, read_sources, render_dot,
    save_doc_artifact, save_records, CategoryIndex, DependencyGraph, DocArtifact, DocChecker,
    Finding, ParseOutcome, ParseSummary, ReachableGraph, RecordsArtifact, SiglintConfig,
    SiglintError, SourceFile,
};

/// Type checked when neither the command line nor siglint.toml names one.
const DEFAULT_TARGET_TYPE: &str = "Graph";

/// Findings artifact written when the check fails and no path was given.
const DEFAULT_DOC_ARTIFACT: &str = "doc_findings.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Signature parser and API doc linter for Rust sources")]
pub struct Cli {
    /// Source file or directory to analyze
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Directory names to skip during discovery
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Write all parsed function records to a JSON file
    #[arg(long, value_name = "FILE")]
    dump_records: Option<String>,

    /// Check documentation coverage of the target type's public methods
    #[arg(long, conflicts_with_all = ["deps", "reachable"])]
    check_docs: bool,

    /// Type whose public methods are checked (default: Graph)
    #[arg(long)]
    target_type: Option<String>,

    /// Finding kinds to suppress
    #[arg(long, num_args = 1..)]
    suppress: Vec<String>,

    /// Function names to skip in the doc check
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Write the doc findings artifact to this file
    #[arg(long, value_name = "FILE")]
    artifact: Option<String>,

    /// Dependency map files (JSON: method -> [callees]); merged in order
    #[arg(long, num_args = 1.., value_name = "FILE")]
    deps: Vec<String>,

    /// Print the methods reachable from this method
    #[arg(long, value_name = "METHOD")]
    reachable: Option<String>,

    /// Write the reachable subgraph as Graphviz DOT to a file (default: <METHOD>.dot)
    #[arg(long, value_name = "FILE")]
    dot_file: Option<String>,

    /// Print the reachable subgraph as JSON (nodes, edges, categories)
    #[arg(long)]
    graph_json: bool,
}

/// Validates an output path for security issues.
///
/// Rejects NUL bytes, absolute paths and `..` components.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    if p
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

/// Validates an output path or exits with code 2.
fn output_path_or_exit(path: &str) -> PathBuf {
    match validate_output_path(path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[ERROR] Invalid output path: {}", e);
            std::process::exit(2);
        }
    }
}

/// `<method>.dot` with path separators and other unsafe characters replaced.
fn default_dot_file(method: &str) -> String {
    let stem: String = method
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{}.dot", stem)
}

/// Directory holding siglint.toml: the path itself, or the parent of a file.
fn config_root(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    }
}

/// Command-line values first, then config values not already present.
fn merge_lists(cli: &[String], config: Option<&Vec<String>>) -> Vec<String> {
    let mut merged: Vec<String> = cli.to_vec();
    for item in config.into_iter().flatten() {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}

fn check_suppress_kinds(kinds: &[String]) -> Result<()> {
    for kind in kinds {
        if !Finding::is_kind_name(kind) {
            bail!(
                "unknown finding kind '{}' (expected one of: {})",
                kind,
                Finding::KINDS.join(", ")
            );
        }
    }
    Ok(())
}

fn run_doc_check(
    cli: &Cli,
    cfg: &SiglintConfig,
    root: &Path,
    sources: &[SourceFile],
    outcome: &ParseOutcome,
    json: bool,
) -> Result<i32> {
    let docs = cfg.docs.as_ref();
    let target_type = cli
        .target_type
        .clone()
        .or_else(|| docs.and_then(|d| d.target_type.clone()))
        .unwrap_or_else(|| DEFAULT_TARGET_TYPE.to_string());
    let suppress = merge_lists(&cli.suppress, docs.and_then(|d| d.suppress.as_ref()));
    check_suppress_kinds(&suppress)?;
    let ignore = merge_lists(&cli.ignore, docs.and_then(|d| d.ignore.as_ref()));

    let report = DocChecker::new(target_type)
        .with_suppressed(suppress)
        .with_ignored(ignore)
        .check_outcome(outcome);
    print_doc_report(&report, json);

    // An explicitly requested artifact is always written; the default one
    // only when there is something to report.
    let requested = match (&cli.artifact, docs.and_then(|d| d.artifact.as_deref())) {
        (Some(file), _) => Some(output_path_or_exit(file)),
        (None, Some(file)) => Some(root.join(output_path_or_exit(file))),
        (None, None) => None,
    };
    let artifact_path = match requested {
        Some(path) => Some(path),
        None if !report.is_clean() => Some(PathBuf::from(DEFAULT_DOC_ARTIFACT)),
        None => None,
    };

    if let Some(path) = artifact_path {
        let artifact = DocArtifact::from_report(corpus_digest(sources), &report);
        save_doc_artifact(&path, &artifact)
            .with_context(|| format!("Failed to write doc artifact {}", path.display()))?;
        if !json {
            println!("Findings saved to: {}", path.display());
        }
    }

    Ok(report.exit_code())
}

fn run_reachability(cli: &Cli, outcome: &ParseOutcome, json: bool) -> Result<i32> {
    let Some(start) = cli.reachable.as_deref() else {
        bail!("--deps requires --reachable METHOD");
    };
    if cli.deps.is_empty() {
        bail!("--reachable requires at least one --deps FILE");
    }

    let deps = DependencyGraph::load_all(&cli.deps)
        .context("Failed to load dependency maps")?;

    let reachable = match deps.reachable_from(start) {
        Ok(set) => set,
        Err(e @ SiglintError::UnknownStartMethod { .. }) => {
            eprintln!("[ERROR] Invalid query: {}", e);
            return Ok(2);
        }
        Err(e) => return Err(e.into()),
    };

    let categories = CategoryIndex::from_records(&outcome.records);
    let sub = deps.subgraph(&reachable);

    if cli.graph_json {
        let graph = ReachableGraph::build(&sub, start, &categories);
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        print_reachable(start, &reachable, json);
    }

    let dot_file = cli
        .dot_file
        .clone()
        .unwrap_or_else(|| default_dot_file(start));
    let safe_path = output_path_or_exit(&dot_file);
    let dot = render_dot(&sub, start, &categories);
    if let Err(e) = fs::write(&safe_path, &dot) {
        log_event("WARN", &format!("DOT write failed to {}: {}", safe_path.display(), e));
        eprintln!("[WARN] DOT write failed to {}: {}", safe_path.display(), e);
    } else if !json && !cli.graph_json {
        println!("DOT graph saved to: {}", safe_path.display());
    }

    Ok(0)
}

fn main() -> Result<()> {
    // Global panic guard
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] siglint internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    // 1. Resolve input and config
    let path = Path::new(&cli.path);
    if !path.exists() {
        bail!("Path does not exist: {}", cli.path);
    }
    let root = config_root(path);
    let cfg = load_config(root)?.unwrap_or_default();
    let json = cli.json || cfg.wants_json();

    // 2. Discover and parse
    let excludes = merge_lists(&cli.exclude, cfg.scan.as_ref().and_then(|s| s.exclude.as_ref()));
    let exclude_refs: Vec<&str> = excludes.iter().map(String::as_str).collect();
    let files = gather_rs_files(path, &exclude_refs)
        .with_context(|| format!("Failed to scan {}", cli.path))?;
    let sources = read_sources(&files)?;
    let outcome = parse_sources(&sources);

    // 3. Record artifact (if requested)
    if let Some(ref file) = cli.dump_records {
        let safe_path = output_path_or_exit(file);
        let artifact = RecordsArtifact {
            digest: corpus_digest(&sources),
            records: outcome.records.clone(),
        };
        save_records(&safe_path, &artifact)
            .with_context(|| format!("Failed to write records to {}", safe_path.display()))?;
    }

    // 4. Reachability mode
    if cli.reachable.is_some() || !cli.deps.is_empty() {
        let code = run_reachability(&cli, &outcome, json)?;
        std::process::exit(code);
    }

    // 5. Doc check mode (exit code is CI-friendly)
    if cli.check_docs {
        let code = run_doc_check(&cli, &cfg, root, &sources, &outcome, json)?;
        std::process::exit(code);
    }

    // 6. Default: parse summary
    print_summary(&ParseSummary::new(files.len(), &outcome), json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_path_accepts_relative() {
        assert_eq!(
            validate_output_path("out/graph.dot").unwrap(),
            PathBuf::from("out/graph.dot")
        );
    }

    #[test]
    fn test_validate_output_path_rejects_traversal() {
        assert!(validate_output_path("../escape.json").is_err());
        assert!(validate_output_path("out/../../escape.json").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_absolute_and_nul() {
        #[cfg(unix)]
        assert!(validate_output_path("/tmp/x.json").is_err());
        assert!(validate_output_path("a\0b").is_err());
    }

    #[test]
    fn test_merge_lists_cli_first_without_duplicates() {
        let cli = vec!["a".to_string(), "b".to_string()];
        let cfg = vec!["b".to_string(), "c".to_string()];
        assert_eq!(merge_lists(&cli, Some(&cfg)), vec!["a", "b", "c"]);
        assert_eq!(merge_lists(&[], None), Vec::<String>::new());
    }

    #[test]
    fn test_check_suppress_kinds() {
        assert!(check_suppress_kinds(&["MissingExampleHeader".to_string()]).is_ok());
        assert!(check_suppress_kinds(&["Bogus".to_string()]).is_err());
    }

    #[test]
    fn test_default_dot_file_is_a_safe_relative_name() {
        assert_eq!(default_dot_file("get_node_id"), "get_node_id.dot");
        assert_eq!(default_dot_file("Graph::get_node_id"), "Graph__get_node_id.dot");
        assert_eq!(default_dot_file("../x"), "___x.dot");
        assert!(validate_output_path(&default_dot_file("/etc/passwd")).is_ok());
    }

    #[test]
    fn test_check_docs_conflicts_with_reachability() {
        assert!(Cli::try_parse_from(["siglint", "--check-docs", "--reachable", "a"]).is_err());
        assert!(Cli::try_parse_from(["siglint", "--check-docs", "--deps", "a.json"]).is_err());
        assert!(Cli::try_parse_from(["siglint", "--check-docs", "--suppress", "MissingDocumentation"]).is_ok());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "siglint",
            "src",
            "--target-type",
            "Graph",
            "--suppress",
            "MissingExampleHeader",
            "MissingExampleCode",
            "--deps",
            "a.json",
            "b.json",
            "--reachable",
            "get_node_id",
        ]);
        assert_eq!(cli.path, "src");
        assert!(!cli.check_docs);
        assert_eq!(cli.suppress.len(), 2);
        assert_eq!(cli.deps, vec!["a.json", "b.json"]);
        assert_eq!(cli.reachable.as_deref(), Some("get_node_id"));
    }
}
