//! Multi-file parsing over a source corpus.
//!
//! Files are read and parsed in parallel with Rayon; results are merged
//! sequentially in input order so the output never depends on scheduling.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::fn_parser::{parse_source, ParseOutcome};
use crate::error::{IoResultExt, SiglintResult};

/// One source file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as reported in records and diagnostics
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Reads a file from disk. Line endings are kept as-is.
    pub fn read(path: &Path) -> SiglintResult<Self> {
        let text = fs::read_to_string(path).with_path(path)?;
        Ok(Self {
            path: path.to_string_lossy().replace('\\', "/"),
            text,
        })
    }
}

/// Reads all files in parallel, keeping the order of `paths`.
///
/// Fails on the first unreadable file.
pub fn read_sources(paths: &[PathBuf]) -> SiglintResult<Vec<SourceFile>> {
    paths
        .par_iter()
        .map(|path| SourceFile::read(path))
        .collect()
}

/// Parses every source, merging records and diagnostics in input order.
pub fn parse_sources(sources: &[SourceFile]) -> ParseOutcome {
    let per_file: Vec<ParseOutcome> = sources
        .par_iter()
        .map(|src| parse_source(&src.path, &src.text))
        .collect();

    let mut merged = ParseOutcome::default();
    for outcome in per_file {
        merged.extend(outcome);
    }

    info!(
        files = sources.len(),
        records = merged.records.len(),
        diagnostics = merged.diagnostics.len(),
        "corpus parsed"
    );
    merged
}

/// SHA-256 over `(path, text)` of every source, in order.
///
/// Artifacts embed this digest so a rerun on the same corpus is recognisable.
pub fn corpus_digest(sources: &[SourceFile]) -> String {
    let mut sha = Sha256::new();
    for src in sources {
        sha.update(src.path.as_bytes());
        sha.update([0u8]);
        sha.update(src.text.as_bytes());
        sha.update([0u8]);
    }
    let digest = format!("{:x}", sha.finalize());
    debug!(files = sources.len(), digest = %digest, "corpus digest");
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<SourceFile> {
        vec![
            SourceFile::new("a.rs", "fn a1() {}\nfn a2() {}\n"),
            SourceFile::new("b.rs", "fn b1(x: u8 {}\nfn b2() {}\n"),
            SourceFile::new("c.rs", "impl G { pub fn c1(&self) {} }\n"),
        ]
    }

    #[test]
    fn test_parse_sources_keeps_input_order() {
        let out = parse_sources(&corpus());
        let names: Vec<&str> = out.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2", "b2", "c1"]);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].file, "b.rs");
    }

    #[test]
    fn test_parse_sources_is_deterministic() {
        let sources = corpus();
        assert_eq!(parse_sources(&sources), parse_sources(&sources));
    }

    #[test]
    fn test_corpus_digest() {
        let sources = corpus();
        let digest = corpus_digest(&sources);
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, corpus_digest(&sources));

        let mut changed = sources.clone();
        changed[0].text.push_str("fn a3() {}\n");
        assert_ne!(digest, corpus_digest(&changed));

        // Moving text between files changes the digest
        let split = vec![
            SourceFile::new("a.rs", "fn x() {}"),
            SourceFile::new("b.rs", ""),
        ];
        let joined = vec![
            SourceFile::new("a.rs", ""),
            SourceFile::new("b.rs", "fn x() {}"),
        ];
        assert_ne!(corpus_digest(&split), corpus_digest(&joined));
    }

    #[test]
    fn test_read_sources_missing_file() {
        let missing = std::env::temp_dir().join("siglint_corpus_missing_xyz.rs");
        let err = read_sources(&[missing]).unwrap_err();
        assert_eq!(err.kind_name(), "Io");
    }
}
