//! Parallel, deterministic `.rs` file discovery with directory pruning.
//!
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel entry processing via Rayon's `par_bridge`
//! - Sorted output, so parse order and artifacts are stable across runs

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directories always excluded (standard Rust project conventions).
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", ".cargo"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

#[inline]
fn is_rs_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "rs")
}

/// Gathers all `.rs` files under `root`, sorted by path.
///
/// `root` may also be a single `.rs` file. Directories named in `excludes`
/// are pruned in addition to `target/`, `.git/`, `node_modules/` and `.cargo/`.
pub fn gather_rs_files(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return if is_rs_file(root) {
            Ok(vec![root.to_path_buf()])
        } else {
            Ok(Vec::new())
        };
    }

    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) if is_rs_file(e.path()) => Some(Ok(e.path().to_path_buf())),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather .rs files from {}", root.display()))?;

    // par_bridge yields in arbitrary order
    files.sort();
    debug!(root = %root.display(), files = files.len(), "gathered source files");
    Ok(files)
}
