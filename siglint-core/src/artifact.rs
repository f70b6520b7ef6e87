//! JSON artifacts written between runs.
//!
//! Two documents:
//! - record artifact `{ "digest", "records" }`, reloadable into an equal list
//! - doc-finding artifact `{ "digest", "target_type", "findings", "unparsed"? }`
//!
//! Both are written with the temp-file + rename pattern so a reader never
//! sees a partially written file.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::doc::{DocCheckReport, Finding};
use crate::error::{IoResultExt, SiglintError, SiglintResult};
use crate::signature::{Diagnostic, FunctionRecord};

/// Upper bound for artifacts we are willing to load (100MB).
const MAX_ARTIFACT_BYTES: u64 = 100_000_000;

/// Parsed records of a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsArtifact {
    pub digest: String,
    pub records: Vec<FunctionRecord>,
}

/// Documentation findings of one check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocArtifact {
    pub digest: String,
    pub target_type: String,
    pub findings: BTreeMap<String, Vec<Finding>>,
    /// Target-type items that could not be parsed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unparsed: Vec<Diagnostic>,
}

impl DocArtifact {
    pub fn from_report(digest: impl Into<String>, report: &DocCheckReport) -> Self {
        Self {
            digest: digest.into(),
            target_type: report.target_type.clone(),
            findings: report.findings.clone(),
            unparsed: report.unparsed.clone(),
        }
    }
}

/// Writes `contents` to `path` atomically (temp file in the same directory, then rename).
pub fn write_atomic(path: &Path, contents: &str) -> SiglintResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).with_path(dir)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| SiglintError::artifact(path, "path has no file name"))?
        .to_string_lossy();
    // PID + nanos keeps concurrent writers from sharing a temp file
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = dir.join(format!(".{}.{}.{}.tmp", file_name, std::process::id(), nanos));

    fs::write(&temp_path, contents).with_path(&temp_path)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(SiglintError::io(path, e));
    }
    Ok(())
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> SiglintResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SiglintError::artifact(path, e.to_string()))?;
    write_atomic(path, &json)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> SiglintResult<T> {
    let size = fs::metadata(path).with_path(path)?.len();
    if size > MAX_ARTIFACT_BYTES {
        return Err(SiglintError::artifact(
            path,
            format!("artifact is {} bytes, limit is {}", size, MAX_ARTIFACT_BYTES),
        ));
    }
    let text = fs::read_to_string(path).with_path(path)?;
    serde_json::from_str(&text).map_err(|e| SiglintError::artifact(path, e.to_string()))
}

pub fn save_records(path: &Path, artifact: &RecordsArtifact) -> SiglintResult<()> {
    save_json(path, artifact)?;
    info!(path = %path.display(), records = artifact.records.len(), "wrote record artifact");
    Ok(())
}

pub fn load_records(path: &Path) -> SiglintResult<RecordsArtifact> {
    load_json(path)
}

pub fn save_doc_artifact(path: &Path, artifact: &DocArtifact) -> SiglintResult<()> {
    save_json(path, artifact)?;
    info!(
        path = %path.display(),
        functions = artifact.findings.len(),
        "wrote doc-finding artifact"
    );
    Ok(())
}

pub fn load_doc_artifact(path: &Path) -> SiglintResult<DocArtifact> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::parse_source;
    use std::path::PathBuf;

    fn create_temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("siglint_artifact_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_records_round_trip() {
        let dir = create_temp_dir("records");
        let path = dir.join("records.json");
        let out = parse_source(
            "src/graph.rs",
            "impl Graph {\n/// Doc.\npub fn f<'a, T>(&'a mut self, x: &[Option<T>], cb: impl Fn(u8) -> bool) -> Result<(), String> { Ok(()) }\n}\n",
        );
        let artifact = RecordsArtifact {
            digest: "abc".to_string(),
            records: out.records,
        };

        save_records(&path, &artifact).unwrap();
        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, artifact);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_doc_artifact_round_trip() {
        let dir = create_temp_dir("doc");
        let path = dir.join("nested").join("doc_findings.json");
        let mut findings = BTreeMap::new();
        findings.insert(
            "add_edge".to_string(),
            vec![Finding::MissingArgumentDoc("dst".to_string())],
        );
        let artifact = DocArtifact {
            digest: "d".to_string(),
            target_type: "Graph".to_string(),
            findings,
            unparsed: Vec::new(),
        };

        save_doc_artifact(&path, &artifact).unwrap();
        assert_eq!(load_doc_artifact(&path).unwrap(), artifact);

        // No temp files left behind
        let leftovers = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .map(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(leftovers, 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_corrupt_artifact() {
        let dir = create_temp_dir("corrupt");
        let path = dir.join("records.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, SiglintError::Artifact { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = load_records(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SiglintError::Io { .. }));
    }
}
