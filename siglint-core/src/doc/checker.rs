//! Documentation coverage rules for the public methods of one type.
//!
//! Rules, per public method of the target type:
//! - no doc at all → `MissingDocumentation` (nothing else is checked)
//! - no text before the first header → `MissingDescription`
//! - no `# Example` → `MissingExampleHeader`; no fenced code under it →
//!   `MissingExampleCode`; code that never mentions the method →
//!   `MethodNotInExample`
//! - non-self parameters but no `# Arguments` → `MissingArgumentsHeader`
//! - each non-self parameter without an entry → `MissingArgumentDoc(name)`
//! - a parameter entry with nothing after the colon → `EmptyArgumentDescription(name)`
//! - unparsable bullet under `# Arguments` → `MalformedArgumentEntry(line)`
//! - `unsafe fn` without `# Safety` → `MissingSafetySection`
//! - `Result` return without `# Raises` → `MissingRaisesSection`
//!
//! Documented entries that match no parameter are not reported. Items of the
//! target type that failed to parse are listed in [`DocCheckReport::unparsed`]
//! and fail the check as well.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, warn};

use super::sections::ParsedDoc;
use crate::signature::{Diagnostic, FunctionRecord, ParseOutcome};

/// One documentation problem of one function.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum Finding {
    MissingDocumentation,
    MissingDescription,
    MissingExampleHeader,
    MissingExampleCode,
    MethodNotInExample,
    MissingArgumentsHeader,
    MissingArgumentDoc(String),
    EmptyArgumentDescription(String),
    MalformedArgumentEntry(String),
    MissingSafetySection,
    MissingRaisesSection,
}

impl Finding {
    /// All kind names, as accepted by suppression lists.
    pub const KINDS: &'static [&'static str] = &[
        "MissingDocumentation",
        "MissingDescription",
        "MissingExampleHeader",
        "MissingExampleCode",
        "MethodNotInExample",
        "MissingArgumentsHeader",
        "MissingArgumentDoc",
        "EmptyArgumentDescription",
        "MalformedArgumentEntry",
        "MissingSafetySection",
        "MissingRaisesSection",
    ];

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::MissingDocumentation => "MissingDocumentation",
            Self::MissingDescription => "MissingDescription",
            Self::MissingExampleHeader => "MissingExampleHeader",
            Self::MissingExampleCode => "MissingExampleCode",
            Self::MethodNotInExample => "MethodNotInExample",
            Self::MissingArgumentsHeader => "MissingArgumentsHeader",
            Self::MissingArgumentDoc(_) => "MissingArgumentDoc",
            Self::EmptyArgumentDescription(_) => "EmptyArgumentDescription",
            Self::MalformedArgumentEntry(_) => "MalformedArgumentEntry",
            Self::MissingSafetySection => "MissingSafetySection",
            Self::MissingRaisesSection => "MissingRaisesSection",
        }
    }

    pub fn is_kind_name(name: &str) -> bool {
        Self::KINDS.contains(&name)
    }

    /// Human-readable one-liner.
    pub fn describe(&self) -> String {
        match self {
            Self::MissingDocumentation => "no documentation".to_string(),
            Self::MissingDescription => "no description before the first section".to_string(),
            Self::MissingExampleHeader => "missing '# Example' section".to_string(),
            Self::MissingExampleCode => "'# Example' has no code block".to_string(),
            Self::MethodNotInExample => "example code does not call the method".to_string(),
            Self::MissingArgumentsHeader => "missing '# Arguments' section".to_string(),
            Self::MissingArgumentDoc(name) => format!("argument '{}' is not documented", name),
            Self::EmptyArgumentDescription(name) => {
                format!("argument '{}' has an empty description", name)
            }
            Self::MalformedArgumentEntry(line) => format!("cannot parse argument entry '{}'", line),
            Self::MissingSafetySection => "unsafe fn without '# Safety' section".to_string(),
            Self::MissingRaisesSection => "returns Result without '# Raises' section".to_string(),
        }
    }
}

/// Result of checking a record list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocCheckReport {
    pub target_type: String,
    /// Function name → findings; functions without findings are absent
    pub findings: BTreeMap<String, Vec<Finding>>,
    /// Number of records the rules were applied to
    pub checked: usize,
    /// Number of findings removed by suppression
    pub suppressed: usize,
    /// Parse diagnostics of items owned by the target type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unparsed: Vec<Diagnostic>,
    /// Signature line of every function with findings
    #[serde(skip)]
    pub signatures: BTreeMap<String, String>,
}

impl DocCheckReport {
    /// No findings and no unparsed items of the target type.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.unparsed.is_empty()
    }

    pub fn total_findings(&self) -> usize {
        self.findings.values().map(Vec::len).sum()
    }

    /// 0 when clean, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }
}

/// Coverage checker for the public methods of `target_type`.
#[derive(Debug, Clone)]
pub struct DocChecker {
    target_type: String,
    suppressed: BTreeSet<String>,
    ignored: BTreeSet<String>,
}

impl DocChecker {
    pub fn new(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            suppressed: BTreeSet::new(),
            ignored: BTreeSet::new(),
        }
    }

    /// Finding kinds (by name) to drop from the result.
    pub fn with_suppressed<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suppressed.extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Function names to skip entirely.
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether `record` is subject to the rules.
    pub fn applies_to(&self, record: &FunctionRecord) -> bool {
        record.is_public()
            && record.owning_struct.as_deref() == Some(self.target_type.as_str())
            && !self.ignored.contains(&record.name)
    }

    /// All findings for one record, before suppression.
    pub fn check_record(&self, record: &FunctionRecord) -> Vec<Finding> {
        let doc = ParsedDoc::parse(&record.doc_lines);
        if doc.is_empty() {
            return vec![Finding::MissingDocumentation];
        }

        let mut findings = Vec::new();

        if !doc.has_description() {
            findings.push(Finding::MissingDescription);
        }

        match doc.example() {
            None => findings.push(Finding::MissingExampleHeader),
            Some(section) if !section.has_code() => findings.push(Finding::MissingExampleCode),
            Some(section) => {
                if !section.code().contains(&record.name) {
                    findings.push(Finding::MethodNotInExample);
                }
            }
        }

        let params: Vec<&str> = record.non_self_parameters().collect();
        if !params.is_empty() {
            if doc.section("Arguments").is_none() {
                findings.push(Finding::MissingArgumentsHeader);
            }
            let (entries, malformed) = doc.argument_entries();
            let documented: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
            findings.extend(
                params
                    .iter()
                    .filter(|p| !documented.contains(*p))
                    .map(|p| Finding::MissingArgumentDoc(p.to_string())),
            );
            findings.extend(
                entries
                    .iter()
                    .filter(|e| e.description.is_empty() && params.contains(&e.name.as_str()))
                    .map(|e| Finding::EmptyArgumentDescription(e.name.clone())),
            );
            findings.extend(malformed.into_iter().map(Finding::MalformedArgumentEntry));
        }

        if record.is_unsafe() && doc.section("Safety").is_none() {
            findings.push(Finding::MissingSafetySection);
        }

        if record.returns_result() && doc.section("Raises").is_none() {
            findings.push(Finding::MissingRaisesSection);
        }

        findings
    }

    /// Applies the rules to every eligible record.
    pub fn check(&self, records: &[FunctionRecord]) -> DocCheckReport {
        let mut report = DocCheckReport {
            target_type: self.target_type.clone(),
            ..DocCheckReport::default()
        };

        for record in records.iter().filter(|r| self.applies_to(r)) {
            report.checked += 1;
            let all = self.check_record(record);
            let before = all.len();
            let kept: Vec<Finding> = all
                .into_iter()
                .filter(|f| !self.suppressed.contains(f.kind_name()))
                .collect();
            report.suppressed += before - kept.len();

            debug!(
                method = %record.qualified_name(),
                findings = kept.len(),
                "checked documentation"
            );
            if !kept.is_empty() {
                report
                    .signatures
                    .entry(record.name.clone())
                    .or_insert_with(|| record.signature());
                report
                    .findings
                    .entry(record.name.clone())
                    .or_default()
                    .extend(kept);
            }
        }

        info!(
            target_type = %self.target_type,
            checked = report.checked,
            with_findings = report.findings.len(),
            suppressed = report.suppressed,
            "documentation check complete"
        );
        report
    }

    /// [`check`](Self::check) plus the parse diagnostics owned by the target type.
    pub fn check_outcome(&self, outcome: &ParseOutcome) -> DocCheckReport {
        let mut report = self.check(&outcome.records);
        report.unparsed = outcome
            .diagnostics
            .iter()
            .filter(|d| d.owner.as_deref() == Some(self.target_type.as_str()))
            .cloned()
            .collect();
        if !report.unparsed.is_empty() {
            warn!(
                target_type = %self.target_type,
                unparsed = report.unparsed.len(),
                "items of the target type could not be parsed"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::parse_source;

    fn records(text: &str) -> Vec<FunctionRecord> {
        let out = parse_source("graph.rs", text);
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        out.records
    }

    const FULL_DOC: &str = r#"
impl Graph {
    /// Returns the edge id between two nodes.
    ///
    /// # Arguments
    /// * `src`: Source node.
    /// * `dst`: Destination node.
    /// * `extra`: Not a parameter.
    ///
    /// # Example
    /// ```rust
    /// let id = graph.get_edge_id(0, 1);
    /// ```
    pub fn get_edge_id(&self, src: NodeT, dst: NodeT) -> EdgeT { 0 }
}
"#;

    #[test]
    fn test_fully_documented_method_is_clean() {
        let report = DocChecker::new("Graph").check(&records(FULL_DOC));
        assert_eq!(report.checked, 1);
        assert!(report.is_clean(), "{:?}", report.findings);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_one_of_two_arguments_documented() {
        let text = r#"
impl Graph {
    /// Adds an edge.
    ///
    /// # Arguments
    /// * `src`: Source node.
    ///
    /// # Example
    /// ```
    /// graph.add_edge(0, 1);
    /// ```
    pub fn add_edge(&mut self, src: NodeT, dst: NodeT) {}
}
"#;
        let report = DocChecker::new("Graph").check(&records(text));
        assert_eq!(
            report.findings["add_edge"],
            vec![Finding::MissingArgumentDoc("dst".to_string())]
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_undocumented_method() {
        let text = "impl Graph {\n    pub fn len(&self) -> usize { 0 }\n}\n";
        let report = DocChecker::new("Graph").check(&records(text));
        assert_eq!(report.findings["len"], vec![Finding::MissingDocumentation]);
    }

    #[test]
    fn test_missing_sections() {
        let text = r#"
impl Graph {
    /// # Example
    /// ```
    /// let x = 1;
    /// ```
    pub unsafe fn get_unchecked(&self, id: NodeT) -> NodeT { id }
}
"#;
        let report = DocChecker::new("Graph").check(&records(text));
        assert_eq!(
            report.findings["get_unchecked"],
            vec![
                Finding::MissingDescription,
                Finding::MethodNotInExample,
                Finding::MissingArgumentsHeader,
                Finding::MissingArgumentDoc("id".to_string()),
                Finding::MissingSafetySection,
            ]
        );
    }

    #[test]
    fn test_example_without_code_and_no_args_needed() {
        let text = r#"
impl Graph {
    /// Node count.
    ///
    /// # Example
    /// Call it.
    pub fn get_nodes_number(&self) -> NodeT { 0 }
}
"#;
        let report = DocChecker::new("Graph").check(&records(text));
        assert_eq!(
            report.findings["get_nodes_number"],
            vec![Finding::MissingExampleCode]
        );
    }

    #[test]
    fn test_scope_filters() {
        let text = r#"
impl Graph {
    fn private_helper(&self, x: u8) {}
    pub(crate) fn crate_only(&self) {}
    pub fn ignored(&self) {}
}
impl Other {
    pub fn elsewhere(&self) {}
}
pub fn free_function() {}
"#;
        let report = DocChecker::new("Graph")
            .with_ignored(["ignored"])
            .check(&records(text));
        assert_eq!(report.checked, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_suppression_drops_empty_entries() {
        let text = "impl Graph {\n    pub fn len(&self) -> usize { 0 }\n}\n";
        let report = DocChecker::new("Graph")
            .with_suppressed(["MissingDocumentation"])
            .check(&records(text));
        assert!(report.is_clean());
        assert_eq!(report.suppressed, 1);
        assert_eq!(report.checked, 1);
    }

    #[test]
    fn test_malformed_argument_entry() {
        let text = r#"
impl Graph {
    /// Renames.
    ///
    /// # Arguments
    /// * name - the new name
    ///
    /// # Example
    /// ```
    /// g.rename("x");
    /// ```
    pub fn rename(&mut self, name: &str) {}
}
"#;
        let report = DocChecker::new("Graph").check(&records(text));
        assert_eq!(
            report.findings["rename"],
            vec![
                Finding::MissingArgumentDoc("name".to_string()),
                Finding::MalformedArgumentEntry("* name - the new name".to_string()),
            ]
        );
    }

    #[test]
    fn test_result_return_needs_raises_section() {
        let text = r#"
impl Graph {
    /// Returns the node id of the given name.
    ///
    /// # Example
    /// ```
    /// let id = graph.node_id()?;
    /// ```
    pub fn node_id(&self) -> Result<u8, String> { Ok(0) }

    /// Returns the edge id.
    ///
    /// # Example
    /// ```
    /// let id = graph.edge_id()?;
    /// ```
    ///
    /// # Raises
    /// * If the graph has no edges.
    pub fn edge_id(&self) -> std::result::Result<u8, String> { Ok(0) }
}
"#;
        let report = DocChecker::new("Graph").check(&records(text));
        assert_eq!(
            report.findings["node_id"],
            vec![Finding::MissingRaisesSection]
        );
        assert!(!report.findings.contains_key("edge_id"));
        assert_eq!(
            report.signatures["node_id"],
            "pub fn node_id(&self) -> Result<u8, String>"
        );
    }

    #[test]
    fn test_empty_argument_description_counts_as_documented() {
        let text = r#"
impl Graph {
    /// Sets a weight.
    ///
    /// # Arguments
    /// * `x`:
    /// * `unused`:
    ///
    /// # Example
    /// ```
    /// graph.set(1);
    /// ```
    pub fn set(&mut self, x: u8) {}
}
"#;
        let report = DocChecker::new("Graph").check(&records(text));
        assert_eq!(
            report.findings["set"],
            vec![Finding::EmptyArgumentDescription("x".to_string())]
        );
    }

    #[test]
    fn test_unparsed_target_items_fail_the_check() {
        let text = "impl Graph {\n    pub fn a(&self) -> char { '{' }\n    pub fn b(&self) {}\n}\nimpl Other {\n    fn c(x u8) {}\n}\n";
        let outcome = parse_source("graph.rs", text);
        let report = DocChecker::new("Graph").check_outcome(&outcome);
        assert_eq!(report.checked, 0);
        assert!(report.findings.is_empty());
        assert_eq!(report.unparsed.len(), 1);
        assert_eq!(report.unparsed[0].kind, "UnmatchedDelimiter");
        assert!(!report.is_clean());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_unparsed_items_of_other_types_are_ignored() {
        let text = "impl Other {\n    fn c(x u8) {}\n}\n";
        let outcome = parse_source("graph.rs", text);
        assert_eq!(outcome.diagnostics.len(), 1);
        let report = DocChecker::new("Graph").check_outcome(&outcome);
        assert!(report.is_clean());
    }

    #[test]
    fn test_kind_names_are_complete() {
        let all = [
            Finding::MissingDocumentation,
            Finding::MissingDescription,
            Finding::MissingExampleHeader,
            Finding::MissingExampleCode,
            Finding::MethodNotInExample,
            Finding::MissingArgumentsHeader,
            Finding::MissingArgumentDoc(String::new()),
            Finding::EmptyArgumentDescription(String::new()),
            Finding::MalformedArgumentEntry(String::new()),
            Finding::MissingSafetySection,
            Finding::MissingRaisesSection,
        ];
        for f in &all {
            assert!(Finding::is_kind_name(f.kind_name()));
        }
        assert_eq!(all.len(), Finding::KINDS.len());
        assert!(!Finding::is_kind_name("NoSuchKind"));
    }

    #[test]
    fn test_finding_serializes_tagged() {
        let json = serde_json::to_string(&Finding::MissingArgumentDoc("dst".into())).unwrap();
        assert_eq!(json, r#"{"kind":"MissingArgumentDoc","detail":"dst"}"#);
        let json = serde_json::to_string(&Finding::MissingExampleHeader).unwrap();
        assert_eq!(json, r#"{"kind":"MissingExampleHeader"}"#);
    }
}
