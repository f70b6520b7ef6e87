//! Output formatting - plaintext and JSON.
//!
//! Each report is built as a `String` (so it can be tested) and printed by a
//! thin `print_*` wrapper. Stdout only; logs go to stderr.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;

use crate::doc::DocCheckReport;
use crate::signature::{Diagnostic, ParseOutcome};

/// Parse summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ParseSummary<'a> {
    pub files: usize,
    pub records: usize,
    pub methods: usize,
    pub public: usize,
    pub documented: usize,
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> ParseSummary<'a> {
    pub fn new(files: usize, outcome: &'a ParseOutcome) -> Self {
        Self {
            files,
            records: outcome.records.len(),
            methods: outcome.records.iter().filter(|r| r.is_method()).count(),
            public: outcome.records.iter().filter(|r| r.is_public()).count(),
            documented: outcome
                .records
                .iter()
                .filter(|r| !r.doc_lines.is_empty())
                .count(),
            diagnostics: &outcome.diagnostics,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

pub fn format_summary_plain(summary: &ParseSummary<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Parsed {} files: {} functions ({} methods, {} public, {} documented)",
        summary.files, summary.records, summary.methods, summary.public, summary.documented
    );
    if summary.diagnostics.is_empty() {
        let _ = writeln!(out, "No parse diagnostics.");
    } else {
        let _ = writeln!(out, "DIAGNOSTICS ({}):", summary.diagnostics.len());
        for d in summary.diagnostics {
            let _ = writeln!(out, "- {}:{} [{}] {}", d.file, d.line, d.kind, d.message);
        }
    }
    out
}

pub fn print_summary(summary: &ParseSummary<'_>, json: bool) {
    if json {
        println!("{}", to_json(summary));
    } else {
        print!("{}", format_summary_plain(summary));
    }
}

pub fn format_doc_report_plain(report: &DocCheckReport) -> String {
    let mut out = String::new();
    if report.is_clean() {
        let _ = writeln!(
            out,
            "All {} public methods of {} are documented.",
            report.checked, report.target_type
        );
        return out;
    }

    let _ = writeln!(
        out,
        "DOC FINDINGS for {} ({} functions, {} findings):",
        report.target_type,
        report.findings.len(),
        report.total_findings()
    );
    for (name, findings) in &report.findings {
        match report.signatures.get(name) {
            Some(sig) => {
                let _ = writeln!(out, "- {}::{}  `{}`", report.target_type, name, sig);
            }
            None => {
                let _ = writeln!(out, "- {}::{}", report.target_type, name);
            }
        }
        for finding in findings {
            let _ = writeln!(out, "    {}: {}", finding.kind_name(), finding.describe());
        }
    }
    if !report.unparsed.is_empty() {
        let _ = writeln!(out, "UNPARSED ITEMS of {} ({}):", report.target_type, report.unparsed.len());
        for d in &report.unparsed {
            let _ = writeln!(out, "- {}:{} [{}] {}", d.file, d.line, d.kind, d.message);
        }
    }
    if report.suppressed > 0 {
        let _ = writeln!(out, "({} findings suppressed)", report.suppressed);
    }
    out
}

pub fn print_doc_report(report: &DocCheckReport, json: bool) {
    if json {
        println!("{}", to_json(report));
    } else {
        print!("{}", format_doc_report_plain(report));
    }
}

#[derive(Serialize)]
struct ReachableJson<'a> {
    start: &'a str,
    reachable: &'a BTreeSet<String>,
}

pub fn format_reachable_plain(start: &str, reachable: &BTreeSet<String>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "REACHABLE FROM {} ({}):", start, reachable.len());
    for method in reachable {
        let _ = writeln!(out, "- {}", method);
    }
    out
}

pub fn print_reachable(start: &str, reachable: &BTreeSet<String>, json: bool) {
    if json {
        println!("{}", to_json(&ReachableJson { start, reachable }));
    } else {
        print!("{}", format_reachable_plain(start, reachable));
    }
}
