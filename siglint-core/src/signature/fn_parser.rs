//! Function / impl-block recursive-descent parser.
//!
//! A single left-to-right pass per source text. Each `step` looks at the
//! leading token of the current line, consumes one item (or one line) and
//! returns the remaining input together with the updated [`ParseState`]:
//!
//! ```text
//! (remaining, state) = step(source, remaining, state)
//! ```
//!
//! Impl blocks are parsed by recursing into their balanced body with a fresh
//! state owned by the impl target; the nested results are merged back.
//!
//! Failure isolation: a malformed item becomes a [`Diagnostic`] and parsing
//! resumes after the item's balanced block, or on the next line when no block
//! can be found. A block that never closes runs to the end of the input, so
//! nothing inside a rejected item is re-read at the outer scope.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::delimiter::{
    scan_until_body, split_delimited, split_keyword_top_level, split_once_top_level,
    split_top_level,
};
use super::record::FunctionRecord;
use super::type_parser::{
    parse_identifier, parse_lifetime, parse_modifiers, parse_type, parse_type_str, strip_keyword,
};
use super::types::{Modifiers, Param, TypeExpr};
use crate::error::{SiglintError, SiglintResult};

/// A per-item parse failure that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    /// 1-based line where the failed item starts
    pub line: usize,
    /// Error kind name, e.g. "UnmatchedDelimiter"
    pub kind: String,
    pub message: String,
    /// Impl target the item belongs to, when it could be named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Records and diagnostics produced from one or more sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub records: Vec<FunctionRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// Append another outcome, keeping order.
    pub fn extend(&mut self, other: ParseOutcome) {
        self.records.extend(other.records);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Immutable view of the text being parsed, used for line numbers.
struct Source<'a> {
    file: &'a str,
    text: &'a str,
}

impl<'a> Source<'a> {
    /// 1-based line of `at`, which must be a sub-slice of `self.text`.
    fn line_of(&self, at: &str) -> usize {
        let offset = (at.as_ptr() as usize).saturating_sub(self.text.as_ptr() as usize);
        self.text
            .get(..offset)
            .map_or(0, |prefix| prefix.matches('\n').count())
            + 1
    }

    fn diagnostic(&self, at: &str, err: &SiglintError, owner: Option<String>) -> Diagnostic {
        Diagnostic {
            file: self.file.to_string(),
            line: self.line_of(at),
            kind: err.kind_name().to_string(),
            message: err.to_string(),
            owner,
        }
    }
}

/// Parser state threaded through every step.
#[derive(Debug, Default)]
struct ParseState {
    /// Impl target for records produced in this scope
    owner: Option<String>,
    /// `///` lines waiting for the next fn header
    pending_doc: Vec<String>,
    records: Vec<FunctionRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl ParseState {
    fn for_owner(owner: String) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    fn report(self, source: &Source<'_>, at: &str, err: SiglintError) -> Self {
        let owner = self.owner.clone();
        self.report_owned(source, at, err, owner)
    }

    fn report_owned(
        mut self,
        source: &Source<'_>,
        at: &str,
        err: SiglintError,
        owner: Option<String>,
    ) -> Self {
        let diagnostic = source.diagnostic(at, &err, owner);
        warn!(
            file = %diagnostic.file,
            line = diagnostic.line,
            kind = %diagnostic.kind,
            detail = %diagnostic.message,
            "skipping malformed item"
        );
        self.diagnostics.push(diagnostic);
        self
    }

    fn drop_orphan_doc(mut self, source: &Source<'_>, at: &str) -> Self {
        if !self.pending_doc.is_empty() {
            trace!(
                file = source.file,
                line = source.line_of(at),
                lines = self.pending_doc.len(),
                "discarding orphan doc block"
            );
            self.pending_doc.clear();
        }
        self
    }
}

/// Kind of item starting at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Fn,
    Impl,
    Trait,
    Use,
    Other,
}

/// Parses one source text into function records.
///
/// Never fails: malformed items are reported in `diagnostics`.
pub fn parse_source(file: &str, text: &str) -> ParseOutcome {
    let source = Source { file, text };
    let state = parse_items(&source, text, ParseState::default());
    let state = state.drop_orphan_doc(&source, &text[text.len()..]);

    debug!(
        file,
        records = state.records.len(),
        diagnostics = state.diagnostics.len(),
        "parsed source"
    );

    ParseOutcome {
        records: state.records,
        diagnostics: state.diagnostics,
    }
}

fn parse_items<'a>(source: &Source<'a>, input: &'a str, state: ParseState) -> ParseState {
    let mut rest = input;
    let mut state = state;
    while !rest.trim().is_empty() {
        let (next, next_state) = step(source, rest, state);
        rest = next;
        state = next_state;
    }
    state
}

/// Consumes one item or one line. Always makes progress.
fn step<'a>(source: &Source<'a>, input: &'a str, mut state: ParseState) -> (&'a str, ParseState) {
    let rest = input.trim_start();
    let line = rest.lines().next().unwrap_or_default();

    if let Some(doc) = line.strip_prefix("///") {
        if !doc.starts_with('/') {
            state.pending_doc.push(doc.trim_end_matches('\r').to_string());
            return (skip_line(rest), state);
        }
    }
    if line.starts_with("//") {
        return (skip_line(rest), state);
    }
    if line.starts_with("/*") {
        return (skip_block_comment(rest), state);
    }
    if rest.starts_with("#[") || rest.starts_with("#![") {
        return skip_attribute(source, rest, state);
    }

    match classify(rest) {
        ItemKind::Fn => parse_fn_item(source, rest, state),
        ItemKind::Impl => parse_impl_item(source, rest, state),
        ItemKind::Trait => {
            let state = state.drop_orphan_doc(source, rest);
            (skip_block(rest), state)
        }
        ItemKind::Use => {
            let after = match rest.find(';') {
                Some(idx) => &rest[idx + 1..],
                None => skip_line(rest),
            };
            (after, state)
        }
        ItemKind::Other => {
            trace!(file = source.file, line = source.line_of(rest), "skipping line");
            let state = state.drop_orphan_doc(source, rest);
            (skip_line(rest), state)
        }
    }
}

fn classify(input: &str) -> ItemKind {
    let rest = match strip_item_prefix(input) {
        Ok((_, _, rest)) => rest,
        Err(_) => return ItemKind::Other,
    };
    if strip_keyword(rest, "fn").is_some() {
        ItemKind::Fn
    } else if strip_keyword(rest, "impl").is_some() {
        ItemKind::Impl
    } else if strip_keyword(rest, "trait").is_some() {
        ItemKind::Trait
    } else if strip_keyword(rest, "use").is_some() {
        ItemKind::Use
    } else {
        ItemKind::Other
    }
}

fn skip_line(input: &str) -> &str {
    match input.find('\n') {
        Some(idx) => &input[idx + 1..],
        None => "",
    }
}

fn skip_block_comment(input: &str) -> &str {
    match input.find("*/") {
        Some(idx) => &input[idx + 2..],
        None => "",
    }
}

/// Skips `#[...]` / `#![...]`, which may span several lines. Keeps the doc buffer.
fn skip_attribute<'a>(source: &Source<'a>, input: &'a str, state: ParseState) -> (&'a str, ParseState) {
    let bracket = input.find('[').map_or(input, |idx| &input[idx..]);
    match split_delimited(bracket) {
        Ok((_, after)) => (after, state),
        Err(e) => (skip_line(input), state.report(source, input, e)),
    }
}

/// Skips an item up to and including its `{ ... }` block or `;`.
///
/// A block that is still open at the end of the input extends to the end.
/// Without a block or `;` only the first line is skipped.
fn skip_block(input: &str) -> &str {
    let (_, rest) = scan_until_body(input);
    let rest = match strip_keyword(rest, "where") {
        Some(r) => scan_until_body(r).1,
        None => rest,
    };
    if rest.starts_with('{') {
        return split_delimited(rest).map_or("", |(_, after)| after);
    }
    match rest.strip_prefix(';') {
        Some(after) => after,
        None => skip_line(input),
    }
}

/// Parses visibility and qualifier keywords in front of an item.
///
/// Returns `(visibility, qualifiers, rest)`.
fn strip_item_prefix(input: &str) -> SiglintResult<(String, Vec<String>, &str)> {
    let (visibility, mut rest) = parse_visibility(input)?;
    let mut qualifiers = Vec::new();

    loop {
        rest = rest.trim_start();
        if let Some(kw) = ["const", "async", "unsafe", "default"]
            .iter()
            .find(|kw| strip_keyword(rest, kw).is_some())
        {
            qualifiers.push(kw.to_string());
            rest = &rest[kw.len()..];
            continue;
        }
        if let Some(after) = strip_keyword(rest, "extern") {
            let after = after.trim_start();
            if let Some(abi_body) = after.strip_prefix('"') {
                let end = abi_body
                    .find('"')
                    .ok_or_else(|| SiglintError::malformed("unterminated extern ABI string"))?;
                qualifiers.push(format!("extern \"{}\"", &abi_body[..end]));
                rest = &abi_body[end + 1..];
            } else {
                qualifiers.push("extern".to_string());
                rest = after;
            }
            continue;
        }
        break;
    }

    Ok((visibility, qualifiers, rest))
}

fn parse_visibility(input: &str) -> SiglintResult<(String, &str)> {
    match strip_keyword(input, "pub") {
        None => Ok(("private".to_string(), input)),
        Some(rest) => {
            let trimmed = rest.trim_start();
            if trimmed.starts_with('(') {
                let (scope, rest) = split_delimited(trimmed)?;
                Ok((format!("pub({})", scope.trim()), rest))
            } else {
                Ok(("pub".to_string(), rest))
            }
        }
    }
}

fn parse_fn_item<'a>(source: &Source<'a>, input: &'a str, mut state: ParseState) -> (&'a str, ParseState) {
    let doc_lines = std::mem::take(&mut state.pending_doc);
    match parse_function(source, input, doc_lines, state.owner.clone()) {
        Ok((record, after)) => {
            trace!(name = %record.name, line = record.line, "parsed fn");
            state.records.push(record);
            (after, state)
        }
        Err(e) => (skip_block(input), state.report(source, input, e)),
    }
}

/// Parses one complete `fn` item starting at `input`.
fn parse_function<'a>(
    source: &Source<'a>,
    input: &'a str,
    doc_lines: Vec<String>,
    owning_struct: Option<String>,
) -> SiglintResult<(FunctionRecord, &'a str)> {
    let line = source.line_of(input);
    let (visibility, qualifiers, rest) = strip_item_prefix(input)?;
    let rest = strip_keyword(rest, "fn").ok_or_else(|| SiglintError::malformed("expected 'fn'"))?;
    let (name, rest) = parse_identifier(rest.trim_start())?;
    let mut rest = rest.trim_start();

    let mut generics = Vec::new();
    if rest.starts_with('<') {
        let (inner, r) = split_delimited(rest)?;
        generics = parse_generic_params(inner)?;
        rest = r.trim_start();
    }

    if !rest.starts_with('(') {
        return Err(SiglintError::malformed(format!(
            "expected '(' after fn {}",
            name
        )));
    }
    let (args, r) = split_delimited(rest)?;
    let parameters = parse_parameters(args)?;
    rest = r.trim_start();

    let mut return_type = None;
    if let Some(r) = rest.strip_prefix("->") {
        let (ret_text, r) = scan_until_body(r);
        return_type = Some(parse_type_str(ret_text)?);
        rest = r.trim_start();
    }

    if let Some(r) = strip_keyword(rest, "where") {
        rest = scan_until_body(r).1.trim_start();
    }

    if !rest.starts_with('{') {
        return Err(SiglintError::malformed(format!("fn {} has no body", name)));
    }
    let (body, after) = split_delimited(rest)?;

    let record = FunctionRecord {
        name: name.to_string(),
        visibility,
        qualifiers,
        generics,
        parameters,
        return_type,
        doc_lines,
        body: body.to_string(),
        owning_struct,
        file: source.file.to_string(),
        line,
    };
    Ok((record, after))
}

/// Names of `<...>` parameters: `'a`, `T`, `const N` → `N`. Bounds and defaults dropped.
fn parse_generic_params(inner: &str) -> SiglintResult<Vec<String>> {
    split_top_level(inner, ',')
        .into_iter()
        .map(|piece| {
            if piece.starts_with('\'') {
                parse_lifetime(piece).map(|(lifetime, _)| lifetime)
            } else {
                let piece = strip_keyword(piece, "const").map_or(piece, str::trim_start);
                parse_identifier(piece).map(|(ident, _)| ident.to_string())
            }
        })
        .collect()
}

/// Parses a parameter list (the text inside the parentheses).
///
/// An optional `self` receiver is split off at the first top-level comma;
/// the remainder is consumed one `name: Type` at a time, with the separating
/// comma consumed explicitly.
pub fn parse_parameters(args: &str) -> SiglintResult<Vec<Param>> {
    let mut params = Vec::new();

    let (first, remainder) = split_once_top_level(args, ',');
    let mut rest = match parse_receiver(first)? {
        Some(modifiers) => {
            params.push(Param::Receiver { modifiers });
            remainder.unwrap_or("")
        }
        None => args,
    };

    loop {
        let s = rest.trim_start();
        if s.is_empty() {
            break;
        }
        let s = strip_keyword(s, "mut").map_or(s, str::trim_start);
        let (name, r) = parse_identifier(s).map_err(|_| {
            SiglintError::malformed_args(format!(
                "expected a parameter name at '{}'",
                s.lines().next().unwrap_or_default()
            ))
        })?;
        let r = r.trim_start();
        if r.starts_with("::") {
            return Err(SiglintError::malformed_args(format!(
                "expected ':' after parameter '{}', found a path",
                name
            )));
        }
        let r = r.strip_prefix(':').ok_or_else(|| {
            SiglintError::malformed_args(format!("expected ':' after parameter '{}'", name))
        })?;
        let (ty, r) = parse_type(r)?;
        params.push(Param::Typed {
            name: name.to_string(),
            ty,
        });

        let r = r.trim_start();
        if r.is_empty() {
            break;
        }
        rest = r.strip_prefix(',').ok_or_else(|| {
            SiglintError::malformed_args(format!(
                "expected ',' after parameter '{}', found '{}'",
                name,
                r.lines().next().unwrap_or_default()
            ))
        })?;
    }

    Ok(params)
}

/// `Some(modifiers)` if `first` is a `self` receiver (`self`, `&'a mut self`,
/// `self: Box<Self>`), `None` otherwise.
fn parse_receiver(first: &str) -> SiglintResult<Option<Modifiers>> {
    let (modifiers, rest) = match parse_modifiers(first) {
        Ok(parsed) => parsed,
        Err(_) => return Ok(None),
    };
    match strip_keyword(rest, "self") {
        Some(after) => {
            let after = after.trim();
            if after.is_empty() {
                Ok(Some(modifiers))
            } else if let Some(ty) = after.strip_prefix(':') {
                parse_type_str(ty)?;
                Ok(Some(modifiers))
            } else {
                Err(SiglintError::malformed_args(format!(
                    "unexpected '{}' after self receiver",
                    after
                )))
            }
        }
        None => Ok(None),
    }
}

fn parse_impl_item<'a>(source: &Source<'a>, input: &'a str, state: ParseState) -> (&'a str, ParseState) {
    let mut state = state.drop_orphan_doc(source, input);
    let (owner, block) = match parse_impl_header(input) {
        Ok(header) => header,
        Err(e) => return (skip_block(input), state.report(source, input, e)),
    };
    match split_delimited(block) {
        Ok((inner, after)) => {
            debug!(file = source.file, owner = %owner, "entering impl block");
            let nested = parse_items(source, inner, ParseState::for_owner(owner));
            let nested = nested.drop_orphan_doc(source, after);
            state.records.extend(nested.records);
            state.diagnostics.extend(nested.diagnostics);
            (after, state)
        }
        Err(e) => (skip_block(input), state.report_owned(source, input, e, Some(owner))),
    }
}

/// Parses `impl[<..>] [Trait for] Type [where ..]` and returns the owner
/// name and the text starting at the block's `{`.
fn parse_impl_header(input: &str) -> SiglintResult<(String, &str)> {
    let (_, _, rest) = strip_item_prefix(input)?;
    let rest = strip_keyword(rest, "impl")
        .ok_or_else(|| SiglintError::malformed("expected 'impl'"))?
        .trim_start();
    let rest = if rest.starts_with('<') {
        split_delimited(rest)?.1
    } else {
        rest
    };

    let (header, rest) = scan_until_body(rest);
    let mut rest = rest.trim_start();
    if let Some(r) = strip_keyword(rest, "where") {
        rest = scan_until_body(r).1.trim_start();
    }
    if !rest.starts_with('{') {
        return Err(SiglintError::malformed("impl block has no body"));
    }

    let target = match split_keyword_top_level(header, "for") {
        Some((_, target)) => target,
        None => header,
    };
    let ty = parse_type_str(target)?;
    let owner = owner_name(&ty).ok_or_else(|| {
        SiglintError::malformed(format!("cannot name impl target '{}'", target.trim()))
    })?;

    Ok((owner, rest))
}

/// Last path segment of the impl target, generics stripped.
fn owner_name(ty: &TypeExpr) -> Option<String> {
    match ty {
        TypeExpr::Named { name, .. } => name.rsplit("::").next().map(str::to_string),
        TypeExpr::Reference { inner, .. } => owner_name(inner),
        _ => None,
    }
}
