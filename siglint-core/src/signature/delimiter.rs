//! Balanced-delimiter scanning over raw source text.
//!
//! Delimiters inside string/char literals and comments are NOT special-cased.
//! This is fine for signatures, which do not contain such literals; bodies
//! with an unbalanced brace inside a literal will mis-scan.

use crate::error::{SiglintError, SiglintResult};

/// Matching closer for one of `( [ { <`.
#[inline]
pub fn closing_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        _ => None,
    }
}

#[inline]
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits `input`, which must start with an opening delimiter, into the span
/// strictly inside the outer pair and the text after the closer.
///
/// In angle spans the `>` of an `->` arrow is not a closer, so
/// `<dyn Fn(u32) -> bool>` is scanned whole.
///
/// # Errors
/// - `UnmatchedDelimiter` if input ends while depth > 0
/// - `MalformedSignature` if `input` does not start with an opener
pub fn split_delimited(input: &str) -> SiglintResult<(&str, &str)> {
    let mut chars = input.char_indices();
    let open = match chars.next() {
        Some((_, c)) => c,
        None => {
            return Err(SiglintError::malformed(
                "expected an opening delimiter, found end of input",
            ))
        }
    };
    let close = closing_for(open).ok_or_else(|| {
        SiglintError::malformed(format!("expected an opening delimiter, found '{}'", open))
    })?;

    let mut depth = 1usize;
    let mut prev = open;
    for (idx, c) in chars {
        if c == open {
            depth += 1;
        } else if c == close && !(open == '<' && prev == '-') {
            depth -= 1;
            if depth == 0 {
                return Ok((&input[open.len_utf8()..idx], &input[idx + c.len_utf8()..]));
            }
        }
        prev = c;
    }

    Err(SiglintError::unmatched(open, depth))
}

/// Tracks nesting across all four delimiter kinds while walking a string.
#[derive(Debug, Default)]
struct DepthTracker {
    depth: usize,
    prev: char,
}

impl DepthTracker {
    /// Feed one character; returns the depth *before* it was applied.
    fn feed(&mut self, c: char) -> usize {
        let before = self.depth;
        match c {
            '(' | '[' | '{' | '<' => self.depth += 1,
            '>' if self.prev == '-' => {}
            ')' | ']' | '}' | '>' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.prev = c;
        before
    }
}

/// Splits on `sep` at nesting depth zero. Pieces are trimmed and empty
/// pieces (e.g. after a trailing comma) are dropped.
pub fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut tracker = DepthTracker::default();
    let mut start = 0;

    for (idx, c) in input.char_indices() {
        let depth = tracker.feed(c);
        if c == sep && depth == 0 {
            pieces.push(input[start..idx].trim());
            start = idx + c.len_utf8();
        }
    }
    pieces.push(input[start..].trim());

    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Splits at the first top-level `sep`: `(before, Some(after))`, or
/// `(input, None)` when there is none.
pub fn split_once_top_level(input: &str, sep: char) -> (&str, Option<&str>) {
    let mut tracker = DepthTracker::default();
    for (idx, c) in input.char_indices() {
        if tracker.feed(c) == 0 && c == sep {
            return (&input[..idx], Some(&input[idx + c.len_utf8()..]));
        }
    }
    (input, None)
}

/// Whether `input[idx..]` starts with the keyword `kw` on word boundaries.
fn keyword_at(input: &str, idx: usize, kw: &str) -> bool {
    let rest = &input[idx..];
    if !rest.starts_with(kw) {
        return false;
    }
    let before_ok = input[..idx].chars().next_back().map_or(true, |c| !is_ident_char(c));
    let after_ok = rest[kw.len()..].chars().next().map_or(true, |c| !is_ident_char(c));
    before_ok && after_ok
}

/// Splits at the first top-level occurrence of keyword `kw` followed by
/// whitespace, e.g. the `for` of `Trait<T> for Graph`.
pub fn split_keyword_top_level<'a>(input: &'a str, kw: &str) -> Option<(&'a str, &'a str)> {
    let mut tracker = DepthTracker::default();
    for (idx, c) in input.char_indices() {
        if tracker.feed(c) == 0
            && keyword_at(input, idx, kw)
            && input[idx + kw.len()..].starts_with(char::is_whitespace)
        {
            return Some((&input[..idx], &input[idx + kw.len()..]));
        }
    }
    None
}

/// Scans a signature tail up to the start of a body.
///
/// Stops at a top-level `{`, `;` or `where` keyword and returns
/// `(scanned, rest)` where `rest` begins at the stop token. Parentheses,
/// brackets and angle brackets are balanced so a generic return type such as
/// `Result<Vec<NodeT>, String>` is captured whole.
pub fn scan_until_body(input: &str) -> (&str, &str) {
    let mut depth = 0usize;
    let mut prev = ' ';
    for (idx, c) in input.char_indices() {
        if depth == 0 && (c == '{' || c == ';' || (c == 'w' && keyword_at(input, idx, "where"))) {
            return (&input[..idx], &input[idx..]);
        }
        match c {
            '(' | '[' | '<' => depth += 1,
            '>' if prev == '-' => {}
            ')' | ']' | '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        prev = c;
    }
    (input, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_delimited_returns_inner_and_rest() {
        let (inner, rest) = split_delimited("(a, (b, c)) -> bool").unwrap();
        assert_eq!(inner, "a, (b, c)");
        assert_eq!(rest, " -> bool");
    }

    #[test]
    fn test_split_delimited_all_kinds() {
        assert_eq!(split_delimited("[x]y").unwrap(), ("x", "y"));
        assert_eq!(split_delimited("{ {} }z").unwrap(), (" {} ", "z"));
        assert_eq!(split_delimited("<Vec<T>>::new").unwrap(), ("Vec<T>", "::new"));
    }

    #[test]
    fn test_split_delimited_arrow_in_angle_span() {
        let (inner, rest) = split_delimited("<dyn Fn(u32) -> bool>, x").unwrap();
        assert_eq!(inner, "dyn Fn(u32) -> bool");
        assert_eq!(rest, ", x");
    }

    #[test]
    fn test_split_delimited_unmatched() {
        let err = split_delimited("((a)").unwrap_err();
        assert!(matches!(err, SiglintError::UnmatchedDelimiter { open: '(', depth: 1 }));
    }

    #[test]
    fn test_split_delimited_requires_opener() {
        assert!(matches!(
            split_delimited("abc"),
            Err(SiglintError::MalformedSignature { .. })
        ));
        assert!(split_delimited("").is_err());
    }

    #[test]
    fn test_split_delimited_exact_span_property() {
        for x in ["", "a", "(b)", "f(g(h)), k", "((()))()", "x: (u8, (u16, u32))"] {
            let text = format!("({}) tail", x);
            let (inner, rest) = split_delimited(&text).unwrap();
            assert_eq!(inner, x);
            assert_eq!(rest, " tail");
        }
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        let parts = split_top_level("a: HashMap<K, V>, b: (u8, u8), c: [T; 2],", ',');
        assert_eq!(parts, vec!["a: HashMap<K, V>", "b: (u8, u8)", "c: [T; 2]"]);
    }

    #[test]
    fn test_split_top_level_fn_arrow() {
        let parts = split_top_level("F: Fn(u8) -> bool, T", ',');
        assert_eq!(parts, vec!["F: Fn(u8) -> bool", "T"]);
    }

    #[test]
    fn test_split_once_top_level() {
        assert_eq!(split_once_top_level("&self, x: Vec<(a, b)>", ','), ("&self", Some(" x: Vec<(a, b)>")));
        assert_eq!(split_once_top_level("&self", ','), ("&self", None));
    }

    #[test]
    fn test_split_keyword_top_level() {
        let (left, right) = split_keyword_top_level("From<Vec<T>> for Graph<T>", "for").unwrap();
        assert_eq!(left.trim(), "From<Vec<T>>");
        assert_eq!(right.trim(), "Graph<T>");
        assert!(split_keyword_top_level("Formatter", "for").is_none());
    }

    #[test]
    fn test_scan_until_body() {
        let (ret, rest) = scan_until_body(" Result<Vec<NodeT>, String> {\n body }");
        assert_eq!(ret.trim(), "Result<Vec<NodeT>, String>");
        assert!(rest.starts_with('{'));

        let (ret, rest) = scan_until_body(" impl Fn(u8) -> bool where T: Copy {");
        assert_eq!(ret.trim(), "impl Fn(u8) -> bool");
        assert!(rest.starts_with("where"));

        let (ret, rest) = scan_until_body(" Option<Somewhere>;");
        assert_eq!(ret.trim(), "Option<Somewhere>");
        assert_eq!(rest, ";");
    }
}
