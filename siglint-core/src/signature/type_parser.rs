//! Identifier, modifier and type-expression parsing.
//!
//! Every parser takes the remaining input and returns `(value, rest)`, so
//! callers thread the cursor explicitly and decide what may follow.

use super::delimiter::{split_delimited, split_once_top_level, split_top_level};
use super::types::{GenericArg, Modifiers, TypeExpr};
use crate::error::{SiglintError, SiglintResult};

#[inline]
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Strips keyword `kw` from the front of `input` if it is followed by a
/// non-identifier character (or end of input).
pub(crate) fn strip_keyword<'a>(input: &'a str, kw: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(kw)?;
    match rest.chars().next() {
        Some(c) if is_ident_char(c) => None,
        _ => Some(rest),
    }
}

/// Parses the maximal leading `[A-Za-z_][A-Za-z0-9_]*` run.
pub fn parse_identifier(input: &str) -> SiglintResult<(&str, &str)> {
    let mut end = 0;
    for (idx, c) in input.char_indices() {
        let ok = if idx == 0 { is_ident_start(c) } else { is_ident_char(c) };
        if !ok {
            break;
        }
        end = idx + c.len_utf8();
    }

    if end == 0 {
        Err(SiglintError::invalid_identifier(input))
    } else {
        Ok((&input[..end], &input[end..]))
    }
}

/// Parses `'ident`, returning the lifetime with its leading quote.
pub fn parse_lifetime(input: &str) -> SiglintResult<(String, &str)> {
    let rest = input
        .strip_prefix('\'')
        .ok_or_else(|| SiglintError::invalid_identifier(input))?;
    let (ident, rest) = parse_identifier(rest)?;
    Ok((format!("'{}", ident), rest))
}

/// Parses an optional `&`, then an optional lifetime, then an optional `mut`.
pub fn parse_modifiers(input: &str) -> SiglintResult<(Modifiers, &str)> {
    let mut rest = input.trim_start();
    let mut modifiers = Modifiers::default();

    if let Some(r) = rest.strip_prefix('&') {
        modifiers.is_reference = true;
        rest = r.trim_start();
    }
    if rest.starts_with('\'') {
        let (lifetime, r) = parse_lifetime(rest)?;
        modifiers.lifetime = Some(lifetime);
        rest = r.trim_start();
    }
    if let Some(r) = strip_keyword(rest, "mut") {
        modifiers.is_mutable = true;
        rest = r.trim_start();
    }

    Ok((modifiers, rest))
}

/// Parses one type expression from the front of `input`.
///
/// Order: reference, `impl` bound, `dyn` bound, raw pointer, tuple,
/// slice/array, then a named (path) type with optional `<...>` arguments.
pub fn parse_type(input: &str) -> SiglintResult<(TypeExpr, &str)> {
    let s = input.trim_start();

    if s.starts_with('&') {
        let (modifiers, rest) = parse_modifiers(s)?;
        let (inner, rest) = parse_type(rest)?;
        return Ok((
            TypeExpr::Reference {
                is_mutable: modifiers.is_mutable,
                lifetime: modifiers.lifetime,
                inner: Box::new(inner),
            },
            rest,
        ));
    }

    if let Some(rest) = strip_keyword(s, "impl") {
        let (bounds, rest) = parse_bounds(rest)?;
        return Ok((TypeExpr::ImplBound(bounds), rest));
    }

    if let Some(rest) = strip_keyword(s, "dyn") {
        let (bounds, rest) = parse_bounds(rest)?;
        return Ok((TypeExpr::DynBound(bounds), rest));
    }

    if let Some(rest) = s.strip_prefix('*') {
        let rest = rest.trim_start();
        let (is_mutable, rest) = if let Some(r) = strip_keyword(rest, "mut") {
            (true, r)
        } else if let Some(r) = strip_keyword(rest, "const") {
            (false, r)
        } else {
            return Err(SiglintError::malformed("expected 'const' or 'mut' after '*'"));
        };
        let (inner, rest) = parse_type(rest)?;
        return Ok((
            TypeExpr::Pointer {
                is_mutable,
                inner: Box::new(inner),
            },
            rest,
        ));
    }

    if s.starts_with('(') {
        let (inner, rest) = split_delimited(s)?;
        let elems = split_top_level(inner, ',')
            .into_iter()
            .map(parse_type_str)
            .collect::<SiglintResult<Vec<_>>>()?;
        return Ok((TypeExpr::Tuple(elems), rest));
    }

    if s.starts_with('[') {
        let (inner, rest) = split_delimited(s)?;
        let ty = match split_once_top_level(inner, ';') {
            (elem, Some(len)) => TypeExpr::Array {
                inner: Box::new(parse_type_str(elem)?),
                len: len.trim().to_string(),
            },
            (elem, None) => TypeExpr::Slice(Box::new(parse_type_str(elem)?)),
        };
        return Ok((ty, rest));
    }

    parse_named(s)
}

/// Parses a complete type; anything left over is an error.
pub fn parse_type_str(text: &str) -> SiglintResult<TypeExpr> {
    let (ty, rest) = parse_type(text)?;
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(ty)
    } else {
        Err(SiglintError::malformed(format!(
            "unexpected '{}' after type '{}'",
            rest, ty
        )))
    }
}

/// `seg(::seg)*`, optionally with a leading `::`.
fn parse_path(input: &str) -> SiglintResult<(String, &str)> {
    let mut rest = input.strip_prefix("::").unwrap_or(input);
    let mut segments = Vec::new();

    loop {
        let (segment, r) = parse_identifier(rest)?;
        segments.push(segment);
        rest = r;
        match rest.strip_prefix("::") {
            Some(r) if r.starts_with(is_ident_start) => rest = r,
            _ => break,
        }
    }

    Ok((segments.join("::"), rest))
}

fn parse_named(input: &str) -> SiglintResult<(TypeExpr, &str)> {
    let (name, rest) = parse_path(input)?;
    let trimmed = rest.trim_start();

    if matches!(name.as_str(), "Fn" | "FnMut" | "FnOnce") && trimmed.starts_with('(') {
        let (args, mut rest) = split_delimited(trimmed)?;
        let params = split_top_level(args, ',')
            .into_iter()
            .map(parse_type_str)
            .collect::<SiglintResult<Vec<_>>>()?;
        let mut ret = None;
        if let Some(r) = rest.trim_start().strip_prefix("->") {
            let (ty, r) = parse_type(r)?;
            ret = Some(Box::new(ty));
            rest = r;
        }
        return Ok((TypeExpr::FnTrait { kind: name, params, ret }, rest));
    }

    if trimmed.starts_with('<') {
        let (inner, rest) = split_delimited(trimmed)?;
        let generics = split_top_level(inner, ',')
            .into_iter()
            .map(parse_generic_arg_str)
            .collect::<SiglintResult<Vec<_>>>()?;
        return Ok((TypeExpr::Named { name, generics }, rest));
    }

    Ok((
        TypeExpr::Named {
            name,
            generics: Vec::new(),
        },
        rest,
    ))
}

/// One generic argument: a lifetime, an associated binding or a type.
pub fn parse_generic_arg(input: &str) -> SiglintResult<(GenericArg, &str)> {
    let s = input.trim_start();

    if s.starts_with('\'') {
        let (lifetime, rest) = parse_lifetime(s)?;
        return Ok((GenericArg::Lifetime(lifetime), rest));
    }

    if let Ok((ident, rest)) = parse_identifier(s) {
        let t = rest.trim_start();
        if t.starts_with('=') && !t.starts_with("==") {
            let (ty, rest) = parse_type(&t[1..])?;
            return Ok((
                GenericArg::Binding {
                    name: ident.to_string(),
                    ty,
                },
                rest,
            ));
        }
    }

    let (ty, rest) = parse_type(s)?;
    Ok((GenericArg::Type(ty), rest))
}

fn parse_generic_arg_str(text: &str) -> SiglintResult<GenericArg> {
    let (arg, rest) = parse_generic_arg(text)?;
    if rest.trim().is_empty() {
        Ok(arg)
    } else {
        Err(SiglintError::malformed(format!(
            "unexpected '{}' after generic argument '{}'",
            rest.trim(),
            arg
        )))
    }
}

/// `+`-separated trait bounds after `impl` / `dyn`.
fn parse_bounds(input: &str) -> SiglintResult<(Vec<GenericArg>, &str)> {
    let mut bounds = Vec::new();
    let (first, mut rest) = parse_bound(input)?;
    bounds.push(first);

    while let Some(r) = rest.trim_start().strip_prefix('+') {
        let (bound, r) = parse_bound(r)?;
        bounds.push(bound);
        rest = r;
    }

    Ok((bounds, rest))
}

fn parse_bound(input: &str) -> SiglintResult<(GenericArg, &str)> {
    let s = input.trim_start();
    if s.starts_with('\'') {
        let (lifetime, rest) = parse_lifetime(s)?;
        return Ok((GenericArg::Lifetime(lifetime), rest));
    }
    let (ty, rest) = parse_type(s)?;
    Ok((GenericArg::Type(ty), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, generics: Vec<GenericArg>) -> TypeExpr {
        TypeExpr::Named {
            name: name.to_string(),
            generics,
        }
    }

    #[test]
    fn test_parse_identifier_splits_at_first_non_ident() {
        for (s, t) in [("foo", "(x)"), ("_bar9", " baz"), ("NodeT", ">"), ("x", "")] {
            let text = format!("{}{}", s, t);
            assert_eq!(parse_identifier(&text).unwrap(), (s, t));
        }
    }

    #[test]
    fn test_parse_identifier_rejects_bad_start() {
        assert!(matches!(
            parse_identifier("9lives"),
            Err(SiglintError::InvalidIdentifier { .. })
        ));
        assert!(parse_identifier("").is_err());
        assert!(parse_identifier("<T>").is_err());
    }

    #[test]
    fn test_parse_modifiers() {
        let (m, rest) = parse_modifiers("&'a mut self").unwrap();
        assert!(m.is_reference);
        assert!(m.is_mutable);
        assert_eq!(m.lifetime.as_deref(), Some("'a"));
        assert_eq!(rest, "self");

        let (m, rest) = parse_modifiers("self").unwrap();
        assert_eq!(m, Modifiers::default());
        assert_eq!(rest, "self");

        let (m, rest) = parse_modifiers("mutable").unwrap();
        assert!(!m.is_mutable);
        assert_eq!(rest, "mutable");
    }

    #[test]
    fn test_parse_simple_named() {
        assert_eq!(parse_type_str("i32").unwrap(), TypeExpr::named("i32"));
        assert_eq!(
            parse_type_str("std::path::PathBuf").unwrap(),
            TypeExpr::named("std::path::PathBuf")
        );
    }

    #[test]
    fn test_parse_nested_generics() {
        let ty = parse_type_str("Result<HashMap<String, Vec<NodeT>>, String>").unwrap();
        assert_eq!(
            ty,
            named(
                "Result",
                vec![
                    GenericArg::Type(named(
                        "HashMap",
                        vec![
                            GenericArg::Type(TypeExpr::named("String")),
                            GenericArg::Type(named(
                                "Vec",
                                vec![GenericArg::Type(TypeExpr::named("NodeT"))]
                            )),
                        ]
                    )),
                    GenericArg::Type(TypeExpr::named("String")),
                ]
            )
        );
    }

    #[test]
    fn test_parse_reference_with_lifetime_generic() {
        let ty = parse_type_str("&'a mut Cow<'a, str>").unwrap();
        assert_eq!(
            ty,
            TypeExpr::Reference {
                is_mutable: true,
                lifetime: Some("'a".to_string()),
                inner: Box::new(named(
                    "Cow",
                    vec![
                        GenericArg::Lifetime("'a".to_string()),
                        GenericArg::Type(TypeExpr::named("str")),
                    ]
                )),
            }
        );
    }

    #[test]
    fn test_parse_impl_iterator_binding() {
        let ty = parse_type_str("impl Iterator<Item = (NodeT, EdgeT)> + '_").unwrap();
        assert_eq!(
            ty,
            TypeExpr::ImplBound(vec![
                GenericArg::Type(named(
                    "Iterator",
                    vec![GenericArg::Binding {
                        name: "Item".to_string(),
                        ty: TypeExpr::Tuple(vec![
                            TypeExpr::named("NodeT"),
                            TypeExpr::named("EdgeT")
                        ]),
                    }]
                )),
                GenericArg::Lifetime("'_".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_dyn_fn_bound() {
        let ty = parse_type_str("Box<dyn Fn(NodeT, &str) -> bool + Send>").unwrap();
        assert_eq!(ty.to_string(), "Box<dyn Fn(NodeT, &str) -> bool + Send>");
    }

    #[test]
    fn test_parse_slice_array_pointer_unit() {
        assert_eq!(
            parse_type_str("&[u8]").unwrap().to_string(),
            "&[u8]"
        );
        assert_eq!(
            parse_type_str("[f32; 3]").unwrap(),
            TypeExpr::Array {
                inner: Box::new(TypeExpr::named("f32")),
                len: "3".to_string()
            }
        );
        assert_eq!(
            parse_type_str("*const u8").unwrap().to_string(),
            "*const u8"
        );
        assert_eq!(parse_type_str("()").unwrap(), TypeExpr::Tuple(vec![]));
    }

    #[test]
    fn test_parse_type_leaves_rest() {
        let (ty, rest) = parse_type("Vec<(u8, u16)>, y: bool").unwrap();
        assert_eq!(ty.to_string(), "Vec<(u8, u16)>");
        assert_eq!(rest, ", y: bool");
    }

    #[test]
    fn test_parse_type_str_rejects_trailing() {
        assert!(matches!(
            parse_type_str("u32 u64"),
            Err(SiglintError::MalformedSignature { .. })
        ));
    }

    #[test]
    fn test_parse_type_unmatched_generic() {
        assert!(matches!(
            parse_type_str("Vec<Option<u8>"),
            Err(SiglintError::UnmatchedDelimiter { open: '<', .. })
        ));
    }
}
