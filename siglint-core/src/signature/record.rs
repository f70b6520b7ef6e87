//! Parsed function metadata.

use serde::{Deserialize, Serialize};

use super::types::{Param, TypeExpr};

/// Structured metadata for one parsed `fn ... { ... }` region.
///
/// Fixed shape: absent information is `None` / empty, never a missing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Simple function name (e.g., "get_node_name")
    pub name: String,
    /// Visibility: "pub", "pub(crate)", "pub(super)", "pub(in ...)" or "private"
    pub visibility: String,
    /// `const`, `async`, `unsafe`, `extern "C"` in source order
    pub qualifiers: Vec<String>,
    /// Type/lifetime parameter names, bounds stripped
    pub generics: Vec<String>,
    /// Receiver (if any) first, then typed parameters
    pub parameters: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    /// Raw text after each `///` marker
    pub doc_lines: Vec<String>,
    /// Inner text of the body braces, unparsed
    pub body: String,
    /// Target type of the enclosing impl block
    pub owning_struct: Option<String>,
    /// Source file path
    pub file: String,
    /// 1-based line of the fn header
    pub line: usize,
}

impl FunctionRecord {
    pub fn is_public(&self) -> bool {
        self.visibility == "pub"
    }

    pub fn is_method(&self) -> bool {
        self.owning_struct.is_some()
    }

    pub fn is_unsafe(&self) -> bool {
        self.qualifiers.iter().any(|q| q == "unsafe")
    }

    /// Whether the return type is a `Result<..>`.
    pub fn returns_result(&self) -> bool {
        self.return_type
            .as_ref()
            .and_then(TypeExpr::name)
            .is_some_and(|name| name.rsplit("::").next() == Some("Result"))
    }

    /// Names of all parameters except the receiver, in order.
    pub fn non_self_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| !p.is_receiver())
            .map(Param::name)
    }

    /// `Owner::name` for methods, plain `name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.owning_struct {
            Some(owner) => format!("{}::{}", owner, self.name),
            None => self.name.clone(),
        }
    }

    /// Signature line without body, e.g. `pub fn foo<T>(&self, x: i32) -> bool`.
    pub fn signature(&self) -> String {
        let mut sig = String::new();
        if self.visibility != "private" {
            sig.push_str(&self.visibility);
            sig.push(' ');
        }
        for q in &self.qualifiers {
            sig.push_str(q);
            sig.push(' ');
        }
        sig.push_str("fn ");
        sig.push_str(&self.name);
        if !self.generics.is_empty() {
            sig.push('<');
            sig.push_str(&self.generics.join(", "));
            sig.push('>');
        }
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
        sig.push('(');
        sig.push_str(&params.join(", "));
        sig.push(')');
        if let Some(ret) = &self.return_type {
            sig.push_str(" -> ");
            sig.push_str(&ret.to_string());
        }
        sig
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::types::Modifiers;

    fn record() -> FunctionRecord {
        FunctionRecord {
            name: "get_node_id".to_string(),
            visibility: "pub".to_string(),
            qualifiers: vec!["unsafe".to_string()],
            generics: vec![],
            parameters: vec![
                Param::Receiver {
                    modifiers: Modifiers {
                        is_reference: true,
                        ..Modifiers::default()
                    },
                },
                Param::Typed {
                    name: "node_name".to_string(),
                    ty: TypeExpr::Reference {
                        is_mutable: false,
                        lifetime: None,
                        inner: Box::new(TypeExpr::named("str")),
                    },
                },
            ],
            return_type: Some(TypeExpr::Named {
                name: "Result".to_string(),
                generics: vec![],
            }),
            doc_lines: vec![],
            body: String::new(),
            owning_struct: Some("Graph".to_string()),
            file: "src/getters.rs".to_string(),
            line: 3,
        }
    }

    #[test]
    fn test_predicates() {
        let r = record();
        assert!(r.is_public());
        assert!(r.is_method());
        assert!(r.is_unsafe());
        assert!(r.returns_result());
        assert_eq!(r.non_self_parameters().collect::<Vec<_>>(), vec!["node_name"]);
        assert_eq!(r.qualified_name(), "Graph::get_node_id");
    }

    #[test]
    fn test_signature_rendering() {
        assert_eq!(
            record().signature(),
            "pub unsafe fn get_node_id(&self, node_name: &str) -> Result"
        );
    }
}
