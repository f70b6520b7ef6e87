//! Typed representation of parsed signatures.
//!
//! Types are parsed once into [`TypeExpr`] and never re-split downstream;
//! `Display` renders them back to canonical Rust text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference / mutability prefix of a receiver or reference type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub is_reference: bool,
    pub lifetime: Option<String>,
    pub is_mutable: bool,
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reference {
            f.write_str("&")?;
        }
        if let Some(lifetime) = &self.lifetime {
            write!(f, "{} ", lifetime)?;
        }
        if self.is_mutable {
            f.write_str("mut ")?;
        }
        Ok(())
    }
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// Path type with optional generic arguments: `HashMap<K, V>`.
    Named {
        name: String,
        generics: Vec<GenericArg>,
    },
    /// `&'a mut T`
    Reference {
        is_mutable: bool,
        lifetime: Option<String>,
        inner: Box<TypeExpr>,
    },
    /// `impl A + B`
    ImplBound(Vec<GenericArg>),
    /// `dyn A + B`
    DynBound(Vec<GenericArg>),
    /// `(A, B)`; the unit type is the empty tuple.
    Tuple(Vec<TypeExpr>),
    /// `[T]`
    Slice(Box<TypeExpr>),
    /// `[T; N]`, length kept as written.
    Array { inner: Box<TypeExpr>, len: String },
    /// `*const T` / `*mut T`
    Pointer {
        is_mutable: bool,
        inner: Box<TypeExpr>,
    },
    /// `Fn(A) -> R`, `FnMut(..)`, `FnOnce(..)` sugar.
    FnTrait {
        kind: String,
        params: Vec<TypeExpr>,
        ret: Option<Box<TypeExpr>>,
    },
}

/// One argument inside `<...>` or one `+` bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenericArg {
    Type(TypeExpr),
    Lifetime(String),
    /// Associated type binding: `Item = NodeT`.
    Binding { name: String, ty: TypeExpr },
}

impl TypeExpr {
    /// Shorthand for a named type without generic arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            generics: Vec::new(),
        }
    }

    /// Path name of a `Named` type.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, generics } => {
                f.write_str(name)?;
                if !generics.is_empty() {
                    f.write_str("<")?;
                    write_joined(f, generics, ", ")?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeExpr::Reference {
                is_mutable,
                lifetime,
                inner,
            } => {
                f.write_str("&")?;
                if let Some(lifetime) = lifetime {
                    write!(f, "{} ", lifetime)?;
                }
                if *is_mutable {
                    f.write_str("mut ")?;
                }
                write!(f, "{}", inner)
            }
            TypeExpr::ImplBound(bounds) => {
                f.write_str("impl ")?;
                write_joined(f, bounds, " + ")
            }
            TypeExpr::DynBound(bounds) => {
                f.write_str("dyn ")?;
                write_joined(f, bounds, " + ")
            }
            TypeExpr::Tuple(elems) => {
                f.write_str("(")?;
                write_joined(f, elems, ", ")?;
                if elems.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            TypeExpr::Slice(inner) => write!(f, "[{}]", inner),
            TypeExpr::Array { inner, len } => write!(f, "[{}; {}]", inner, len),
            TypeExpr::Pointer { is_mutable, inner } => {
                let kind = if *is_mutable { "mut" } else { "const" };
                write!(f, "*{} {}", kind, inner)
            }
            TypeExpr::FnTrait { kind, params, ret } => {
                write!(f, "{}(", kind)?;
                write_joined(f, params, ", ")?;
                f.write_str(")")?;
                if let Some(ret) = ret {
                    write!(f, " -> {}", ret)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for GenericArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericArg::Type(ty) => write!(f, "{}", ty),
            GenericArg::Lifetime(lifetime) => f.write_str(lifetime),
            GenericArg::Binding { name, ty } => write!(f, "{} = {}", name, ty),
        }
    }
}

/// One entry of a parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Param {
    /// Leading `self`, `&self`, `&'a mut self`, ...
    Receiver { modifiers: Modifiers },
    /// `name: Type`
    Typed { name: String, ty: TypeExpr },
}

impl Param {
    pub fn is_receiver(&self) -> bool {
        matches!(self, Param::Receiver { .. })
    }

    /// Parameter name; `self` for the receiver.
    pub fn name(&self) -> &str {
        match self {
            Param::Receiver { .. } => "self",
            Param::Typed { name, .. } => name,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Receiver { modifiers } => write!(f, "{}self", modifiers),
            Param::Typed { name, ty } => write!(f, "{}: {}", name, ty),
        }
    }
}
