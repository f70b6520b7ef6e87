//! Lightweight signature parsing.
//!
//! Extracts function records from Rust source text without a full grammar:
//! - `delimiter`: balanced `()[]{}<>` scanning and top-level splitting
//! - `type_parser`: identifiers, receiver modifiers and type expressions
//! - `fn_parser`: the item-level recursive descent over impl blocks and fns
//! - `corpus`: parallel multi-file parsing and the corpus digest

pub mod corpus;
pub mod delimiter;
pub mod fn_parser;
pub mod record;
pub mod type_parser;
pub mod types;

pub use corpus::{corpus_digest, parse_sources, read_sources, SourceFile};
pub use delimiter::{split_delimited, split_top_level};
pub use fn_parser::{parse_parameters, parse_source, Diagnostic, ParseOutcome};
pub use record::FunctionRecord;
pub use type_parser::{parse_identifier, parse_modifiers, parse_type, parse_type_str};
pub use types::{GenericArg, Modifiers, Param, TypeExpr};
