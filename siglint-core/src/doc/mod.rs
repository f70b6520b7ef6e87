//! Documentation coverage checking.
//!
//! `sections` splits a `///` block into description and `# Title` sections;
//! `checker` applies the coverage rules to the public methods of one type.

pub mod checker;
pub mod sections;

pub use checker::{DocCheckReport, DocChecker, Finding};
pub use sections::{ArgumentEntry, DocSection, ParsedDoc};
