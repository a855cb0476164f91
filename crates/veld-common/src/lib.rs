//! Shared infrastructure for the Veld front-end.
//!
//! This crate provides:
//! - `Atom` / `Interner` - string interning for identifier deduplication
//! - `Diagnostic` - lexical and parse error reporting
//! - `limits` - hard limits shared across phases

pub mod diagnostics;
pub mod interner;
pub mod limits;

pub use diagnostics::{Diagnostic, DiagnosticSource};
pub use interner::{Atom, Interner};
