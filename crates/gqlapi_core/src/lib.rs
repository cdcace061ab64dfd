//! Core utilities for gqlapi.
//!
//! This crate provides foundational types shared by the parser, the code
//! generator and the CLI:
//! - `span`: Source location tracking
//! - `text`: String interning
//! - `diagnostics`: Error reporting

pub mod diagnostics;
pub mod span;
pub mod text;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity, Label, SourceDiagnostic};
pub use span::Span;
pub use text::{Interner, Text};
