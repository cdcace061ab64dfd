//! Error types for code generation.

use crate::format::FormatError;
use thiserror::Error;

/// Errors returned by [`crate::generate`].
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The assembled program was rejected by the formatter.
    #[error("failed to format generated code: {0}")]
    Format(#[from] FormatError),
}

/// Result alias for code generation.
pub type CodegenResult<T> = Result<T, CodegenError>;
