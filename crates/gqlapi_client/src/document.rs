//! Typed documents.

use std::fmt;
use std::marker::PhantomData;

/// A GraphQL document tagged with its response and variables types.
///
/// This is the Rust counterpart of `TypedDocumentNode<TData, V>`: the type
/// parameters only steer decoding and never appear at runtime.
pub struct TypedDocument<Data, Vars> {
    source: &'static str,
    operation_name: &'static str,
    _marker: PhantomData<fn(Vars) -> Data>,
}

impl<Data, Vars> TypedDocument<Data, Vars> {
    /// Creates a typed document.
    #[must_use]
    pub const fn new(operation_name: &'static str, source: &'static str) -> Self {
        Self {
            source,
            operation_name,
            _marker: PhantomData,
        }
    }

    /// Returns the document text sent to the server.
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }

    /// Returns the operation name, which is also the key an unwrapping
    /// function reads from the response.
    #[must_use]
    pub const fn operation_name(&self) -> &'static str {
        self.operation_name
    }
}

impl<Data, Vars> Clone for TypedDocument<Data, Vars> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Data, Vars> Copy for TypedDocument<Data, Vars> {}

impl<Data, Vars> fmt::Debug for TypedDocument<Data, Vars> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedDocument")
            .field("operation_name", &self.operation_name)
            .finish_non_exhaustive()
    }
}

/// Variables for operations that declare none.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct NoVariables {}
