//! Typed client generation for GraphQL operations.
//!
//! Every named query, mutation and subscription in the input documents
//! becomes one TypeScript function written against a small
//! `GenericGraphQLClient` contract. Response and variable types are referenced
//! by name only (`ProfileQuery`, `ProfileQueryVariables`) and are expected to
//! come from a separate type generator.
//!
//! # Example
//!
//! ```ignore
//! use gqlapi_codegen::{generate, DocumentFile, GenerationOptions, TypeScriptFormatter};
//!
//! let output = generate(
//!     &schema,
//!     &[DocumentFile::new("queries.graphql", &document)],
//!     &GenerationOptions::default(),
//!     &interner,
//!     &TypeScriptFormatter::new(),
//! )
//! .await?;
//! ```

pub mod assemble;
pub mod convention;
pub mod emit;
mod error;
pub mod format;
pub mod naming;
mod options;
pub mod shape;

pub use assemble::{assemble_program, CLIENT_INTERFACE, PREPEND};
pub use convention::CallingConvention;
pub use emit::OperationEmitter;
pub use error::{CodegenError, CodegenResult};
pub use format::{FormatError, FormatOptions, SourceFormatter, SourceLanguage, TypeScriptFormatter};
pub use options::GenerationOptions;
pub use shape::{return_field_matches_operation_name, SubscriptionShape};

use gqlapi_core::Interner;
use gqlapi_syntax::{Definition, Document};
use tracing::{debug, info, trace};

/// An input document and where it came from.
#[derive(Debug, Clone, Copy)]
pub struct DocumentFile<'a> {
    /// Path or other label identifying the document.
    pub location: &'a str,
    /// Parsed body, `None` if the document could not be loaded.
    pub document: Option<&'a Document<'a>>,
}

impl<'a> DocumentFile<'a> {
    /// Creates a document file with a parsed body.
    pub fn new(location: &'a str, document: &'a Document<'a>) -> Self {
        Self {
            location,
            document: Some(document),
        }
    }

    /// Creates a document file without a body; it is skipped during generation.
    pub fn unparsed(location: &'a str) -> Self {
        Self {
            location,
            document: None,
        }
    }
}

/// Generated program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutput {
    /// Formatted program text.
    pub content: String,
    /// Lines to place ahead of `content`.
    pub prepend: Vec<String>,
}

impl PluginOutput {
    /// Returns `prepend` followed by `content`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.prepend.concat();
        out.push_str(&self.content);
        out
    }
}

/// Generates client functions and assembles them into a program, without
/// formatting.
///
/// The schema only establishes context; types are never looked up in it.
#[must_use]
pub fn generate_unformatted(
    schema: &Document<'_>,
    documents: &[DocumentFile<'_>],
    options: &GenerationOptions,
    interner: &Interner,
) -> PluginOutput {
    debug!(
        definitions = schema.definitions.len(),
        documents = documents.len(),
        "generating client functions"
    );

    let emitter = OperationEmitter::new(interner, options);
    let mut functions = Vec::new();

    for file in documents {
        let Some(document) = file.document else {
            trace!(location = file.location, "skipping document without a parsed body");
            continue;
        };
        for definition in &document.definitions {
            match definition {
                Definition::Operation(operation) => functions.push(emitter.emit(operation)),
                _ => trace!(location = file.location, "skipping non-operation definition"),
            }
        }
    }

    functions.retain(|function| !function.is_empty());
    info!(
        functions = functions.len(),
        wrapper = options.with_wrapper,
        "generated client functions"
    );

    PluginOutput {
        content: assemble_program(&functions, emitter.convention()),
        prepend: vec![PREPEND.to_string()],
    }
}

/// Generates client functions, assembles them into a program and formats it.
///
/// Fails only if the formatter rejects the assembled program.
pub async fn generate<F>(
    schema: &Document<'_>,
    documents: &[DocumentFile<'_>],
    options: &GenerationOptions,
    interner: &Interner,
    formatter: &F,
) -> CodegenResult<PluginOutput>
where
    F: SourceFormatter + ?Sized,
{
    let PluginOutput { content, prepend } =
        generate_unformatted(schema, documents, options, interner);
    let content = formatter.format(&content, SourceLanguage::TypeScript).await?;
    Ok(PluginOutput { content, prepend })
}
