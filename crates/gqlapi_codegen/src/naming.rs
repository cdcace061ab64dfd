//! Type-name prefixes derived from operation names.

use heck::ToUpperCamelCase;

/// Converts an operation name into the PascalCase prefix shared by its
/// response, variables and document type names.
///
/// `profilesStream` becomes `ProfilesStream`, `create_profile` becomes
/// `CreateProfile`.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Returns the identifier of the document constant an operation is sent with.
#[must_use]
pub fn document_identifier(pascal_case_name: &str, name_suffix: &str) -> String {
    format!("{pascal_case_name}{name_suffix}")
}
