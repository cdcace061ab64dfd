//! Generation options.

use serde::{Deserialize, Serialize};

/// Options controlling generated output.
///
/// Keys are read in camelCase (`nameSuffix`, `withWrapper`) with snake_case
/// aliases, so the same table works in JSON and TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
    /// Appended to the PascalCase operation name to form the identifier of
    /// the document constant passed to the client.
    #[serde(alias = "name_suffix")]
    pub name_suffix: String,
    /// Emit methods on a `getAPI(client)` object instead of free functions.
    #[serde(alias = "with_wrapper")]
    pub with_wrapper: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            name_suffix: String::new(),
            with_wrapper: true,
        }
    }
}

impl GenerationOptions {
    /// Sets the document identifier suffix.
    #[must_use]
    pub fn with_name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.name_suffix = suffix.into();
        self
    }

    /// Switches to free-function output.
    #[must_use]
    pub fn without_wrapper(mut self) -> Self {
        self.with_wrapper = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GenerationOptions::default();
        assert_eq!(options.name_suffix, "");
        assert!(options.with_wrapper);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: GenerationOptions =
            serde_json::from_str(r#"{ "nameSuffix": "Doc", "withWrapper": false }"#).unwrap();
        assert_eq!(options, GenerationOptions::default().with_name_suffix("Doc").without_wrapper());
    }

    #[test]
    fn test_deserialize_aliases_and_missing_keys() {
        let options: GenerationOptions =
            serde_json::from_str(r#"{ "name_suffix": "Document" }"#).unwrap();
        assert_eq!(options.name_suffix, "Document");
        assert!(options.with_wrapper);
    }
}
