//! Return-shape analysis.
//!
//! An operation whose top-level selection contains a field named (or aliased)
//! exactly like the operation itself returns that field alone instead of the
//! whole response object.

use gqlapi_syntax::{FieldSelection, OperationDefinition, Selection};

/// Suffix marking a subscription that delivers a whole batch per tick.
pub const BATCH_STREAM_SUFFIX: &str = "Stream";

/// Returns the first top-level field whose response key equals the
/// operation's name.
///
/// Only the first match counts even if later siblings would match too.
/// Fragment spreads and inline fragments are skipped.
#[must_use]
pub fn matched_field(operation: &OperationDefinition) -> Option<&FieldSelection> {
    let name = operation.name?;
    operation
        .selection_set
        .selections
        .iter()
        .find_map(|selection| match selection {
            Selection::Field(field) => {
                let matches = match field.alias {
                    Some(alias) => alias.value == name.value,
                    None => field.name.value == name.value,
                };
                matches.then_some(field)
            }
            Selection::FragmentSpread(_) | Selection::InlineFragment(_) => None,
        })
}

/// Returns true when the generated function should unwrap a single field.
#[must_use]
pub fn return_field_matches_operation_name(operation: &OperationDefinition) -> bool {
    matched_field(operation).is_some()
}

/// How a subscription's payloads are handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionShape {
    /// The operation name ends in `Stream`: every tick yields the named
    /// field's array as one unit.
    BatchStream,
    /// Each payload is narrowed to the matched field.
    Unwrapped,
    /// Payloads are yielded as received.
    Whole,
}

impl SubscriptionShape {
    /// Classifies a subscription given its resolved name.
    #[must_use]
    pub fn classify(name: &str, operation: &OperationDefinition) -> Self {
        if name.ends_with(BATCH_STREAM_SUFFIX) {
            Self::BatchStream
        } else if return_field_matches_operation_name(operation) {
            Self::Unwrapped
        } else {
            Self::Whole
        }
    }

    /// Returns true if payloads are narrowed to the operation-named field.
    #[must_use]
    pub const fn unwraps(self) -> bool {
        matches!(self, Self::BatchStream | Self::Unwrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlapi_core::Interner;
    use gqlapi_syntax::parse;

    fn check(source: &str) -> bool {
        let interner = Interner::new();
        let result = parse(source, &interner);
        let op = result.document.operations().next().unwrap();
        return_field_matches_operation_name(op)
    }

    #[test]
    fn test_field_named_like_operation_matches() {
        assert!(check("query profile($id: uuid!) { profile(id: $id) { id } }"));
    }

    #[test]
    fn test_alias_named_like_operation_matches() {
        assert!(check("query me { me: viewer { id } }"));
    }

    #[test]
    fn test_alias_hides_field_name() {
        assert!(!check("query profile { other: profile { id } }"));
    }

    #[test]
    fn test_no_match_returns_false() {
        assert!(!check("query dashboard { profiles { id } posts { id } }"));
    }

    #[test]
    fn test_missing_name_returns_false() {
        assert!(!check("{ profile { id } }"));
    }

    #[test]
    fn test_empty_selection_returns_false() {
        assert!(!check("query profile { }"));
    }

    #[test]
    fn test_fragments_are_skipped() {
        assert!(!check("query profile { ...ProfileFields ... on Query { version } }"));
        assert!(check("query profile { ...ProfileFields profile { id } }"));
    }

    #[test]
    fn test_first_match_wins() {
        let interner = Interner::new();
        let result = parse(
            "query profile { profile: viewer { id } profile { id } }",
            &interner,
        );
        let op = result.document.operations().next().unwrap();
        let field = matched_field(op).unwrap();
        assert_eq!(interner.get(field.name.value), "viewer");
    }

    #[test]
    fn test_subscription_shape() {
        let interner = Interner::new();
        let result = parse(
            r"
            subscription profilesStream { profilesStream { id } }
            subscription onlineCount { onlineCount }
            subscription events { profileCreated { id } }
            subscription orphanStream { somethingElse { id } }
            ",
            &interner,
        );
        let shapes: Vec<_> = result
            .document
            .operations()
            .map(|op| SubscriptionShape::classify(&interner.get(op.name.unwrap().value), op))
            .collect();
        assert_eq!(
            shapes,
            vec![
                SubscriptionShape::BatchStream,
                SubscriptionShape::Unwrapped,
                SubscriptionShape::Whole,
                SubscriptionShape::BatchStream,
            ]
        );
        assert!(shapes[0].unwraps());
        assert!(!shapes[2].unwraps());
    }
}
