//! Per-operation function emitters.

use crate::convention::CallingConvention;
use crate::naming::{document_identifier, pascal_case};
use crate::options::GenerationOptions;
use crate::shape::{return_field_matches_operation_name, SubscriptionShape};
use gqlapi_core::Interner;
use gqlapi_syntax::{OperationDefinition, OperationType};
use tracing::{debug, trace};

/// Names shared by every function generated for one operation.
struct OperationNames {
    name: String,
    head: String,
    response: String,
    variables: String,
    document: String,
}

/// Emits one TypeScript function per named operation.
pub struct OperationEmitter<'a> {
    interner: &'a Interner,
    options: &'a GenerationOptions,
    convention: CallingConvention,
}

impl<'a> OperationEmitter<'a> {
    /// Creates a new emitter.
    pub fn new(interner: &'a Interner, options: &'a GenerationOptions) -> Self {
        Self {
            interner,
            options,
            convention: CallingConvention::from_wrapper(options.with_wrapper),
        }
    }

    /// Returns the calling convention in effect.
    #[must_use]
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    /// Emits the function for an operation.
    ///
    /// Operations without a name produce an empty fragment.
    pub fn emit(&self, operation: &OperationDefinition) -> String {
        match operation.operation {
            OperationType::Query | OperationType::Mutation => self.emit_request(operation),
            OperationType::Subscription => self.emit_subscription(operation),
        }
    }

    fn names(&self, operation: &OperationDefinition) -> Option<OperationNames> {
        let Some(name) = operation.name else {
            trace!(kind = %operation.operation, "skipping anonymous operation");
            return None;
        };
        let name = self.interner.get(name.value);
        if name.is_empty() {
            trace!(kind = %operation.operation, "skipping operation with empty name");
            return None;
        }

        let pascal = pascal_case(&name);
        let response = format!("{pascal}{}", operation.operation.root_type_name());
        Some(OperationNames {
            head: self.convention.head(operation.operation, &name, &pascal),
            variables: format!("{response}Variables"),
            document: document_identifier(&pascal, &self.options.name_suffix),
            response,
            name,
        })
    }

    /// Emits a query or mutation function.
    pub fn emit_request(&self, operation: &OperationDefinition) -> String {
        let Some(names) = self.names(operation) else {
            return String::new();
        };
        let OperationNames {
            name,
            head,
            response,
            variables,
            document,
        } = names;
        let client = self.convention.client_parameter();
        let unwrap = return_field_matches_operation_name(operation);
        debug!(operation = %name, kind = %operation.operation, unwrap, "emitting request function");

        let params = format!("({client}variables: {variables}, options?: RequestOptions)");
        if unwrap {
            [
                format!("{head}{params}: Promise<{response}[\"{name}\"]> {{"),
                format!("  const data = await client.request<{response}>({document}, variables, options);"),
                format!("  return data[\"{name}\"];"),
                "}".to_string(),
            ]
            .join("\n")
        } else {
            [
                format!("{head}{params}: Promise<{response}> {{"),
                format!("  return client.request<{response}>({document}, variables, options);"),
                "}".to_string(),
            ]
            .join("\n")
        }
    }

    /// Emits a subscription function.
    pub fn emit_subscription(&self, operation: &OperationDefinition) -> String {
        let Some(names) = self.names(operation) else {
            return String::new();
        };
        let OperationNames {
            name,
            head,
            response,
            variables,
            document,
        } = names;
        let client = self.convention.client_parameter();
        let shape = SubscriptionShape::classify(&name, operation);
        debug!(operation = %name, ?shape, "emitting subscription function");

        let params = format!("({client}variables: {variables}, onUnexpectedClose?: () => void)");
        let call = format!("client.subscribeAsync<{response}>({document}, variables, onUnexpectedClose)");
        if shape.unwraps() {
            [
                format!("{head}{params}: AsyncIterable<{response}[\"{name}\"]> {{"),
                format!("  const subscription = {call};"),
                "  return (async function* () {".to_string(),
                "    for await (const data of subscription) {".to_string(),
                format!("      yield data[\"{name}\"];"),
                "    }".to_string(),
                "  })();".to_string(),
                "}".to_string(),
            ]
            .join("\n")
        } else {
            [
                format!("{head}{params}: AsyncIterable<{response}> {{"),
                format!("  return {call};"),
                "}".to_string(),
            ]
            .join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlapi_syntax::parse;

    fn emit_first(source: &str, options: &GenerationOptions) -> String {
        let interner = Interner::new();
        let result = parse(source, &interner);
        let op = result.document.operations().next().unwrap();
        OperationEmitter::new(&interner, options).emit(op)
    }

    #[test]
    fn test_query_free_function_unwraps_field() {
        let options = GenerationOptions::default().with_name_suffix("Doc").without_wrapper();
        let code = emit_first(
            "query profile($id: uuid!) { profile(id: $id) { id } }",
            &options,
        );
        insta::assert_snapshot!(code, @r#"
        async function fetchProfile(client: GenericGraphQLClient, variables: ProfileQueryVariables, options?: RequestOptions): Promise<ProfileQuery["profile"]> {
          const data = await client.request<ProfileQuery>(ProfileDoc, variables, options);
          return data["profile"];
        }
        "#);
    }

    #[test]
    fn test_query_method_returns_whole_response() {
        let code = emit_first(
            "query dashboard { profiles { id } posts { id } }",
            &GenerationOptions::default(),
        );
        insta::assert_snapshot!(code, @r"
        async dashboard(variables: DashboardQueryVariables, options?: RequestOptions): Promise<DashboardQuery> {
          return client.request<DashboardQuery>(Dashboard, variables, options);
        }
        ");
    }

    #[test]
    fn test_mutation_keeps_operation_name() {
        let options = GenerationOptions::default().without_wrapper();
        let code = emit_first(
            "mutation createProfile($input: ProfileInput!) { createProfile(input: $input) { id } }",
            &options,
        );
        assert!(code.starts_with(
            "async function createProfile(client: GenericGraphQLClient, variables: CreateProfileMutationVariables, options?: RequestOptions): Promise<CreateProfileMutation[\"createProfile\"]> {"
        ));
        assert!(code.contains("client.request<CreateProfileMutation>(CreateProfile, variables, options)"));
    }

    #[test]
    fn test_mutation_without_match_returns_whole_response() {
        let options = GenerationOptions::default().without_wrapper();
        let code = emit_first("mutation logout { revokeSession { ok } }", &options);
        insta::assert_snapshot!(code, @r"
        async function logout(client: GenericGraphQLClient, variables: LogoutMutationVariables, options?: RequestOptions): Promise<LogoutMutation> {
          return client.request<LogoutMutation>(Logout, variables, options);
        }
        ");
    }

    #[test]
    fn test_free_subscription_unwraps_matching_field() {
        let options = GenerationOptions::default().without_wrapper();
        let code = emit_first("subscription profileCreated { profileCreated { id } }", &options);
        insta::assert_snapshot!(code, @r#"
        function subscribeProfileCreated(client: GenericGraphQLClient, variables: ProfileCreatedSubscriptionVariables, onUnexpectedClose?: () => void): AsyncIterable<ProfileCreatedSubscription["profileCreated"]> {
          const subscription = client.subscribeAsync<ProfileCreatedSubscription>(ProfileCreated, variables, onUnexpectedClose);
          return (async function* () {
            for await (const data of subscription) {
              yield data["profileCreated"];
            }
          })();
        }
        "#);
    }

    #[test]
    fn test_batch_stream_subscription() {
        let options = GenerationOptions::default().without_wrapper();
        let code = emit_first(
            "subscription profilesStream($batchSize: Int!, $cursor: String) { profilesStream(batchSize: $batchSize, cursor: $cursor) { id } }",
            &options,
        );
        insta::assert_snapshot!(code, @r#"
        function subscribeProfilesStream(client: GenericGraphQLClient, variables: ProfilesStreamSubscriptionVariables, onUnexpectedClose?: () => void): AsyncIterable<ProfilesStreamSubscription["profilesStream"]> {
          const subscription = client.subscribeAsync<ProfilesStreamSubscription>(ProfilesStream, variables, onUnexpectedClose);
          return (async function* () {
            for await (const data of subscription) {
              yield data["profilesStream"];
            }
          })();
        }
        "#);
    }

    #[test]
    fn test_stream_suffix_unwraps_without_matching_field() {
        let code = emit_first(
            "subscription orphanStream { other { id } }",
            &GenerationOptions::default(),
        );
        assert!(code.contains("AsyncIterable<OrphanStreamSubscription[\"orphanStream\"]>"));
        assert!(code.contains("yield data[\"orphanStream\"];"));
    }

    #[test]
    fn test_subscription_without_match_returns_client_iterable() {
        let code = emit_first(
            "subscription events { profileCreated { id } }",
            &GenerationOptions::default(),
        );
        insta::assert_snapshot!(code, @r"
        events(variables: EventsSubscriptionVariables, onUnexpectedClose?: () => void): AsyncIterable<EventsSubscription> {
          return client.subscribeAsync<EventsSubscription>(Events, variables, onUnexpectedClose);
        }
        ");
    }

    #[test]
    fn test_anonymous_operation_is_empty() {
        let code = emit_first("{ profile { id } }", &GenerationOptions::default());
        assert!(code.is_empty());
    }
}
