//! End-to-end generation tests.

use async_trait::async_trait;
use gqlapi_codegen::{
    generate, generate_unformatted, CodegenError, DocumentFile, FormatError, GenerationOptions,
    SourceFormatter, SourceLanguage, TypeScriptFormatter, PREPEND,
};
use gqlapi_core::Interner;
use gqlapi_syntax::parse;

const SCHEMA: &str = r"
scalar uuid

type Profile {
  id: uuid!
  displayName: String!
}

type Query {
  profile(id: uuid!): Profile
  profiles: [Profile!]!
}

type Mutation {
  createProfile(displayName: String!): Profile!
}

type Subscription {
  profilesStream(batchSize: Int!, cursor: String): [Profile!]!
  profileCreated: Profile!
}
";

async fn run(documents: &[&str], options: &GenerationOptions) -> String {
    let interner = Interner::new();
    let schema = parse(SCHEMA, &interner);
    assert!(!schema.diagnostics.has_errors());

    let parsed: Vec<_> = documents.iter().map(|source| parse(source, &interner)).collect();
    let locations: Vec<String> = (0..parsed.len()).map(|i| format!("doc{i}.graphql")).collect();
    let files: Vec<_> = parsed
        .iter()
        .zip(&locations)
        .map(|(result, location)| DocumentFile::new(location, &result.document))
        .collect();

    let output = generate(
        &schema.document,
        &files,
        options,
        &interner,
        &TypeScriptFormatter::new(),
    )
    .await
    .unwrap();
    assert_eq!(output.prepend, vec![PREPEND.to_string()]);
    output.content
}

#[tokio::test]
async fn test_free_query_unwraps_matching_field() {
    let options = GenerationOptions::default().with_name_suffix("Doc").without_wrapper();
    let content = run(&["query profile($id: uuid!) { profile(id: $id) { id } }"], &options).await;

    assert!(content.contains(
        "async function fetchProfile(client: GenericGraphQLClient, variables: ProfileQueryVariables, options?: RequestOptions): Promise<ProfileQuery[\"profile\"]>"
    ));
    assert!(content.contains("client.request<ProfileQuery>(ProfileDoc, variables, options)"));
    assert!(content.contains("export async function fetchProfile("));
    assert!(!content.contains("getAPI"));
}

#[tokio::test]
async fn test_wrapper_method_has_no_client_parameter() {
    let content = run(
        &["query profiles { profiles { id } }"],
        &GenerationOptions::default(),
    )
    .await;

    assert!(content.contains(
        "async profiles(variables: ProfilesQueryVariables, options?: RequestOptions): Promise<ProfilesQuery[\"profiles\"]>"
    ));
    assert!(content.contains("export function getAPI(client: GenericGraphQLClient) {"));
    assert!(content.contains("export type GraphQLAPI = ReturnType<typeof getAPI>;"));
    assert!(!content.contains("(client: GenericGraphQLClient, variables"));
}

#[tokio::test]
async fn test_stream_subscription_yields_whole_batch() {
    let options = GenerationOptions::default().without_wrapper();
    let content = run(
        &["subscription profilesStream($batchSize: Int!, $cursor: String) { profilesStream(batchSize: $batchSize, cursor: $cursor) { id } }"],
        &options,
    )
    .await;

    assert!(content.contains("export function subscribeProfilesStream(client: GenericGraphQLClient, variables: ProfilesStreamSubscriptionVariables, onUnexpectedClose?: () => void): AsyncIterable<ProfilesStreamSubscription[\"profilesStream\"]>"));
    assert!(content.contains("      yield data[\"profilesStream\"];\n"));
    assert!(!content.contains("yield*"));
}

#[tokio::test]
async fn test_unnamed_operation_is_dropped() {
    let content = run(
        &[
            "query profile($id: uuid!) { profile(id: $id) { id } }",
            "{ profiles { id } }",
            "mutation createProfile($displayName: String!) { createProfile(displayName: $displayName) { id } }",
        ],
        &GenerationOptions::default(),
    )
    .await;

    assert_eq!(content.matches("async ").count(), 2);
    assert!(content.contains("async profile("));
    assert!(content.contains("async createProfile("));
    assert!(content.contains("},\n    async createProfile("));
}

#[tokio::test]
async fn test_formatted_wrapper_program() {
    let content = run(
        &[
            "query profiles { profiles { id } }",
            "subscription profileCreated { profileCreated { id } }",
        ],
        &GenerationOptions::default().with_name_suffix("Document"),
    )
    .await;

    let api = &content[content.find("export function getAPI").unwrap()..];
    insta::assert_snapshot!(api.trim_end(), @r#"
    export function getAPI(client: GenericGraphQLClient) {
      return {
        async profiles(variables: ProfilesQueryVariables, options?: RequestOptions): Promise<ProfilesQuery["profiles"]> {
          const data = await client.request<ProfilesQuery>(ProfilesDocument, variables, options);
          return data["profiles"];
        },
        profileCreated(variables: ProfileCreatedSubscriptionVariables, onUnexpectedClose?: () => void): AsyncIterable<ProfileCreatedSubscription["profileCreated"]> {
          const subscription = client.subscribeAsync<ProfileCreatedSubscription>(ProfileCreatedDocument, variables, onUnexpectedClose);
          return (async function* () {
            for await (const data of subscription) {
              yield data["profileCreated"];
            }
          })();
        }
      };
    }

    export type GraphQLAPI = ReturnType<typeof getAPI>;
    "#);
}

#[tokio::test]
async fn test_generation_is_idempotent() {
    let documents = [
        "query profile($id: uuid!) { profile(id: $id) { id } }",
        "query dashboard { profiles { id } }",
        "subscription profilesStream { profilesStream { id } }",
    ];
    for options in [
        GenerationOptions::default(),
        GenerationOptions::default().without_wrapper(),
    ] {
        let first = run(&documents, &options).await;
        let second = run(&documents, &options).await;
        assert_eq!(first, second);

        let reformatted = TypeScriptFormatter::new().format_source(&first).unwrap();
        assert_eq!(reformatted, first);
    }
}

#[test]
fn test_unformatted_output_is_deterministic() {
    let interner = Interner::new();
    let schema = parse(SCHEMA, &interner);
    let document = parse("query profiles { profiles { id } }", &interner);
    let files = [DocumentFile::new("profiles.graphql", &document.document)];
    let options = GenerationOptions::default();

    let first = generate_unformatted(&schema.document, &files, &options, &interner);
    let second = generate_unformatted(&schema.document, &files, &options, &interner);
    assert_eq!(first, second);
}

struct RejectingFormatter;

#[async_trait]
impl SourceFormatter for RejectingFormatter {
    async fn format(&self, _source: &str, _language: SourceLanguage) -> Result<String, FormatError> {
        Err(FormatError::Syntax {
            line: 3,
            column: 7,
            message: "Unexpected keyword".to_string(),
        })
    }
}

#[tokio::test]
async fn test_formatter_errors_propagate() {
    let interner = Interner::new();
    let schema = parse(SCHEMA, &interner);
    let document = parse("query profiles { profiles { id } }", &interner);
    let files = [DocumentFile::new("profiles.graphql", &document.document)];

    let err = generate(
        &schema.document,
        &files,
        &GenerationOptions::default(),
        &interner,
        &RejectingFormatter,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CodegenError::Format(FormatError::Syntax { line: 3, .. })));
    assert_eq!(
        err.to_string(),
        "failed to format generated code: syntax error at 3:7: Unexpected keyword"
    );
}
