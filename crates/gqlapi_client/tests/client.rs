//! Client contract tests against an in-memory transport.

use async_trait::async_trait;
use futures_util::StreamExt;
use gqlapi_client::{
    fetch, fetch_field, subscribe, subscribe_field, AbortController, Api, ClientError,
    ClientResult, Frame, GraphQLClient, NoVariables, OnUnexpectedClose, RequestOptions,
    SubscriptionSource, TypedDocument,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    id: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ProfileQuery {
    profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
struct ProfileQueryVariables {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreateProfileMutation {
    #[serde(rename = "createProfile")]
    create_profile: Profile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateProfileMutationVariables {
    display_name: String,
}

const PROFILE: TypedDocument<ProfileQuery, ProfileQueryVariables> = TypedDocument::new(
    "profile",
    "query profile($id: uuid!) { profile(id: $id) { id displayName } }",
);

const CREATE_PROFILE: TypedDocument<CreateProfileMutation, CreateProfileMutationVariables> =
    TypedDocument::new(
        "createProfile",
        "mutation createProfile($displayName: String!) { createProfile(displayName: $displayName) { id displayName } }",
    );

const HANG: TypedDocument<Value, NoVariables> = TypedDocument::new("hang", "query hang { hang }");

const ONLINE_COUNT: TypedDocument<Value, NoVariables> =
    TypedDocument::new("onlineCount", "subscription onlineCount { onlineCount }");

const PROFILES_STREAM: TypedDocument<Value, NoVariables> = TypedDocument::new(
    "profilesStream",
    "subscription profilesStream { profilesStream { id displayName } }",
);

type Script = VecDeque<ClientResult<Option<Frame>>>;

struct ScriptedSource {
    frames: Script,
}

#[async_trait]
impl SubscriptionSource for ScriptedSource {
    async fn next_frame(&mut self) -> ClientResult<Option<Frame>> {
        match self.frames.pop_front() {
            Some(frame) => frame,
            None => std::future::pending().await,
        }
    }
}

#[derive(Default)]
struct MockClient {
    responses: HashMap<&'static str, Value>,
    script: Mutex<Script>,
    requests: Mutex<Vec<(Value, Vec<(String, String)>)>>,
}

impl MockClient {
    fn new() -> Self {
        let mut responses = HashMap::new();
        responses.insert(
            PROFILE.source(),
            json!({ "profile": { "id": "1", "displayName": "Ada" } }),
        );
        responses.insert(
            CREATE_PROFILE.source(),
            json!({ "createProfile": { "id": "2", "displayName": "Grace" } }),
        );
        Self {
            responses,
            ..Self::default()
        }
    }

    fn with_script(frames: Vec<ClientResult<Option<Frame>>>) -> Self {
        let client = Self::new();
        *client.script.lock().unwrap() = frames.into();
        client
    }
}

#[async_trait]
impl GraphQLClient for MockClient {
    async fn request(
        &self,
        document: &str,
        variables: Value,
        options: &RequestOptions,
    ) -> ClientResult<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((variables, options.request_headers.clone()));
        match self.responses.get(document) {
            Some(data) => Ok(data.clone()),
            None => std::future::pending().await,
        }
    }

    async fn subscribe(
        &self,
        _document: &str,
        _variables: Value,
    ) -> ClientResult<Box<dyn SubscriptionSource>> {
        let frames = std::mem::take(&mut *self.script.lock().unwrap());
        Ok(Box::new(ScriptedSource { frames }))
    }
}

fn counter() -> (Arc<AtomicUsize>, OnUnexpectedClose) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let callback = OnUnexpectedClose::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (calls, callback)
}

fn profile(id: &str, name: &str) -> Value {
    json!({ "id": id, "displayName": name })
}

#[tokio::test]
async fn test_fetch_returns_whole_response() {
    let client = MockClient::new();
    let variables = ProfileQueryVariables { id: "1".into() };
    let options = RequestOptions::new().header("authorization", "Bearer token");

    let data = fetch(&client, &PROFILE, &variables, &options).await.unwrap();
    assert_eq!(data.profile.unwrap().display_name, "Ada");

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests[0].0, json!({ "id": "1" }));
    assert_eq!(
        requests[0].1,
        vec![("authorization".to_string(), "Bearer token".to_string())]
    );
}

#[tokio::test]
async fn test_fetch_field_unwraps_operation_named_field() {
    let client = MockClient::new();
    let variables = ProfileQueryVariables { id: "1".into() };

    let profile: Option<Profile> = fetch_field(&client, &PROFILE, &variables, &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(
        profile,
        Some(Profile {
            id: "1".into(),
            display_name: "Ada".into()
        })
    );
}

#[tokio::test]
async fn test_api_binds_client_at_construction() {
    let api = Api::new(Arc::new(MockClient::new()));
    let variables = CreateProfileMutationVariables {
        display_name: "Grace".into(),
    };

    let created: Profile = api
        .mutate_field(&CREATE_PROFILE, &variables, &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(created.id, "2");

    let whole = api
        .mutate(&CREATE_PROFILE, &variables, &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(whole.create_profile, created);
    assert_eq!(api.client().requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_field_is_an_error() {
    let client = MockClient::new();
    let variables = ProfileQueryVariables { id: "1".into() };
    let doc: TypedDocument<ProfileQuery, ProfileQueryVariables> =
        TypedDocument::new("viewer", PROFILE.source());

    let err = fetch_field::<Profile, _, _, _>(&client, &doc, &variables, &RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingField(field) if field == "viewer"));
}

#[tokio::test]
async fn test_aborted_signal_short_circuits() {
    let client = MockClient::new();
    let controller = AbortController::new();
    controller.abort();
    let options = RequestOptions::new().signal(controller.signal());

    let err = fetch(&client, &PROFILE, &ProfileQueryVariables { id: "1".into() }, &options)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Aborted));
    assert!(client.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_abort_cancels_pending_request() {
    let client = MockClient::new();
    let controller = AbortController::new();
    let options = RequestOptions::new().signal(controller.signal());

    let (result, ()) = tokio::join!(fetch(&client, &HANG, &NoVariables {}, &options), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.abort();
    });
    assert!(matches!(result, Err(ClientError::Aborted)));
}

#[tokio::test]
async fn test_field_stream_completes_without_callback() {
    let client = MockClient::with_script(vec![
        Ok(Some(Frame::Next(json!({ "onlineCount": 1 })))),
        Ok(Some(Frame::Next(json!({ "onlineCount": 2 })))),
        Ok(Some(Frame::Complete)),
    ]);
    let (calls, callback) = counter();

    let mut counts = subscribe_field::<u32, _, _, _>(&client, &ONLINE_COUNT, &NoVariables {}, Some(callback))
        .await
        .unwrap();
    assert_eq!(counts.field(), "onlineCount");
    assert_eq!(counts.next().await.unwrap().unwrap(), 1);
    assert_eq!(counts.next().await.unwrap().unwrap(), 2);
    assert!(counts.next().await.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unexpected_close_fires_callback_once() {
    let client = MockClient::with_script(vec![
        Ok(Some(Frame::Next(json!({ "onlineCount": 5 })))),
        Ok(None),
    ]);
    let (calls, callback) = counter();

    let mut counts = subscribe_field::<u32, _, _, _>(&client, &ONLINE_COUNT, &NoVariables {}, Some(callback))
        .await
        .unwrap();
    assert_eq!(counts.next().await.unwrap().unwrap(), 5);
    assert!(counts.next().await.is_none());
    assert!(counts.next().await.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_batch_stream_yields_each_tick_whole() {
    let client = MockClient::with_script(vec![
        Ok(Some(Frame::Next(json!({
            "profilesStream": [profile("1", "Ada"), profile("2", "Grace")]
        })))),
        Ok(Some(Frame::Next(json!({ "profilesStream": [profile("3", "Linus")] })))),
        Ok(Some(Frame::Complete)),
    ]);

    let api = Api::new(client);
    let batches: Vec<Vec<Profile>> = api
        .subscribe_field::<Vec<Profile>, _, _>(&PROFILES_STREAM, &NoVariables {}, None)
        .await
        .unwrap()
        .into_stream()
        .map(|batch| batch.unwrap())
        .collect()
        .await;

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[1][0].display_name, "Linus");
}

#[tokio::test]
async fn test_whole_payload_subscription() {
    let client = MockClient::with_script(vec![
        Ok(Some(Frame::Next(json!({ "onlineCount": 1 })))),
        Ok(Some(Frame::Complete)),
    ]);

    let mut payloads = subscribe(&client, &ONLINE_COUNT, &NoVariables {}, None)
        .await
        .unwrap();
    assert_eq!(payloads.next().await.unwrap().unwrap(), json!({ "onlineCount": 1 }));
    assert!(payloads.next().await.is_none());
    assert!(payloads.is_finished());
}

#[tokio::test]
async fn test_transport_error_ends_subscription() {
    let client = MockClient::with_script(vec![
        Err(ClientError::Transport("connection reset".into())),
        Ok(Some(Frame::Next(json!({ "onlineCount": 1 })))),
    ]);
    let (calls, callback) = counter();

    let mut payloads = subscribe(&client, &ONLINE_COUNT, &NoVariables {}, Some(callback))
        .await
        .unwrap();
    let err = payloads.next().await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "transport error: connection reset");
    assert!(payloads.next().await.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_abort_stops_waiting_subscription() {
    let client = MockClient::with_script(Vec::new());
    let controller = AbortController::new();

    let mut payloads = subscribe(&client, &ONLINE_COUNT, &NoVariables {}, None)
        .await
        .unwrap()
        .with_signal(controller.signal());

    let (first, ()) = tokio::join!(payloads.next(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.abort();
    });
    assert!(matches!(first, Some(Err(ClientError::Aborted))));
    assert!(payloads.next().await.is_none());
}
