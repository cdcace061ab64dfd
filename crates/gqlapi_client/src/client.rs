//! The client contract generated functions are written against.

use crate::error::{ClientError, ClientResult, GraphQLError};
use crate::options::RequestOptions;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// A GraphQL transport.
///
/// Implementations send a document with JSON variables and hand back the
/// `data` member of the response.
#[async_trait]
pub trait GraphQLClient: Send + Sync {
    /// Executes a query or mutation.
    async fn request(
        &self,
        document: &str,
        variables: Value,
        options: &RequestOptions,
    ) -> ClientResult<Value>;

    /// Starts a subscription.
    async fn subscribe(
        &self,
        document: &str,
        variables: Value,
    ) -> ClientResult<Box<dyn SubscriptionSource>>;
}

#[async_trait]
impl<C: GraphQLClient + ?Sized> GraphQLClient for Arc<C> {
    async fn request(
        &self,
        document: &str,
        variables: Value,
        options: &RequestOptions,
    ) -> ClientResult<Value> {
        (**self).request(document, variables, options).await
    }

    async fn subscribe(
        &self,
        document: &str,
        variables: Value,
    ) -> ClientResult<Box<dyn SubscriptionSource>> {
        (**self).subscribe(document, variables).await
    }
}

/// One frame delivered by a subscription transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A payload's `data` member.
    Next(Value),
    /// The server ended the subscription.
    Complete,
}

/// The transport side of a subscription.
#[async_trait]
pub trait SubscriptionSource: Send {
    /// Produces the next frame.
    ///
    /// `Ok(None)` means the transport closed without sending
    /// [`Frame::Complete`].
    async fn next_frame(&mut self) -> ClientResult<Option<Frame>>;
}

/// A raw GraphQL response body.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

impl Response {
    /// Returns the data member, or the reported errors.
    pub fn into_data(self) -> ClientResult<Value> {
        if !self.errors.is_empty() {
            return Err(ClientError::GraphQL(self.errors));
        }
        self.data.ok_or(ClientError::MissingData)
    }
}
