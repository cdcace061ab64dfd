//! Calling conventions over a [`GraphQLClient`].
//!
//! The free functions take the client as their first argument. [`Api`] holds
//! a client handed over at construction and exposes the same operations as
//! methods.

use crate::client::GraphQLClient;
use crate::document::TypedDocument;
use crate::error::{ClientError, ClientResult};
use crate::options::RequestOptions;
use crate::subscription::{take_field, FieldStream, OnUnexpectedClose, Subscription};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

async fn request_value<C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    options: &RequestOptions,
) -> ClientResult<Value>
where
    C: GraphQLClient + ?Sized,
    V: Serialize,
{
    let variables = serde_json::to_value(variables)?;
    debug!(operation = document.operation_name(), "sending request");

    match &options.signal {
        Some(signal) if signal.is_aborted() => Err(ClientError::Aborted),
        Some(signal) => {
            tokio::select! {
                biased;
                () = signal.aborted() => Err(ClientError::Aborted),
                response = client.request(document.source(), variables, options) => response,
            }
        }
        None => client.request(document.source(), variables, options).await,
    }
}

/// Executes a query and returns the whole response.
pub async fn fetch<C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    options: &RequestOptions,
) -> ClientResult<D>
where
    C: GraphQLClient + ?Sized,
    D: DeserializeOwned,
    V: Serialize,
{
    let data = request_value(client, document, variables, options).await?;
    Ok(serde_json::from_value(data)?)
}

/// Executes a query and returns the field named like the operation.
pub async fn fetch_field<T, C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    options: &RequestOptions,
) -> ClientResult<T>
where
    T: DeserializeOwned,
    C: GraphQLClient + ?Sized,
    V: Serialize,
{
    let data = request_value(client, document, variables, options).await?;
    take_field(data, document.operation_name())
}

/// Executes a mutation and returns the whole response.
pub async fn mutate<C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    options: &RequestOptions,
) -> ClientResult<D>
where
    C: GraphQLClient + ?Sized,
    D: DeserializeOwned,
    V: Serialize,
{
    fetch(client, document, variables, options).await
}

/// Executes a mutation and returns the field named like the operation.
pub async fn mutate_field<T, C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    options: &RequestOptions,
) -> ClientResult<T>
where
    T: DeserializeOwned,
    C: GraphQLClient + ?Sized,
    V: Serialize,
{
    fetch_field(client, document, variables, options).await
}

async fn open<T, C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    on_unexpected_close: Option<OnUnexpectedClose>,
) -> ClientResult<Subscription<T>>
where
    T: DeserializeOwned,
    C: GraphQLClient + ?Sized,
    V: Serialize,
{
    let variables = serde_json::to_value(variables)?;
    debug!(operation = document.operation_name(), "opening subscription");
    let source = client.subscribe(document.source(), variables).await?;
    Ok(Subscription::new(
        document.operation_name(),
        source,
        on_unexpected_close,
    ))
}

/// Starts a subscription yielding whole payloads.
pub async fn subscribe<C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    on_unexpected_close: Option<OnUnexpectedClose>,
) -> ClientResult<Subscription<D>>
where
    C: GraphQLClient + ?Sized,
    D: DeserializeOwned,
    V: Serialize,
{
    open(client, document, variables, on_unexpected_close).await
}

/// Starts a subscription yielding the field named like the operation.
///
/// Batch streams use this with a collection `T`, so each tick is one item.
pub async fn subscribe_field<T, C, D, V>(
    client: &C,
    document: &TypedDocument<D, V>,
    variables: &V,
    on_unexpected_close: Option<OnUnexpectedClose>,
) -> ClientResult<FieldStream<T>>
where
    T: DeserializeOwned,
    C: GraphQLClient + ?Sized,
    V: Serialize,
{
    let inner = open::<Value, _, _, _>(client, document, variables, on_unexpected_close).await?;
    Ok(FieldStream::new(inner, document.operation_name()))
}

/// Operations bound to one client.
#[derive(Debug, Clone)]
pub struct Api<C> {
    client: C,
}

impl<C: GraphQLClient> Api<C> {
    /// Binds operations to `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the bound client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Releases the bound client.
    pub fn into_client(self) -> C {
        self.client
    }

    /// See [`fetch`].
    pub async fn fetch<D, V>(
        &self,
        document: &TypedDocument<D, V>,
        variables: &V,
        options: &RequestOptions,
    ) -> ClientResult<D>
    where
        D: DeserializeOwned,
        V: Serialize,
    {
        fetch(&self.client, document, variables, options).await
    }

    /// See [`fetch_field`].
    pub async fn fetch_field<T, D, V>(
        &self,
        document: &TypedDocument<D, V>,
        variables: &V,
        options: &RequestOptions,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        fetch_field(&self.client, document, variables, options).await
    }

    /// See [`mutate`].
    pub async fn mutate<D, V>(
        &self,
        document: &TypedDocument<D, V>,
        variables: &V,
        options: &RequestOptions,
    ) -> ClientResult<D>
    where
        D: DeserializeOwned,
        V: Serialize,
    {
        mutate(&self.client, document, variables, options).await
    }

    /// See [`mutate_field`].
    pub async fn mutate_field<T, D, V>(
        &self,
        document: &TypedDocument<D, V>,
        variables: &V,
        options: &RequestOptions,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        mutate_field(&self.client, document, variables, options).await
    }

    /// See [`subscribe`].
    pub async fn subscribe<D, V>(
        &self,
        document: &TypedDocument<D, V>,
        variables: &V,
        on_unexpected_close: Option<OnUnexpectedClose>,
    ) -> ClientResult<Subscription<D>>
    where
        D: DeserializeOwned,
        V: Serialize,
    {
        subscribe(&self.client, document, variables, on_unexpected_close).await
    }

    /// See [`subscribe_field`].
    pub async fn subscribe_field<T, D, V>(
        &self,
        document: &TypedDocument<D, V>,
        variables: &V,
        on_unexpected_close: Option<OnUnexpectedClose>,
    ) -> ClientResult<FieldStream<T>>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        subscribe_field(&self.client, document, variables, on_unexpected_close).await
    }
}
