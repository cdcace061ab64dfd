//! Pull-based subscriptions.

use crate::client::{Frame, SubscriptionSource};
use crate::error::{ClientError, ClientResult};
use crate::options::AbortSignal;
use futures_util::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Callback fired when a subscription's transport closes without a
/// terminal `Complete` frame.
///
/// It runs at most once.
pub struct OnUnexpectedClose(Option<Box<dyn FnOnce() + Send>>);

impl OnUnexpectedClose {
    /// Wraps a callback.
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(callback)))
    }

    fn fire(&mut self) {
        if let Some(callback) = self.0.take() {
            callback();
        }
    }
}

impl fmt::Debug for OnUnexpectedClose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OnUnexpectedClose")
            .field(&if self.0.is_some() { "pending" } else { "fired" })
            .finish()
    }
}

/// A subscription yielding whole payloads.
///
/// Call [`Subscription::next`] until it returns `None`. The subscription ends
/// after a `Complete` frame, an unexpected close, an error, or an abort.
pub struct Subscription<T> {
    operation: String,
    source: Box<dyn SubscriptionSource>,
    on_unexpected_close: Option<OnUnexpectedClose>,
    signal: Option<AbortSignal>,
    finished: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("operation", &self.operation)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> Subscription<T> {
    /// Wraps a transport source.
    pub fn new(
        operation: impl Into<String>,
        source: Box<dyn SubscriptionSource>,
        on_unexpected_close: Option<OnUnexpectedClose>,
    ) -> Self {
        Self {
            operation: operation.into(),
            source,
            on_unexpected_close,
            signal: None,
            finished: false,
            _marker: PhantomData,
        }
    }

    /// Stops the subscription when `signal` aborts.
    #[must_use]
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Returns true once no further items will be produced.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pulls the next payload.
    pub async fn next(&mut self) -> Option<ClientResult<T>> {
        let value = match self.next_value().await? {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        };
        Some(serde_json::from_value(value).map_err(ClientError::from))
    }

    async fn next_value(&mut self) -> Option<ClientResult<Value>> {
        if self.finished {
            return None;
        }

        let frame = match &self.signal {
            Some(signal) => {
                tokio::select! {
                    biased;
                    () = signal.aborted() => Err(ClientError::Aborted),
                    frame = self.source.next_frame() => frame,
                }
            }
            None => self.source.next_frame().await,
        };

        match frame {
            Ok(Some(Frame::Next(value))) => Some(Ok(value)),
            Ok(Some(Frame::Complete)) => {
                debug!(operation = %self.operation, "subscription completed");
                self.finished = true;
                None
            }
            Ok(None) => {
                warn!(operation = %self.operation, "subscription closed unexpectedly");
                self.finished = true;
                if let Some(callback) = self.on_unexpected_close.as_mut() {
                    callback.fire();
                }
                None
            }
            Err(err) => {
                debug!(operation = %self.operation, error = %err, "subscription failed");
                self.finished = true;
                Some(Err(err))
            }
        }
    }

    /// Converts the subscription into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = ClientResult<T>> + Send
    where
        T: Send + 'static,
    {
        stream::unfold(self, |mut subscription| async move {
            subscription.next().await.map(|item| (item, subscription))
        })
    }
}

/// A subscription narrowed to one field of each payload.
///
/// For a batch stream the field holds the whole per-tick array and `T` is a
/// collection type, so every tick is yielded as one item.
#[derive(Debug)]
pub struct FieldStream<T> {
    inner: Subscription<Value>,
    field: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> FieldStream<T> {
    /// Narrows `inner` to `field`.
    pub fn new(inner: Subscription<Value>, field: impl Into<String>) -> Self {
        Self {
            inner,
            field: field.into(),
            _marker: PhantomData,
        }
    }

    /// Returns the field being re-yielded.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Pulls the next field value.
    pub async fn next(&mut self) -> Option<ClientResult<T>> {
        let item = self.inner.next_value().await?;
        Some(item.and_then(|payload| take_field(payload, &self.field)))
    }

    /// Converts the stream into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = ClientResult<T>> + Send
    where
        T: Send + 'static,
    {
        stream::unfold(self, |mut fields| async move {
            fields.next().await.map(|item| (item, fields))
        })
    }
}

/// Removes `field` from a response object and decodes it.
pub(crate) fn take_field<T: DeserializeOwned>(payload: Value, field: &str) -> ClientResult<T> {
    let Value::Object(mut map) = payload else {
        return Err(ClientError::MissingField(field.to_string()));
    };
    let value = map
        .remove(field)
        .ok_or_else(|| ClientError::MissingField(field.to_string()))?;
    Ok(serde_json::from_value(value)?)
}
