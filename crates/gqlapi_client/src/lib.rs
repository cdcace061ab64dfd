//! Runtime contract for generated gqlapi clients.
//!
//! Mirrors the TypeScript surface emitted by `gqlapi_codegen`:
//!
//! - [`GraphQLClient`] is `GenericGraphQLClient`: `request` plus a
//!   subscription entry point.
//! - [`RequestOptions`] carries headers and an [`AbortSignal`].
//! - [`Api`] binds operations to one client, the counterpart of `getAPI`.
//!   The free functions [`fetch`], [`mutate`] and [`subscribe`] take the
//!   client explicitly.
//! - [`Subscription`] and [`FieldStream`] are pulled with `next()`, and
//!   [`OnUnexpectedClose`] fires once if the transport ends without a
//!   `Complete` frame.

mod api;
mod client;
mod document;
mod error;
mod options;
mod subscription;

pub use api::{fetch, fetch_field, mutate, mutate_field, subscribe, subscribe_field, Api};
pub use client::{Frame, GraphQLClient, Response, SubscriptionSource};
pub use document::{NoVariables, TypedDocument};
pub use error::{ClientError, ClientResult, GraphQLError};
pub use options::{AbortController, AbortSignal, RequestOptions};
pub use subscription::{FieldStream, OnUnexpectedClose, Subscription};
