//! Client for the Invidious video proxy API.
//!
//! - [`client::ApiClient`]: endpoints, session login, lazy result streams
//! - [`parse`]: tagged normalization of list responses into
//!   [`result::SearchResultItem`]s
//! - [`types`]: wire shapes of the JSON the instance returns
//!
//! List endpoints return a [`ResultStream`]: a finite stream that performs its
//! request(s) when first polled. It cannot be rewound; calling the endpoint
//! again issues a fresh request. Dropping it early is fine.
use std::pin::Pin;

use futures::Stream;

pub mod client;
pub mod error;
pub mod parse;
pub mod result;
pub mod types;

pub use client::{ApiClient, ApiConfig, Credentials, NamedList};
pub use error::ApiError;
pub use result::{ChannelResult, PlaylistResult, ResultKind, SearchResultItem, VideoResult};
pub use types::VideoInfo;

/// Lazy sequence of results; each item may carry the error that ended it.
pub type ResultStream<T> = Pin<Box<dyn Stream<Item = Result<T, ApiError>> + Send + 'static>>;
