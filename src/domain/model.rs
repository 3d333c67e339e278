use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

/// Lazy, finite sequence of content chunks. Dropping the stream releases the
/// underlying connection, also on early termination.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + 'static>>;

/// Provider-managed metadata of a stored object.
///
/// The service serializes this as `{mime, size, time_last_modification}`;
/// the header-style spellings `Content-Type` and `Content-Length` are
/// accepted as aliases when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    #[serde(alias = "Content-Type")]
    pub mime: String,

    #[serde(alias = "Content-Length")]
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_last_modification: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectWithMetadata {
    pub content: Vec<u8>,
    pub metadata: ObjectMetadata,
}
