//! Stream source port.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::domain::FilterRequest;
use crate::error::Result;

/// Raw response body of an open stream, as a sequence of byte chunks.
///
/// Dropping the stream releases the underlying network connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A remote source of filtered records.
///
/// `connect` covers dialing, authentication and the request itself; it
/// resolves once the source has accepted the filter and the body is ready to
/// read. Timeouts and forced closure are applied by the caller.
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Open a filtered stream.
    async fn connect(&self, request: &FilterRequest) -> Result<ByteStream>;

    /// Name of the source for logging.
    fn source_name(&self) -> &'static str;
}
