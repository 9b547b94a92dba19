//! Twitter filtered-stream adapter.
//!
//! Opens the filtered status stream over HTTPS with an OAuth1-signed POST
//! and exposes the response body as a byte stream.
//!
//! - [`settings`] - credentials from the process environment
//! - [`auth`] - OAuth 1.0a HMAC-SHA1 request signing
//! - [`client`] - the [`StreamSource`](crate::port::StreamSource) implementation

pub mod auth;
pub mod client;
pub mod settings;

pub use auth::OAuthSigner;
pub use client::TwitterStream;
pub use settings::TwitterCredentials;
