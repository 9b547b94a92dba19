//! HTTPS client for the filtered status stream.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};
use url::Url;

use super::auth::OAuthSigner;
use super::settings::TwitterCredentials;
use crate::domain::FilterRequest;
use crate::error::{Error, Result};
use crate::infrastructure::config::stream::StreamConfig;
use crate::port::outbound::stream::{ByteStream, StreamSource};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Longest rejection body kept in an error message.
const MAX_REJECTION_BODY: usize = 512;

/// Filtered-stream client.
///
/// The HTTP client and the signer are built once, before any stream attempt,
/// and shared by every connection the pipeline opens.
pub struct TwitterStream {
    client: reqwest::Client,
    endpoint: Url,
    signer: OAuthSigner,
}

impl TwitterStream {
    /// Build the client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &StreamConfig, credentials: TwitterCredentials) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("twittervotes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            signer: OAuthSigner::new(credentials),
        })
    }

    fn form_params(request: &FilterRequest) -> Vec<(String, String)> {
        vec![("track".to_string(), request.track())]
    }
}

#[async_trait]
impl StreamSource for TwitterStream {
    async fn connect(&self, request: &FilterRequest) -> Result<ByteStream> {
        let params = Self::form_params(request);
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        let authorization = self.signer.authorization_header("POST", &self.endpoint, &params);

        debug!(
            endpoint = %self.endpoint,
            terms = request.terms().len(),
            "Sending filter request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::Dial(e.to_string())
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_REJECTION_BODY {
                let mut cut = MAX_REJECTION_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(Error::StreamRejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        info!(status = %status, endpoint = %self.endpoint, "Stream connected");
        Ok(Box::pin(response.bytes_stream().map_err(Error::from)))
    }

    fn source_name(&self) -> &'static str {
        "twitter"
    }
}
