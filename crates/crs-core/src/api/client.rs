//! API client for the course-registration REST API.
//!
//! Every call goes through [`ApiClient::request`]: JSON headers and bearer
//! auth are attached, the body is read as text and parsed permissively, and
//! any failure comes back as an [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiError, RequestDescriptor};
use crate::auth::TokenStore;
use crate::config::Config;

/// API client bound to one base URL and one token store.
/// Clone is cheap - reqwest::Client and the store are both shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<TokenStore>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot take a path: {}", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    pub fn from_config(config: &Config, tokens: Arc<TokenStore>) -> Result<Self> {
        Self::new(&config.api_base, tokens, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Perform one call and return the parsed body.
    ///
    /// The body on success may be any JSON value, `Null` for an empty body,
    /// or a `String` holding raw text when the server didn't send JSON.
    pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<Value, ApiError> {
        self.send(descriptor).await.map(|(_, value)| value)
    }

    /// Like [`request`](Self::request), then decode into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ApiError> {
        let (status, value) = self.send(descriptor).await?;
        // Decoding from a clone keeps the original for the error
        serde_json::from_value(value.clone()).map_err(|e| {
            warn!(path = %descriptor.path(), error = %e, "Response did not match expected schema");
            ApiError::decode(status, &e, value)
        })
    }

    async fn send(&self, descriptor: &RequestDescriptor) -> Result<(StatusCode, Value), ApiError> {
        let url = self.build_url(descriptor);
        debug!(method = %descriptor.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(descriptor.method.into(), url.clone())
            .headers(self.build_headers(descriptor.requires_auth));
        if let Some(body) = descriptor.wire_body() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method = %descriptor.method, url = %url, error = %e, "Request failed before a response");
            ApiError::transport(&e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to read response body");
            ApiError::transport(&e)
        })?;
        let value = parse_body(&text);

        if !status.is_success() {
            warn!(
                method = %descriptor.method,
                url = %url,
                status = status.as_u16(),
                body = %ApiError::truncate_body(&text),
                "Request rejected"
            );
            return Err(ApiError::from_response(status, value));
        }

        debug!(url = %url, status = status.as_u16(), "Request succeeded");
        Ok((status, value))
    }

    fn build_url(&self, descriptor: &RequestDescriptor) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(descriptor.segments());
        }
        if !descriptor.query_pairs().is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in descriptor.query_pairs() {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// JSON content type always; bearer auth only when asked for and a
    /// credential is stored. A missing credential is left for the server
    /// to reject.
    fn build_headers(&self, requires_auth: bool) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if !requires_auth {
            return headers;
        }
        match self.tokens.get() {
            Some(token) => match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending without auth"),
            },
            None => debug!("No stored token for authenticated request"),
        }
        headers
    }
}

/// Empty text is `Null`, JSON is decoded, anything else is kept as a string.
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
