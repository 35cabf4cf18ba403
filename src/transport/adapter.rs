//! HTTP transport for the task API
//!
//! This module owns the configured `reqwest` client and is the only place
//! requests are sent from:
//! - Building the client with base address, timeout and default headers
//! - Joining endpoint paths onto the base address
//! - Mapping transport and status failures onto [`ClientError`]
//! - Surfacing every failed call exactly once through the [`Notifier`]
//!
//! No retries happen here.

use crate::config::BackendConfig;
use crate::transport::classify::{classify, extract_detail};
use crate::transport::notify::{Notifier, TracingNotifier};
use crate::{ClientError, ConfigError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

const USER_AGENT: &str = concat!("crawl-tasks/", env!("CARGO_PKG_VERSION"));

/// Configured entry point to the backend
///
/// Cheap to clone; clones share the connection pool and notifier.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Builds a transport that reports failures through `notifier`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use crawl_tasks::config::BackendConfig;
    /// use crawl_tasks::transport::{Transport, TracingNotifier};
    /// use std::sync::Arc;
    ///
    /// let transport = Transport::new(&BackendConfig::default(), Arc::new(TracingNotifier)).unwrap();
    /// assert_eq!(transport.base_url().as_str(), "http://localhost:8000/api");
    /// ```
    pub fn new(config: &BackendConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url '{}' cannot carry paths",
                config.base_url
            ))
            .into());
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .default_headers(build_headers(config)?)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            notifier,
        })
    }

    /// Builds a transport that logs failures through tracing
    pub fn with_tracing(config: &BackendConfig) -> Result<Self> {
        Self::new(config, Arc::new(TracingNotifier))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base address, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidEndpoint(format!("{} cannot carry paths", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET` a JSON body
    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let outcome = self.fetch_json(Method::GET, segments, None::<&()>).await;
        self.intercept(outcome)
    }

    /// `POST` a JSON body and read a JSON reply
    pub async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let outcome = self.fetch_json(Method::POST, segments, Some(body)).await;
        self.intercept(outcome)
    }

    /// `DELETE` and read a JSON reply
    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let outcome = self.fetch_json(Method::DELETE, segments, None::<&()>).await;
        self.intercept(outcome)
    }

    /// `GET` a binary body with query parameters
    pub async fn get_bytes(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let outcome = self.fetch_bytes(segments, query).await;
        self.intercept(outcome)
    }

    /// Classifies a failure and hands the message to the notifier
    ///
    /// Does not consume or alter the error.
    pub fn surface(&self, error: &ClientError) {
        let message = classify(error);
        tracing::debug!(class = ?message.class, error = %error, "Surfacing failed call");
        self.notifier.notify(&message);
    }

    /// The single interception point every public call returns through
    fn intercept<T>(&self, outcome: Result<T>) -> Result<T> {
        if let Err(error) = &outcome {
            self.surface(error);
        }
        outcome
    }

    async fn fetch_json<T, B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.dispatch(&method, &url, request).await?;
        read_json(&url, response).await
    }

    async fn fetch_bytes(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let request = self.client.get(url.clone());
        let response = self.dispatch(&Method::GET, &url, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, e))?;
        Ok(bytes.to_vec())
    }

    /// Sends a request and turns non-success statuses into errors
    async fn dispatch(&self, method: &Method, url: &Url, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(%method, %url, "Sending request");

        let response = request.send().await.map_err(|e| transport_error(url, e))?;
        let status = response.status();
        tracing::debug!(%method, %url, status = status.as_u16(), "Received response");

        if status.is_success() {
            return Ok(response);
        }

        // An unreadable error body is treated like an absent one
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Rejected {
            url: url.to_string(),
            status: status.as_u16(),
            detail: extract_detail(&body),
            body,
        })
    }
}

/// Builds the default header map from configuration
fn build_headers(config: &BackendConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.default_headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(format!("'{}' is not a valid header name", name)))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            ConfigError::InvalidHeader(format!("value for '{}' is not a valid header value", name))
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Maps a failure to obtain (or finish reading) a response
fn transport_error(url: &Url, error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout {
            url: url.to_string(),
        }
    } else {
        ClientError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Reads a JSON body; an empty body reads as `null`
async fn read_json<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, e))?;

    let decoded = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(&bytes)
    };

    decoded.map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}
