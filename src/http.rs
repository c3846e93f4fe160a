//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Optional bearer token, attached to every request
//! - Opt-in exponential backoff retries on transport errors, 429 and 5xx
//!
//! Retries are off by default; every failure surfaces on the first attempt.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("reqbump/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with optional auth and retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            max_retries: 0,
            token: None,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the bearer token sent with every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Returns true if a bearer token is configured
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Start a request, with auth applied
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Send a request, retrying transient failures up to the configured limit
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, reqwest::Error> {
        let mut delay = BASE_DELAY_MS;
        let mut attempt = 0;

        loop {
            // Streaming bodies cannot be replayed
            let Some(current) = request.try_clone() else {
                return request.send().await;
            };

            match current.send().await {
                Ok(response)
                    if is_retryable_status(response.status()) && attempt < self.max_retries =>
                {
                    debug!(status = %response.status(), attempt, "retrying request");
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries => {
                    debug!(error = %e, attempt, "retrying request");
                }
                result => return result,
            }

            attempt += 1;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay *= 2;
        }
    }
}

/// Statuses worth retrying
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
