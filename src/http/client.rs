//! API client and request helper
//!
//! Provides an HTTP client bound to one API that handles:
//! - A fixed API path prefix prepended to every relative path
//! - `Accept: application/json` on every request
//! - Structured error bodies dispatched by error code
//! - Routing of every failure to an error [`Output`]

use crate::error::{Error, Result};
use crate::output::Output;
use crate::pagination::parse_links;
use crate::types::{LinkMap, Method};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default path prefix of the API
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Callback invoked with `(message, data)` for a registered error code
pub type ErrorHandler = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Scheme and authority of the server, e.g. `https://example.com`
    pub base_url: String,
    /// Path prefix prepended to relative request paths
    pub api_prefix: String,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("pagewire/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API prefix
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.api_prefix = prefix.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Per-request options: error-code handlers, headers and JSON body
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// Handlers keyed by the API's error code
    pub error_codes: HashMap<u16, ErrorHandler>,
    /// Request headers (`Accept` is always overridden)
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
}

impl RequestOptions {
    /// Create empty request options
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an API error code, replacing any previous one
    #[must_use]
    pub fn on_error<F>(mut self, code: u16, handler: F) -> Self
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        self.error_codes.insert(code, Arc::new(handler));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.error_codes.keys().collect();
        codes.sort_unstable();
        f.debug_struct("RequestOptions")
            .field("error_codes", &codes)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .finish()
    }
}

/// A successful response: status, headers and the parsed JSON body
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ApiResponse {
    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parsed pagination links (`Links`, falling back to `Link`)
    pub fn links(&self) -> LinkMap {
        parse_links(self.header("links").or_else(|| self.header("link")))
    }
}

/// Structured error body returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "error_code")]
    code: u16,
    message: String,
    #[serde(default)]
    data: Value,
}

/// HTTP client bound to one API
pub struct ApiClient {
    client: Client,
    config: HttpClientConfig,
}

impl ApiClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Send a request and classify the outcome.
    ///
    /// Non-success statuses become [`Error::Api`] when the body is a
    /// structured error, [`Error::UnexpectedStatus`] otherwise.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse> {
        let url = self.build_url(path);
        let headers = self.build_headers(options)?;

        let mut req = self
            .client
            .request(method.into(), &url)
            .headers(headers);
        if let Some(ref body) = options.body {
            req = req.json(body);
        }

        debug!("{} {}", method_name(method), url);

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorBody>(&text) {
                return Err(Error::api(error.code, error.message, error.data));
            }
            return Err(Error::unexpected_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status"),
            ));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| Error::decode(format!("response from {url} is not JSON: {e}")))?
        };

        debug!("{} {} -> {}", method_name(method), url, status.as_u16());
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Issue a request, routing failures instead of returning them.
    ///
    /// The error output's display is reset before the request starts. On
    /// success `on_success` receives the full response and its result is
    /// returned; on failure the error is reported through
    /// [`report_error`] and `None` is returned.
    pub async fn request<T, F>(
        &self,
        method: Method,
        path: &str,
        error_output: &Output,
        on_success: F,
        options: &RequestOptions,
    ) -> Option<T>
    where
        F: FnOnce(ApiResponse) -> T,
    {
        error_output.reset_display();

        match self.send(method, path, options).await {
            Ok(response) => Some(on_success(response)),
            Err(e) => {
                report_error(e, error_output, &options.error_codes);
                None
            }
        }
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let prefix = self.config.api_prefix.trim_end_matches('/');
        let under_prefix = !prefix.is_empty()
            && path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']));
        if under_prefix {
            return format!("{base}{path}");
        }

        let path = path.trim_start_matches('/');
        format!("{base}{prefix}/{path}")
    }

    fn build_headers(&self, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in self.config.default_headers.iter().chain(&options.headers) {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::invalid_value(format!("header {key}"), e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::invalid_value(format!("header {key}"), e.to_string()))?;
            headers.insert(name, value);
        }

        // Callers can't negotiate anything but JSON.
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Route a failed request to its handler or the error output.
///
/// Structured API errors with a registered code go to that handler.
/// Unregistered codes and every other failure are written into
/// `error_output`, which is then shown.
pub fn report_error(error: Error, error_output: &Output, handlers: &HashMap<u16, ErrorHandler>) {
    match error {
        Error::Api {
            code,
            message,
            data,
        } => {
            if let Some(handler) = handlers.get(&code) {
                handler(&message, &data);
            } else {
                warn!(
                    "The server returned an error of code {}, which is not handled here. Handling as generic error",
                    code
                );
                error_output.show(message);
            }
        }
        other => {
            debug!("Request failed: {}", other);
            error_output.show(other.display_message());
        }
    }
}

fn method_name(method: Method) -> &'static str {
    match method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::PATCH => "PATCH",
        Method::DELETE => "DELETE",
    }
}
