//! HTTP client module
//!
//! Provides the API client every paginator and form request goes through.
//!
//! # Features
//!
//! - **API Prefix**: Relative paths are resolved under a fixed prefix (`/api/v1`)
//! - **JSON Only**: `Accept: application/json` on every request
//! - **Error Dispatch**: Structured API errors routed to per-code handlers
//! - **Error Output**: Every other failure is shown on an error banner

mod client;

pub use client::{
    report_error, ApiClient, ApiResponse, ErrorHandler, HttpClientConfig,
    HttpClientConfigBuilder, RequestOptions, DEFAULT_API_PREFIX,
};
