// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagewire
//!
//! Client-side glue for JSON web APIs: a request helper that dispatches
//! API error codes, list pagination driven by the `Links` response header
//! (optionally with a debounced filter input), and browser-style form
//! validation with custom rules.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewire::{ApiClient, HttpClientConfig, Paginator, PaginatorConfig, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = HttpClientConfig::builder()
//!         .base_url("https://pointercrate.com")
//!         .build();
//!     let client = Arc::new(ApiClient::with_config(config)?);
//!
//!     let players = Paginator::json(client, &PaginatorConfig::new("/players/").query("limit", "25"));
//!     players.initialize().await;
//!     players.next().await;
//!
//!     for player in players.items().await {
//!         println!("{player}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐   ┌───────────────────────┐   ┌────────────────┐
//! │  FilteredPaginator   │──▶│       Paginator       │──▶│   ApiClient    │
//! │  debounced filter    │   │ query data, links,    │   │ request(),     │
//! │  Enter / change      │   │ items, select hook    │   │ error dispatch │
//! └──────────────────────┘   └───────────┬───────────┘   └───────┬────────┘
//!                                        │ parse_links           │ Output
//! ┌──────────────────────┐               ▼                       ▼
//! │  Form / Input        │        LinkMap {rel → url}     error banner
//! │  native + custom     │
//! │  validation          │
//! └──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Show/hide message banners
pub mod output;

/// API client with error-code dispatch
pub mod http;

/// Links-header pagination
pub mod pagination;

/// Form and input validation
pub mod form;

/// YAML/JSON configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::Config;
pub use form::{Form, FormDefinition, Input, Trigger, Validator};
pub use http::{ApiClient, ApiResponse, HttpClientConfig, RequestOptions};
pub use output::Output;
pub use pagination::{parse_links, FilteredPaginator, Paginator, PaginatorConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
