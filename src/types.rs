//! Common types used throughout pagewire
//!
//! Shared type aliases, the HTTP method enum, UI key codes and
//! the query-string serializer every paginator builds its links with.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Type Aliases
// ============================================================================

/// Query parameters of a paginated endpoint, kept in key order
pub type QueryData = BTreeMap<String, String>;

/// Relation name (`next`, `prev`, ...) to URL, parsed from a `Links` header
pub type LinkMap = HashMap<String, String>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// UI Events
// ============================================================================

/// A key pressed inside a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Char(char),
}

impl Key {
    /// Key for a DOM-style key code (13 is Enter)
    pub fn from_code(code: u32) -> Self {
        match code {
            13 => Key::Enter,
            27 => Key::Escape,
            other => Key::Char(char::from_u32(other).unwrap_or('\0')),
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Serialize query data as `application/x-www-form-urlencoded`
pub fn serialize_query(data: &QueryData) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(data.iter())
        .finish()
}

/// Build `endpoint?query` the way every paginator link is built
pub fn endpoint_link(endpoint: &str, data: &QueryData) -> String {
    format!("{endpoint}?{}", serialize_query(data))
}
