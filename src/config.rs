//! Configuration
//!
//! One file (YAML, or JSON by extension) describes the API client, the
//! paginated lists and the forms of an application.

use crate::error::{Error, Result};
use crate::form::FormDefinition;
use crate::http::{HttpClientConfig, DEFAULT_API_PREFIX};
use crate::pagination::PaginatorConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API client settings
    #[serde(default)]
    pub client: ClientSettings,

    /// Paginated lists by name
    #[serde(default)]
    pub paginators: BTreeMap<String, PaginatorConfig>,

    /// Forms by name
    #[serde(default)]
    pub forms: BTreeMap<String, FormDefinition>,
}

impl Config {
    /// Load from a file; `.json` files are parsed as JSON, everything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse YAML configuration
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Paginator config by name
    pub fn paginator(&self, name: &str) -> Result<&PaginatorConfig> {
        self.paginators
            .get(name)
            .ok_or_else(|| Error::UnknownPaginator {
                name: name.to_string(),
            })
    }

    /// Form definition by name
    pub fn form(&self, name: &str) -> Result<&FormDefinition> {
        self.forms.get(name).ok_or_else(|| Error::UnknownForm {
            name: name.to_string(),
        })
    }

    /// Check the configuration for values that can never work
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.client.base_url)
            .map_err(|e| Error::invalid_value("client.base_url", e.to_string()))?;

        if self.client.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "client.timeout_secs",
                "must be greater than zero",
            ));
        }

        for (name, paginator) in &self.paginators {
            if !paginator.endpoint.starts_with('/') {
                return Err(Error::invalid_value(
                    format!("paginators.{name}.endpoint"),
                    "must start with '/'",
                ));
            }
            if paginator.filter_param.as_deref() == Some("") {
                return Err(Error::invalid_value(
                    format!("paginators.{name}.filter_param"),
                    "cannot be empty",
                ));
            }
        }

        for (name, form) in &self.forms {
            let mut seen = std::collections::HashSet::new();
            for field in &form.fields {
                if field.id.is_empty() {
                    return Err(Error::missing_field(format!("forms.{name}.fields[].id")));
                }
                if !seen.insert(field.id.as_str()) {
                    return Err(Error::config(format!(
                        "Duplicate input id '{}' in form '{}'",
                        field.id, name
                    )));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Client Settings
// ============================================================================

/// API client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Scheme and authority of the server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of the API
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: default_timeout_secs(),
            headers: HashMap::new(),
        }
    }
}

impl ClientSettings {
    /// HTTP client config for these settings
    pub fn to_http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .api_prefix(&self.api_prefix)
            .timeout(Duration::from_secs(self.timeout_secs));

        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG_YAML: &str = r#"
client:
  base_url: https://demonlist.example.com
  timeout_secs: 10
  headers:
    X-Client: pagewire
paginators:
  players:
    endpoint: /players/
    query:
      limit: "25"
    filter_param: name
    debounce_ms: 500
  demons:
    endpoint: /demons/
forms:
  login:
    fields:
      - id: username
        required: true
"#;

    #[test]
    fn test_parse_yaml_config() {
        let config = Config::from_yaml_str(CONFIG_YAML).unwrap();

        assert_eq!(config.client.base_url, "https://demonlist.example.com");
        assert_eq!(config.client.api_prefix, "/api/v1");
        assert_eq!(config.client.timeout_secs, 10);

        let players = config.paginator("players").unwrap();
        assert_eq!(players.query.get("limit"), Some(&"25".to_string()));
        assert_eq!(players.filter_param.as_deref(), Some("name"));
        assert_eq!(players.debounce_ms, 500);

        let demons = config.paginator("demons").unwrap();
        assert_eq!(demons.debounce_ms, 1000);

        assert_eq!(config.form("login").unwrap().fields.len(), 1);
    }

    #[test]
    fn test_unknown_names() {
        let config = Config::from_yaml_str(CONFIG_YAML).unwrap();

        assert!(matches!(
            config.paginator("records"),
            Err(Error::UnknownPaginator { .. })
        ));
        assert!(matches!(config.form("signup"), Err(Error::UnknownForm { .. })));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.client, ClientSettings::default());
        assert!(config.paginators.is_empty());
    }

    #[test]
    fn test_to_http_config() {
        let config = Config::from_yaml_str(CONFIG_YAML).unwrap();
        let http = config.client.to_http_config();

        assert_eq!(http.base_url, "https://demonlist.example.com");
        assert_eq!(http.api_prefix, "/api/v1");
        assert_eq!(http.timeout, Duration::from_secs(10));
        assert_eq!(
            http.default_headers.get("X-Client"),
            Some(&"pagewire".to_string())
        );
    }

    #[test]
    fn test_validation_errors() {
        let err = Config::from_yaml_str("client:\n  base_url: not a url\n").unwrap_err();
        assert!(err.to_string().contains("client.base_url"));

        let err = Config::from_yaml_str("paginators:\n  p:\n    endpoint: players/\n").unwrap_err();
        assert!(err.to_string().contains("paginators.p.endpoint"));

        let err = Config::from_yaml_str(
            "forms:\n  f:\n    fields:\n      - id: a\n      - id: a\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate input id 'a'"));
    }

    #[test]
    fn test_from_file_yaml_and_json() {
        let mut yaml = NamedTempFile::with_suffix(".yaml").unwrap();
        yaml.write_all(CONFIG_YAML.as_bytes()).unwrap();
        let from_yaml = Config::from_file(yaml.path()).unwrap();

        let mut json = NamedTempFile::with_suffix(".json").unwrap();
        json.write_all(serde_json::to_string(&from_yaml).unwrap().as_bytes())
            .unwrap();
        let from_json = Config::from_file(json.path()).unwrap();

        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
