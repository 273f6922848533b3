//! Runtime configuration
//!
//! Loaded from a YAML file. `${VAR}` references are expanded from the
//! environment before parsing so secrets can stay out of the file:
//!
//! ```yaml
//! timezone: Europe/Berlin
//! concurrency: 4
//! http:
//!   timeout_seconds: 30
//!   max_retries: 3
//! credentials:
//!   zohoOAuth2Api:
//!     region: europe
//!     access_token: ${ZOHO_TOKEN}
//! ```

use crate::credentials::{self, CredentialData, ResolvedCredential};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::BackoffType;
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Regex for matching environment references: ${VAR_NAME}
static ENV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

// ============================================================================
// Top-Level Config
// ============================================================================

/// Configuration shared by every node invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// IANA timezone timestamps are converted to
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Number of items executed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Credential data keyed by credential type name
    #[serde(default)]
    pub credentials: HashMap<String, CredentialData>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_concurrency() -> usize {
    1
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            concurrency: default_concurrency(),
            http: HttpConfig::default(),
            credentials: HashMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let expanded = expand_env(yaml)?;
        let config: Self = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.concurrency == 0 {
            return Err(Error::invalid_config("concurrency", "must be at least 1"));
        }
        Ok(())
    }

    /// The configured timezone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            Error::invalid_config(
                "timezone",
                format!("'{}' is not a known IANA timezone", self.timezone),
            )
        })
    }

    /// Client configuration derived from the `http` section
    pub fn http_client_config(&self) -> HttpClientConfig {
        self.http.to_client_config()
    }

    /// Credential data for a credential type
    pub fn credential(&self, name: &str) -> Result<&CredentialData> {
        self.credentials
            .get(name)
            .ok_or_else(|| Error::missing_field(format!("credentials.{name}")))
    }

    /// Resolve the named credential into base URL and auth
    pub fn resolve_credential(&self, name: &str) -> Result<ResolvedCredential> {
        credentials::resolve(name, self.credential(name)?)
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting, `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

impl HttpConfig {
    /// Convert into the client's configuration
    pub fn to_client_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .backoff(
                self.retry_backoff.backoff_type,
                Duration::from_millis(self.retry_backoff.initial_ms),
                Duration::from_millis(self.retry_backoff.max_ms),
            );

        let builder = match &self.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        };
        builder.build()
    }
}

/// Retry backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Backoff type
    #[serde(default, rename = "type")]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::default(),
            initial_ms: default_initial_backoff(),
            max_ms: default_max_backoff(),
        }
    }
}

fn default_initial_backoff() -> u64 {
    1000
}

fn default_max_backoff() -> u64 {
    60_000
}

// ============================================================================
// Environment Expansion
// ============================================================================

/// Replace every `${VAR}` with the variable's value. Unset variables are an
/// error rather than silently becoming empty.
pub fn expand_env(input: &str) -> Result<String> {
    let missing: Vec<&str> = ENV_REGEX
        .captures_iter(input)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| std::env::var(name).is_err())
        .collect();

    if let Some(name) = missing.first() {
        return Err(Error::config(format!(
            "Environment variable '{name}' referenced in config is not set"
        )));
    }

    Ok(ENV_REGEX
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned())
}

// ============================================================================
// Tests
// ============================================================================
