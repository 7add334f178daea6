//! Hitchyard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HITCHYARD_BASE_URL` - Public URL for the site (decides secure cookies)
//!
//! ## Optional
//! - `HITCHYARD_HOST` - Bind address (default: 127.0.0.1)
//! - `HITCHYARD_PORT` - Listen port (default: 3000)
//! - `SUPABASE_URL` - Supabase project URL
//! - `SUPABASE_ANON_KEY` - Supabase anon (public) API key
//! - `VETTING_WEBHOOK_URL` - CRM webhook notified of vetting requests
//! - `WEBHOOK_TIMEOUT_SECS` - Webhook request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)
//!
//! The app starts without `SUPABASE_URL` / `SUPABASE_ANON_KEY`; every
//! marketplace action then reports that the configuration is missing.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Webhook notified when a carrier applies for vetting.
pub const DEFAULT_VETTING_WEBHOOK_URL: &str =
    "https://airtable.com/app4qYpj81N8RlSaa/wflfG0IarWWfoJCcm";

const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Hitchyard application configuration.
#[derive(Debug, Clone)]
pub struct HitchyardConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Supabase project, if configured
    pub supabase: Option<SupabaseConfig>,
    /// Vetting webhook
    pub webhook: WebhookConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Error event sample rate
    pub sentry_sample_rate: f32,
    /// Performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Supabase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, always ending in `/`
    pub url: Url,
    /// Anon API key sent as `apikey`
    pub anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Outbound vetting webhook configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint receiving vetting notifications
    pub url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HitchyardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HITCHYARD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HITCHYARD_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("HITCHYARD_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("HITCHYARD_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("HITCHYARD_BASE_URL")?;

        let supabase = SupabaseConfig::from_parts(
            get_optional_env("SUPABASE_URL"),
            get_optional_env("SUPABASE_ANON_KEY"),
        )?;
        let webhook = WebhookConfig::from_parts(
            get_optional_env("VETTING_WEBHOOK_URL"),
            get_optional_env("WEBHOOK_TIMEOUT_SECS"),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            supabase,
            webhook,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_sample_rate(
                "SENTRY_SAMPLE_RATE",
                get_optional_env("SENTRY_SAMPLE_RATE"),
                1.0,
            )?,
            sentry_traces_sample_rate: parse_sample_rate(
                "SENTRY_TRACES_SAMPLE_RATE",
                get_optional_env("SENTRY_TRACES_SAMPLE_RATE"),
                0.0,
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SupabaseConfig {
    /// Build from the raw URL and key.
    ///
    /// Returns `Ok(None)` when either value is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse or the key looks like
    /// a placeholder.
    pub fn from_parts(url: Option<String>, key: Option<String>) -> Result<Option<Self>, ConfigError> {
        let (Some(url), Some(key)) = (non_blank(url), non_blank(key)) else {
            return Ok(None);
        };

        let mut url = Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        validate_secret_strength(&key, "SUPABASE_ANON_KEY")?;

        Ok(Some(Self {
            url,
            anon_key: SecretString::from(key),
        }))
    }

    /// Expose the anon key for request headers.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

impl WebhookConfig {
    /// Build from the raw URL override and timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL or timeout does not parse.
    pub fn from_parts(url: Option<String>, timeout_secs: Option<String>) -> Result<Self, ConfigError> {
        let url = non_blank(url).unwrap_or_else(|| DEFAULT_VETTING_WEBHOOK_URL.to_string());
        let url = Url::parse(&url).map_err(|e| {
            ConfigError::InvalidEnvVar("VETTING_WEBHOOK_URL".to_string(), e.to_string())
        })?;

        let timeout_secs = match non_blank(timeout_secs) {
            Some(value) => value.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("WEBHOOK_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_WEBHOOK_TIMEOUT_SECS,
        };

        Ok(Self {
            url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a Sentry sample rate in `0.0..=1.0`.
fn parse_sample_rate(key: &str, value: Option<String>, default: f32) -> Result<f32, ConfigError> {
    let Some(value) = non_blank(value) else {
        return Ok(default);
    };

    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a key is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the key from the Supabase dashboard."
            ),
        ));
    }

    Ok(())
}
