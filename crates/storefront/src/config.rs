//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `BANDMERCH_BACKEND_ENDPOINT` - Managed backend endpoint (http or https URL)
//! - `BANDMERCH_BACKEND_API_KEY` - Backend API key
//! - `BANDMERCH_PREFERENCES_PATH` - Preference file (default: bandmerch-preferences.json)
//! - `BANDMERCH_CATALOG_PATH` - JSON array of bands to seed the catalog with
//! - `BANDMERCH_LOG_JSON` - Emit JSON logs (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_PREFERENCES_PATH: &str = "bandmerch-preferences.json";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Managed backend connection
    pub backend: BackendConfig,
    /// Where device preferences are stored
    pub preferences_path: PathBuf,
    /// Optional catalog seed file
    pub catalog_path: Option<PathBuf>,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Managed backend connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone, Default)]
pub struct BackendConfig {
    /// Backend endpoint
    pub endpoint: Option<Url>,
    /// Backend API key
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl BackendConfig {
    /// Whether a remote backend is configured. Without one the in-memory
    /// collaborators are used.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.endpoint.is_some()
    }

    /// The API key, for adapters that need to send it.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(ExposeSecret::expose_secret)
    }
}

/// Sentry error tracking settings.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
            catalog_path: None,
            log_json: false,
            sentry: SentryConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value or the
    /// API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let endpoint = env
            .optional("BANDMERCH_BACKEND_ENDPOINT")
            .map(|raw| parse_endpoint("BANDMERCH_BACKEND_ENDPOINT", &raw))
            .transpose()?;
        let api_key = env
            .optional("BANDMERCH_BACKEND_API_KEY")
            .map(|raw| validated_secret("BANDMERCH_BACKEND_API_KEY", raw))
            .transpose()?;

        let preferences_path = PathBuf::from(
            env.or_default("BANDMERCH_PREFERENCES_PATH", DEFAULT_PREFERENCES_PATH),
        );
        let catalog_path = env.optional("BANDMERCH_CATALOG_PATH").map(PathBuf::from);
        let log_json = env
            .optional("BANDMERCH_LOG_JSON")
            .map(|raw| parse_bool("BANDMERCH_LOG_JSON", &raw))
            .transpose()?
            .unwrap_or(false);

        let sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .map(|raw| parse_sample_rate("SENTRY_SAMPLE_RATE", &raw))
            .transpose()?
            .unwrap_or(1.0);

        Ok(Self {
            backend: BackendConfig { endpoint, api_key },
            preferences_path,
            catalog_path,
            log_json,
            sentry: SentryConfig {
                dsn: env.optional("SENTRY_DSN"),
                environment: env.optional("SENTRY_ENVIRONMENT"),
                sample_rate,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_endpoint(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{other}', expected http or https"),
        )),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{raw}'"),
        )),
    }
}

fn parse_sample_rate(key: &str, raw: &str) -> Result<f32, ConfigError> {
    let rate = raw
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

fn validated_secret(key: &str, value: String) -> Result<SecretString, ConfigError> {
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(!config.backend.is_remote());
        assert_eq!(
            config.preferences_path,
            PathBuf::from("bandmerch-preferences.json")
        );
        assert!(config.catalog_path.is_none());
        assert!(!config.log_json);
        assert!((config.sentry.sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_full_config() {
        let config = load(&[
            ("BANDMERCH_BACKEND_ENDPOINT", "https://api.bandmerch.test/graphql"),
            ("BANDMERCH_BACKEND_API_KEY", "da2-k7Fq9ZpX3mWv8RtYc1Ls"),
            ("BANDMERCH_PREFERENCES_PATH", "/tmp/prefs.json"),
            ("BANDMERCH_CATALOG_PATH", "bands.json"),
            ("BANDMERCH_LOG_JSON", "true"),
            ("SENTRY_ENVIRONMENT", "staging"),
            ("SENTRY_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();

        assert!(config.backend.is_remote());
        assert_eq!(config.backend.api_key(), Some("da2-k7Fq9ZpX3mWv8RtYc1Ls"));
        assert_eq!(config.catalog_path, Some(PathBuf::from("bands.json")));
        assert!(config.log_json);
        assert_eq!(config.sentry.environment.as_deref(), Some("staging"));
        assert!((config.sentry.sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("BANDMERCH_BACKEND_ENDPOINT", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert!(config.backend.endpoint.is_none());
        assert!(config.sentry.dsn.is_none());
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = load(&[("BANDMERCH_BACKEND_ENDPOINT", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "BANDMERCH_BACKEND_ENDPOINT"));

        let err = load(&[("BANDMERCH_BACKEND_ENDPOINT", "ftp://files.test")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_invalid_bool_and_rate() {
        assert!(matches!(
            load(&[("BANDMERCH_LOG_JSON", "maybe")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("SENTRY_SAMPLE_RATE", "1.5")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("SENTRY_SAMPLE_RATE", "lots")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_placeholder_api_key_rejected() {
        let err = load(&[("BANDMERCH_BACKEND_API_KEY", "your-api-key-here")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));

        let err = load(&[("BANDMERCH_BACKEND_API_KEY", "aaaaaaaaaaaaaaaa")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_backend_debug_redacts_key() {
        let backend = BackendConfig {
            endpoint: Some(Url::parse("https://api.bandmerch.test").unwrap()),
            api_key: Some(SecretString::from("super_secret_api_key")),
        };
        let debug_output = format!("{backend:?}");
        assert!(debug_output.contains("api.bandmerch.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }
}
