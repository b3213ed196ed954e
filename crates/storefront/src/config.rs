//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required when `VITRINE_USE_MOCK_DATA=false`
//! - `VITRINE_BACKEND_URL` - Base URL of the hosted catalog backend
//! - `VITRINE_BACKEND_ANON_KEY` - Public (anon) API key for the backend
//!
//! ## Optional
//! - `VITRINE_USE_MOCK_DATA` - Serve the built-in catalog (default: true)
//! - `VITRINE_CURRENCY` - Display currency (default: EGP)
//! - `VITRINE_ITEMS_PER_PAGE` - Page size for "load more" (default: 12)
//! - `VITRINE_SEARCH_DEBOUNCE_MS` - Search quiet period (default: 300)
//! - `VITRINE_SEARCH_CACHE_CAPACITY` - Cached search queries (default: 50)
//! - `VITRINE_VIRTUAL_THRESHOLD` - List length above which windowing engages (default: 50)
//! - `VITRINE_ITEM_HEIGHT` - Row height for windowed lists (default: 400)
//! - `VITRINE_OVERSCAN` - Extra rows rendered around the viewport (default: 3)
//! - `VITRINE_CATALOG_MAX_RETRIES` - Retries for transient backend failures (default: 3)
//! - `VITRINE_CATALOG_RETRY_BASE_MS` - First retry delay, doubled each attempt (default: 200)
//! - `VITRINE_CATALOG_CACHE_TTL_SECS` - Response cache lifetime (default: 300)
//! - `VITRINE_CART_DIR` - Directory for the persisted cart (default: .vitrine)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;
use vitrine_core::CurrencyCode;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Hosted catalog backend; `None` means the built-in catalog is used
    pub backend: Option<BackendConfig>,
    /// Display currency
    pub currency: CurrencyCode,
    /// Page size used for the "load more" rule
    pub items_per_page: usize,
    /// Search input and cache settings
    pub search: SearchConfig,
    /// Windowed list settings
    pub window: WindowConfig,
    /// Directory holding the persisted cart
    pub cart_dir: PathBuf,
}

/// Hosted catalog backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL (e.g., `https://project.supabase.co`)
    pub url: Url,
    /// Public API key sent with every request
    pub anon_key: SecretString,
    /// Retries for transient failures
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further attempt
    pub retry_base_delay: Duration,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl BackendConfig {
    /// The API key as a plain string, for request headers.
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

/// Search settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period before a keystroke triggers a lookup
    pub debounce: Duration,
    /// Maximum number of cached queries
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            cache_capacity: 50,
        }
    }
}

/// Windowed list settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Lists longer than this are rendered through the windowed renderer
    pub threshold: usize,
    /// Uniform row height
    pub item_height: u32,
    /// Rows rendered beyond each edge of the viewport
    pub overscan: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            threshold: 50,
            item_height: 400,
            overscan: 3,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            backend: None,
            currency: CurrencyCode::default(),
            items_per_page: 12,
            search: SearchConfig::default(),
            window: WindowConfig::default(),
            cart_dir: PathBuf::from(".vitrine"),
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
    /// Returns `ConfigError` if a variable is invalid, or if the backend is
    /// enabled without its URL and key.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let use_mock = parse_or(&lookup, "VITRINE_USE_MOCK_DATA", true)?;
        let backend = if use_mock {
            None
        } else {
            Some(BackendConfig::from_lookup(&lookup)?)
        };

        Ok(Self {
            backend,
            currency: parse_or(&lookup, "VITRINE_CURRENCY", defaults.currency)?,
            items_per_page: parse_or(&lookup, "VITRINE_ITEMS_PER_PAGE", defaults.items_per_page)?,
            search: SearchConfig {
                debounce: Duration::from_millis(parse_or(
                    &lookup,
                    "VITRINE_SEARCH_DEBOUNCE_MS",
                    300,
                )?),
                cache_capacity: parse_or(
                    &lookup,
                    "VITRINE_SEARCH_CACHE_CAPACITY",
                    defaults.search.cache_capacity,
                )?,
            },
            window: WindowConfig {
                threshold: parse_or(&lookup, "VITRINE_VIRTUAL_THRESHOLD", defaults.window.threshold)?,
                item_height: parse_or(&lookup, "VITRINE_ITEM_HEIGHT", defaults.window.item_height)?,
                overscan: parse_or(&lookup, "VITRINE_OVERSCAN", defaults.window.overscan)?,
            },
            cart_dir: lookup("VITRINE_CART_DIR").map_or(defaults.cart_dir, PathBuf::from),
        })
    }

    /// Whether the built-in catalog is served instead of the backend.
    #[must_use]
    pub const fn uses_mock_data(&self) -> bool {
        self.backend.is_none()
    }
}

impl BackendConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = get_required(lookup, "VITRINE_BACKEND_URL")?;
        let url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("VITRINE_BACKEND_URL".to_string(), e.to_string())
        })?;

        let anon_key = get_required(lookup, "VITRINE_BACKEND_ANON_KEY")?;
        validate_not_placeholder(&anon_key, "VITRINE_BACKEND_ANON_KEY")?;

        Ok(Self {
            url,
            anon_key: SecretString::from(anon_key),
            max_retries: parse_or(lookup, "VITRINE_CATALOG_MAX_RETRIES", 3)?,
            retry_base_delay: Duration::from_millis(parse_or(
                lookup,
                "VITRINE_CATALOG_RETRY_BASE_MS",
                200,
            )?),
            cache_ttl: Duration::from_secs(parse_or(
                lookup,
                "VITRINE_CATALOG_CACHE_TTL_SECS",
                300,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required, non-empty variable.
fn get_required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse a variable, falling back to `default` when it is unset or empty.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        _ => Ok(default),
    }
}

/// Reject values that look like unedited placeholders.
fn validate_not_placeholder(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InvalidEnvVar(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}
