//! Loader configuration.
//!
//! `LoaderConfig` holds the limits and policies every request started by a
//! [`Loader`](crate::net::Loader) runs with. It provides sensible defaults via [`Default`], a
//! fluent [`LoaderConfig::builder()`] with validation, and can be read from JSON.
//!
//! # Examples
//!
//! ```rust
//! use gosub_net::config::{Enforcement, LoaderConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LoaderConfig::builder()
//!     .max_redirects(5)
//!     .combined_response_limit(16 * 1024)
//!     .enforcement(Enforcement::Lenient)
//!     .build()?; // returns Result<LoaderConfig, LoaderConfigError>
//! assert_eq!(cfg.max_redirects, 5);
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `max_redirects`: Redirect hops followed before a request fails with
//!   `ERR_TOO_MANY_REDIRECTS` (default: 20, at most 100).
//! - `channel_capacity`: Transport events buffered per request (default: 64, at least 1).
//! - `combined_response_limit`: Largest body in bytes that may be coalesced into a single
//!   combined notification (default: 64 KiB).
//! - `enforcement`: What happens on an ordering violation (default: strict).

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_REDIRECT_LIMIT: usize = 100;

/// How a channel reacts when a transport breaks the notification order.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforcement {
    /// Fail the request with `ERR_INVALID_RESPONSE` and report the violation
    #[default]
    Strict,
    /// Log and drop the offending notification
    Lenient,
}

impl fmt::Display for Enforcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enforcement::Strict => write!(f, "strict"),
            Enforcement::Lenient => write!(f, "lenient"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub max_redirects: usize,
    pub channel_capacity: usize,
    pub combined_response_limit: usize,
    pub enforcement: Enforcement,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_redirects: 20,
            channel_capacity: crate::net::DEFAULT_CHANNEL_CAPACITY,
            combined_response_limit: 64 * 1024,
            enforcement: Enforcement::Strict,
        }
    }
}

impl LoaderConfig {
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), LoaderConfigError> {
        validate(self)
    }

    /// Reads a config from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: LoaderConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Builder for [`LoaderConfig`].
#[derive(Debug, Clone, Default)]
pub struct LoaderConfigBuilder {
    inner: LoaderConfig,
}

impl LoaderConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut LoaderConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = n) }
    pub fn channel_capacity(self, n: usize) -> Self { self.map(|c| c.channel_capacity = n) }
    pub fn combined_response_limit(self, bytes: usize) -> Self { self.map(|c| c.combined_response_limit = bytes) }
    pub fn enforcement(self, e: Enforcement) -> Self { self.map(|c| c.enforcement = e) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut LoaderConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<LoaderConfig, LoaderConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderConfigError {
    TooManyRedirects(usize),
    ZeroCapacity,
}

impl fmt::Display for LoaderConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderConfigError::TooManyRedirects(n) =>
                write!(f, "max_redirects {n} is out of range (expected 0..={MAX_REDIRECT_LIMIT})"),
            LoaderConfigError::ZeroCapacity =>
                write!(f, "channel_capacity must be at least 1"),
        }
    }
}
impl std::error::Error for LoaderConfigError {}

fn validate(c: &LoaderConfig) -> Result<(), LoaderConfigError> {
    if c.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(LoaderConfigError::TooManyRedirects(c.max_redirects));
    }
    if c.channel_capacity == 0 {
        return Err(LoaderConfigError::ZeroCapacity);
    }
    Ok(())
}
