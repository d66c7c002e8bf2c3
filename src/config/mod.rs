//! Relay configuration: the Drime credential plus transfer settings.
//!
//! Configuration is resolved once at startup and handed to
//! [`Relay::new`](crate::relay::Relay::new). A missing credential is a fatal
//! startup error; no network traffic happens before it is resolved.

mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::download::constants::{CHUNK_SIZE, TIMEOUT_SECS};
use crate::user_agent;

pub use file::{FileConfig, load_file_config, resolve_default_config_path};

/// Default Drime API base.
pub const DEFAULT_API_BASE: &str = "https://app.drime.cloud/api/v1";

/// Default base for share URLs built from a link hash.
pub const DEFAULT_SHARE_BASE: &str = "https://app.drime.cloud/drive/shares";

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "DRIME_API_TOKEN";

/// Environment variable overriding the API base.
pub const API_BASE_ENV_VAR: &str = "DRIME_API_BASE";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API token in the config file or environment.
    #[error(
        "missing Drime API token: set `api_token` in the config file or the DRIME_API_TOKEN environment variable"
    )]
    MissingCredential,

    /// Config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file or value is malformed.
    #[error("{message}")]
    Invalid {
        /// Description naming the key and line.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Bearer credential for the Drime API.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a raw token, trimming whitespace. Returns `None` for blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Resolved settings for one relay process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Drime bearer token.
    pub api_token: ApiToken,
    /// Drime API base, without trailing slash.
    pub api_base: String,
    /// Share URL base used when the API returns only a link hash.
    pub share_base: String,
    /// Connect and per-read timeout for the source fetch.
    pub timeout: Duration,
    /// Download chunk size in bytes.
    pub chunk_size: usize,
    /// Parent directory for staging directories (`None` = system temp dir).
    pub staging_root: Option<PathBuf>,
    /// User-Agent sent to the source server.
    pub user_agent: String,
}

impl RelayConfig {
    /// Creates a config with default settings around `api_token`.
    #[must_use]
    pub fn new(api_token: ApiToken) -> Self {
        Self {
            api_token,
            api_base: DEFAULT_API_BASE.to_string(),
            share_base: DEFAULT_SHARE_BASE.to_string(),
            timeout: Duration::from_secs(TIMEOUT_SECS),
            chunk_size: CHUNK_SIZE,
            staging_root: None,
            user_agent: user_agent::browser_user_agent().to_string(),
        }
    }

    /// Overrides the API base.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = trim_base(api_base.into());
        self
    }

    /// Overrides the share URL base.
    #[must_use]
    pub fn with_share_base(mut self, share_base: impl Into<String>) -> Self {
        self.share_base = trim_base(share_base.into());
        self
    }

    /// Overrides the staging root.
    #[must_use]
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Overrides the source fetch timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the download chunk size. Zero is ignored.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        if chunk_size > 0 {
            self.chunk_size = chunk_size;
        }
        self
    }

    /// Merges file settings with environment lookups.
    ///
    /// The token comes from the file first, then `DRIME_API_TOKEN`.
    /// `DRIME_API_BASE` overrides the file's `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when no non-blank token is
    /// found, or [`ConfigError::Invalid`] for out-of-range values.
    pub fn resolve<F>(file: Option<&FileConfig>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = file
            .and_then(|cfg| cfg.api_token.clone())
            .and_then(ApiToken::new)
            .or_else(|| env(TOKEN_ENV_VAR).and_then(ApiToken::new))
            .ok_or(ConfigError::MissingCredential)?;

        let mut config = Self::new(api_token);
        let Some(file) = file else {
            if let Some(base) = env(API_BASE_ENV_VAR).filter(|b| !b.trim().is_empty()) {
                config = config.with_api_base(base);
            }
            return Ok(config);
        };

        file.validate()?;
        if let Some(base) = env(API_BASE_ENV_VAR)
            .filter(|b| !b.trim().is_empty())
            .or_else(|| file.api_base.clone())
        {
            config = config.with_api_base(base);
        }
        if let Some(share_base) = &file.share_base {
            config = config.with_share_base(share_base.clone());
        }
        if let Some(secs) = file.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(size) = file.chunk_size {
            let size = usize::try_from(size)
                .map_err(|_| ConfigError::invalid("`chunk_size` out of range for usize"))?;
            config = config.with_chunk_size(size);
        }
        if let Some(dir) = &file.staging_dir {
            config = config.with_staging_root(dir.clone());
        }
        if let Some(ua) = file.user_agent.as_deref().filter(|ua| !ua.trim().is_empty()) {
            config.user_agent = ua.to_string();
        }
        Ok(config)
    }

    /// Loads the config file (explicit path or default location) and the
    /// process environment.
    ///
    /// # Errors
    ///
    /// See [`RelayConfig::resolve`] and [`load_file_config`].
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(resolve_default_config_path);
        let file = match path.as_deref() {
            Some(path) => {
                let loaded = load_file_config(path)?;
                debug!(path = %path.display(), found = loaded.is_some(), "config file lookup");
                loaded
            }
            None => None,
        };
        Self::resolve(file.as_ref(), |name| std::env::var(name).ok())
    }
}

fn trim_base(base: String) -> String {
    base.trim().trim_end_matches('/').to_string()
}
