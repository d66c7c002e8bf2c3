//! Secrets/config file loading.
//!
//! The file is a flat `key = value` document (a TOML subset): `#` starts a
//! comment outside of strings, strings are double-quoted, integers are bare.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigError;

/// Upper bound accepted for `timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Upper bound accepted for `chunk_size` (16 MiB).
const MAX_CHUNK_SIZE: u64 = 16 * 1024 * 1024;

/// File-backed relay settings. Every field is optional.
#[derive(Clone, Default)]
pub struct FileConfig {
    /// Drime API token. Takes precedence over `DRIME_API_TOKEN`.
    pub api_token: Option<String>,
    /// Drime API base URL.
    pub api_base: Option<String>,
    /// Base URL used to build share links from a returned link hash.
    pub share_base: Option<String>,
    /// Connect/read timeout for the source fetch, in seconds.
    pub timeout_secs: Option<u64>,
    /// Download chunk size in bytes.
    pub chunk_size: Option<u64>,
    /// Parent directory for per-invocation staging directories.
    pub staging_dir: Option<PathBuf>,
    /// User-Agent sent to the source server.
    pub user_agent: Option<String>,
}

impl std::fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("share_base", &self.share_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("chunk_size", &self.chunk_size)
            .field("staging_dir", &self.staging_dir)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl FileConfig {
    /// Validates numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secs) = self.timeout_secs
            && !(1..=MAX_TIMEOUT_SECS).contains(&secs)
        {
            return Err(ConfigError::invalid(format!(
                "Invalid config value for `timeout_secs`: {secs}. Expected range: 1..={MAX_TIMEOUT_SECS}"
            )));
        }
        if let Some(size) = self.chunk_size
            && !(1..=MAX_CHUNK_SIZE).contains(&size)
        {
            return Err(ConfigError::invalid(format!(
                "Invalid config value for `chunk_size`: {size}. Expected range: 1..={MAX_CHUNK_SIZE}"
            )));
        }
        Ok(())
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/drime-relay/config.toml`
/// 2. `$HOME/.config/drime-relay/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("drime-relay")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("drime-relay")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file at `path`, or `None` when it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file exists but cannot be read and
/// [`ConfigError::Invalid`] when it cannot be parsed.
pub fn load_file_config(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&raw).map(Some)
}

pub(crate) fn parse_config_str(raw: &str) -> Result<FileConfig, ConfigError> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::invalid(format!(
                "Invalid config syntax on line {line_no}: expected key = value"
            )));
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "api_token" => cfg.api_token = Some(string_value(key, value, line_no)?),
            "api_base" => cfg.api_base = Some(string_value(key, value, line_no)?),
            "share_base" => cfg.share_base = Some(string_value(key, value, line_no)?),
            "user_agent" => cfg.user_agent = Some(string_value(key, value, line_no)?),
            "staging_dir" => {
                cfg.staging_dir = Some(PathBuf::from(string_value(key, value, line_no)?));
            }
            "timeout_secs" => cfg.timeout_secs = Some(integer_value(key, value, line_no)?),
            "chunk_size" => cfg.chunk_size = Some(integer_value(key, value, line_no)?),
            unknown => {
                return Err(ConfigError::invalid(format!(
                    "Unknown configuration key: '{unknown}' on line {line_no}"
                )));
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn string_value(key: &str, value: &str, line_no: usize) -> Result<String, ConfigError> {
    parse_string_literal(value).ok_or_else(|| {
        ConfigError::invalid(format!(
            "Invalid `{key}` value on line {line_no}: expected double-quoted string"
        ))
    })
}

fn integer_value(key: &str, value: &str, line_no: usize) -> Result<u64, ConfigError> {
    parse_integer_u64(value).ok_or_else(|| {
        ConfigError::invalid(format!(
            "Invalid `{key}` value on line {line_no}: expected non-negative integer"
        ))
    })
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Option<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        return None;
    }
    Some(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Option<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        return None;
    }
    token.parse::<u64>().ok()
}
