//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$EMLTEXT_CONFIG` (environment variable)
//! 2. `~/.config/emltext/config.toml` (Linux/macOS)
//!    `%APPDATA%\emltext\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags override whatever the file provides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What to do when a header fragment or body leaf declares a charset that is
/// unknown, or whose bytes do not decode cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BadCharsetPolicy {
    /// Decode lossily, replacing undecodable sequences with U+FFFD.
    /// Preserves fragment count and alignment; never fails.
    #[default]
    Substitute,
    /// Drop the undecodable fragment entirely. For `text/*` body parts the
    /// MIME parser flags the decode error and the whole leaf is dropped.
    Ignore,
    /// Ignore the declared charset and decode the bytes as lossy UTF-8.
    /// Applies to headers and binary body leaves; `text/*` leaves arrive
    /// from the MIME parser with their declared charset already applied.
    ForceUtf8,
}

/// What to do with a body leaf that declares neither a filename nor a charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingCharsetPolicy {
    /// Decode the payload as lossy UTF-8. Content is never silently lost.
    #[default]
    Substitute,
    /// Contribute nothing to the body.
    Drop,
}

/// What to do when the computed output filename already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Append the new report to the existing file.
    #[default]
    Append,
    /// Truncate and replace the existing file.
    Overwrite,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging behavior.
    pub general: GeneralConfig,
    /// Output location and collision handling.
    pub output: OutputConfig,
    /// Charset failure policies.
    pub decode: DecodeConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// When set, per-file failures are also appended to `emltext.log`
    /// inside this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated `.txt` reports. Defaults to the current
    /// directory, but always passed explicitly to the writer.
    pub dir: PathBuf,
    /// Duplicate subject+date handling.
    pub on_collision: CollisionPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            on_collision: CollisionPolicy::default(),
        }
    }
}

/// Decode policy settings. See [`BadCharsetPolicy`] and
/// [`MissingCharsetPolicy`] for the semantics of each choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    pub charset_errors: BadCharsetPolicy,
    pub missing_charset: MissingCharsetPolicy,
}

/// Locate the config file path, if any.
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("EMLTEXT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("emltext").join("config.toml"))
}

/// Load configuration, falling back to defaults on any problem.
///
/// A missing file is normal; a malformed file is reported and ignored.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
            Config::default()
        }
    }
}
