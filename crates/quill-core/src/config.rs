//! Client configuration: where the collection resource lives and how results merge.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Base address used when no configuration says otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
/// Request timeout used when no configuration says otherwise.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Where a newly created post lands in the local list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPolicy {
    /// Insert at the tail, after every listed post.
    Append,
    /// Insert at the head, newest first.
    #[default]
    Prepend,
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the backend serving `/posts`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Placement of created posts in the local list
    pub insert_policy: InsertPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            insert_policy: InsertPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Get the default config directory path (`~/.quill`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".quill"))
    }

    /// Get the default config file path (`~/.quill/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from `path`, writing the defaults there first if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed or created
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            let config = Self::default();
            config.save_to_file(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            Ok(config)
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        tracing::debug!(
            "Loaded config from {}: base_url={}, insert_policy={:?}",
            path.display(),
            config.base_url,
            config.insert_policy
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;

        let header = "# Quill Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to point the client at another backend\n\n";

        fs::write(path, format!("{header}{contents}"))?;

        Ok(())
    }

    /// Check that the base URL is an absolute http(s) address and the timeout is non-zero.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first problem found
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;
        if self.timeout_seconds == 0 {
            return Err(Error::Config("timeout_seconds must be positive".to_owned()));
        }
        Ok(())
    }

    /// The base URL parsed and checked for an http(s) scheme.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the URL does not parse or uses another scheme
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|error| {
            Error::Config(format!("Invalid base_url '{}': {error}", self.base_url))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::Config(format!(
                "Unsupported scheme '{other}' in base_url '{}'",
                self.base_url
            ))),
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
