use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::client::DEFAULT_API_BASE;
use crate::core::storage::FileStore;

/// Environment variable that overrides `api-base`.
pub const API_BASE_ENV: &str = "FISHERMAN_API_BASE";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL, e.g. "https://example.com/api"
    pub api_base: Option<String>,
    /// Keep the bearer token in the OS keyring instead of the state file
    pub use_keyring: Option<bool>,
    /// Where session, theme and locale state is kept
    pub storage_path: Option<PathBuf>,
}

/// Settable configuration keys, spelled the way the CLI spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiBase,
    UseKeyring,
    StoragePath,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::ApiBase,
        ConfigKey::UseKeyring,
        ConfigKey::StoragePath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ApiBase => "api-base",
            ConfigKey::UseKeyring => "use-keyring",
            ConfigKey::StoragePath => "storage-path",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value.trim().replace('_', "-"))
            .ok_or_else(|| {
                let known: Vec<&str> = ConfigKey::ALL.iter().map(|key| key.as_str()).collect();
                format!("unknown config key '{value}' (expected one of: {})", known.join(", "))
            })
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on/off, got '{other}'")),
    }
}

/// Format a path for display, abbreviating the home directory to `~`.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    /// Effective backend base: environment, then config file, then the
    /// local development default.
    pub fn api_base(&self) -> String {
        self.api_base_with_env(std::env::var(API_BASE_ENV).ok())
    }

    pub(crate) fn api_base_with_env(&self, env: Option<String>) -> String {
        env.filter(|value| !value.trim().is_empty())
            .or_else(|| self.api_base.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    pub fn use_keyring(&self) -> bool {
        self.use_keyring.unwrap_or(true)
    }

    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path.clone().or_else(FileStore::default_path)
    }

    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("{key} needs a value"));
        }
        match key {
            ConfigKey::ApiBase => {
                reqwest::Url::parse(value).map_err(|err| format!("invalid URL '{value}': {err}"))?;
                self.api_base = Some(value.to_string());
            }
            ConfigKey::UseKeyring => self.use_keyring = Some(parse_bool(value)?),
            ConfigKey::StoragePath => self.storage_path = Some(PathBuf::from(value)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ApiBase => self.api_base = None,
            ConfigKey::UseKeyring => self.use_keyring = None,
            ConfigKey::StoragePath => self.storage_path = None,
        }
    }
}
