//! User-tunable settings.
//!
//! Persisted as JSON with the keys `iterations` and `maxDecryptSizeMB`.
//! Every value is clamped into its accepted range on construction and on
//! load, so a [`Config`] in hand is always usable as-is.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::crypto::{DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS, clamp_iterations};
use crate::storage::Storage;

pub const MIN_DECRYPT_SIZE_MB: u32 = 1;
pub const MAX_DECRYPT_SIZE_MB: u32 = 100;
pub const DEFAULT_DECRYPT_SIZE_MB: u32 = 20;

/// Clamps the decrypt size limit into `[1, 100]` MB.
pub fn clamp_max_size_mb(size_mb: u32) -> u32 {
    size_mb.clamp(MIN_DECRYPT_SIZE_MB, MAX_DECRYPT_SIZE_MB)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredConfig", into = "StoredConfig")]
pub struct Config {
    iterations: u32,
    max_decrypt_size_mb: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            max_decrypt_size_mb: DEFAULT_DECRYPT_SIZE_MB,
        }
    }
}

impl Config {
    pub fn new(iterations: u32, max_decrypt_size_mb: u32) -> Self {
        Self {
            iterations: clamp_iterations(iterations),
            max_decrypt_size_mb: clamp_max_size_mb(max_decrypt_size_mb),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn max_decrypt_size_mb(&self) -> u32 {
        self.max_decrypt_size_mb
    }

    pub fn with_iterations(self, iterations: u32) -> Self {
        Self::new(iterations, self.max_decrypt_size_mb)
    }

    pub fn with_max_decrypt_size_mb(self, max_decrypt_size_mb: u32) -> Self {
        Self::new(self.iterations, max_decrypt_size_mb)
    }

    /// Loads the configuration stored in `storage`, or the defaults if
    /// nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(storage: &Storage) -> Result<Self> {
        if !storage.exists() {
            tracing::debug!(path = %storage.path().display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let data = storage.load()?;
        serde_json::from_slice(&data)
            .with_context(|| format!("failed to parse config {}", storage.path().display()))
    }

    /// Writes the configuration to `storage` atomically.
    pub fn save(&self, storage: &Storage) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        storage.save(&data)
    }
}

/// On-disk shape. Wide signed integers so that out-of-range values written by
/// hand are clamped instead of failing to parse.
#[derive(Serialize, Deserialize)]
#[serde(default)]
struct StoredConfig {
    iterations: i64,
    #[serde(rename = "maxDecryptSizeMB")]
    max_decrypt_size_mb: i64,
}

impl Default for StoredConfig {
    fn default() -> Self {
        Config::default().into()
    }
}

impl From<StoredConfig> for Config {
    fn from(stored: StoredConfig) -> Self {
        Self {
            iterations: stored
                .iterations
                .clamp(MIN_ITERATIONS.into(), MAX_ITERATIONS.into()) as u32,
            max_decrypt_size_mb: stored
                .max_decrypt_size_mb
                .clamp(MIN_DECRYPT_SIZE_MB.into(), MAX_DECRYPT_SIZE_MB.into())
                as u32,
        }
    }
}

impl From<Config> for StoredConfig {
    fn from(config: Config) -> Self {
        Self {
            iterations: config.iterations.into(),
            max_decrypt_size_mb: config.max_decrypt_size_mb.into(),
        }
    }
}

/// Platform config location, e.g. `~/.config/secure-blocks/config.json`.
pub fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "secure-blocks")
        .context("could not determine platform directories")?;

    Ok(project_dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_documented_values() {
        let config = Config::default();
        assert_eq!(config.iterations(), 600_000);
        assert_eq!(config.max_decrypt_size_mb(), 20);
    }

    #[test]
    fn constructor_clamps_both_fields() {
        let low = Config::new(1, 0);
        assert_eq!(low.iterations(), MIN_ITERATIONS);
        assert_eq!(low.max_decrypt_size_mb(), MIN_DECRYPT_SIZE_MB);

        let high = Config::new(u32::MAX, 500);
        assert_eq!(high.iterations(), MAX_ITERATIONS);
        assert_eq!(high.max_decrypt_size_mb(), MAX_DECRYPT_SIZE_MB);
    }

    #[test]
    fn json_uses_camel_case_size_key() {
        let json = serde_json::to_value(Config::new(150_000, 5)).unwrap();
        assert_eq!(json["iterations"], 150_000);
        assert_eq!(json["maxDecryptSizeMB"], 5);
    }

    #[test]
    fn parsing_clamps_and_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"iterations": -3}"#).unwrap();
        assert_eq!(config.iterations(), MIN_ITERATIONS);
        assert_eq!(config.max_decrypt_size_mb(), DEFAULT_DECRYPT_SIZE_MB);

        let config: Config = serde_json::from_str(r#"{"maxDecryptSizeMB": 4096}"#).unwrap();
        assert_eq!(config.iterations(), DEFAULT_ITERATIONS);
        assert_eq!(config.max_decrypt_size_mb(), MAX_DECRYPT_SIZE_MB);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("config.json"));
        assert_eq!(Config::load(&storage).unwrap(), Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("nested").join("config.json"));

        let config = Config::new(200_000, 8);
        config.save(&storage).unwrap();

        assert_eq!(Config::load(&storage).unwrap(), config);
    }

    #[test]
    fn malformed_file_fails() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("config.json"));
        storage.save(b"not json").unwrap();

        assert!(Config::load(&storage).is_err());
    }
}
