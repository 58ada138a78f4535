use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};

/// Default base directory for all lexdrill storage.
pub fn default_base_dir() -> PathBuf {
    if let Ok(dir) = env::var("LEXDRILL_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs_home().join(".lexdrill")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn default_batch_size() -> usize {
    20
}

fn default_first_try_bonus() -> u64 {
    10
}

fn default_completion_bonus() -> u64 {
    50
}

/// Tunables read from `config.toml` in the data directory. Every field
/// has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batch_size: usize,
    pub first_try_bonus: u64,
    pub completion_bonus: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            first_try_bonus: default_first_try_bonus(),
            completion_bonus: default_completion_bonus(),
        }
    }
}

impl Config {
    /// Load config from `<base_dir>/config.toml`. A missing file yields
    /// defaults silently; a malformed file yields defaults with a warning
    /// rather than refusing to start.
    pub fn load(base_dir: &Path) -> Self {
        let path = base_dir.join("config.toml");
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(content: &str, origin: &str) -> Self {
        match toml::from_str::<Self>(content) {
            Ok(mut config) => {
                if config.batch_size == 0 {
                    tracing::warn!("{origin}: batch_size must be at least 1, using default");
                    config.batch_size = default_batch_size();
                }
                config
            }
            Err(e) => {
                tracing::warn!("{origin}: unreadable config, using defaults: {e}");
                Self::default()
            }
        }
    }
}
