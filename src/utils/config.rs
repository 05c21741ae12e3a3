use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "basetrie";
const CONFIG_FILE: &str = "config.json";

/// How reads are normalized and validated on the way into a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Uppercase reads before validation, so `acgt` is accepted as `ACGT`
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,

    /// Skip reads containing symbols outside N/A/T/C/G instead of failing
    #[serde(default = "default_skip_invalid")]
    pub skip_invalid: bool,

    /// Reads shorter than this are dropped
    #[serde(default = "default_min_read_len")]
    pub min_read_len: usize,

    /// Answer suffix queries from the per-symbol sharded index
    #[serde(default = "default_parallel_shards")]
    pub parallel_shards: bool,
}

fn default_case_insensitive() -> bool {
    true
}

fn default_skip_invalid() -> bool {
    false
}

fn default_min_read_len() -> usize {
    1
}

fn default_parallel_shards() -> bool {
    false
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            case_insensitive: default_case_insensitive(),
            skip_invalid: default_skip_invalid(),
            min_read_len: default_min_read_len(),
            parallel_shards: default_parallel_shards(),
        }
    }
}

impl IngestConfig {
    /// Load from an explicit file, else the user config file, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: IngestConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("loaded ingest config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }
}

/// `<config dir>/basetrie/config.json`, if the platform has a config dir
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_NAME).join(CONFIG_FILE))
}
