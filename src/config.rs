use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DaybookConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub companion: CompanionConfig,
    pub versioning: VersioningConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub journal_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CompanionConfig {
    pub ollama_url: String,
    pub ollama_model: String,
    pub openai_api_key: String,
    pub openai_model: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VersioningConfig {
    pub enabled: bool,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            companion: CompanionConfig::default(),
            versioning: VersioningConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let journal_dir = default_daybook_dir()
            .join("journal")
            .to_string_lossy()
            .into_owned();
        Self { journal_dir }
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "llama3".into(),
            openai_api_key: String::new(),
            openai_model: "gpt-4.1-mini".into(),
        }
    }
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Returns `~/.daybook/`
pub fn default_daybook_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".daybook")
}

/// Returns the default config file path: `~/.daybook/config.toml`
pub fn default_config_path() -> PathBuf {
    default_daybook_dir().join("config.toml")
}

impl DaybookConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DaybookConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides. `OLLAMA_URL`, `OLLAMA_MODEL`,
    /// and `OPENAI_API_KEY` match what the companion backends conventionally
    /// read; the `DAYBOOK_*` pair is ours.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DAYBOOK_JOURNAL_DIR") {
            self.storage.journal_dir = val;
        }
        if let Ok(val) = std::env::var("DAYBOOK_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("OLLAMA_URL") {
            self.companion.ollama_url = val;
        }
        if let Ok(val) = std::env::var("OLLAMA_MODEL") {
            self.companion.ollama_model = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.companion.openai_api_key = val;
        }
    }

    /// Resolve the journal directory, expanding `~` if needed.
    pub fn resolved_journal_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.journal_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
