use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG: &str = r#"# meet-rec-mover configuration

# Folder Google Drive syncs Meet recordings into
source_dir = "~/Meet Recordings"

# Named destinations offered when moving a recording set
[destinations]
# personal = "~/Documents/MeetRecordings"
# work = "~/Work/Meetings"

# Google Drive export used to turn Gemini notes (.gdoc) into .docx
[drive]
# credentials_path = "~/.config/meet-rec-mover/drive_credentials.json"
api_base = "https://www.googleapis.com/drive/v3"
token_uri = "https://oauth2.googleapis.com/token"
"#;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_dir: String,
    pub destinations: BTreeMap<String, String>,
    pub drive: DriveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// JSON file with client_id, client_secret and refresh_token.
    pub credentials_path: Option<String>,
    pub api_base: String,
    pub token_uri: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: "~/Meet Recordings".to_string(),
            destinations: BTreeMap::new(),
            drive: DriveConfig::default(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            api_base: "https://www.googleapis.com/drive/v3".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }
}

impl DriveConfig {
    pub fn credentials_path(&self) -> Result<PathBuf> {
        match self.credentials_path.as_deref() {
            Some(path) => Ok(global::expand_home(path)),
            None => global::drive_credentials_file(),
        }
    }
}

impl Config {
    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&global::config_file()?)
    }

    /// Load from `config_path`, writing a commented default file if it is missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            write_default(config_path)?;
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {:?}", config_path))?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn source_dir(&self) -> PathBuf {
        global::expand_home(&self.source_dir)
    }

    /// Destinations with `~` expanded, ordered by name.
    pub fn destinations(&self) -> Vec<(String, PathBuf)> {
        self.destinations
            .iter()
            .map(|(name, path)| (name.clone(), global::expand_home(path)))
            .collect()
    }

    pub fn destination(&self, name: &str) -> Option<PathBuf> {
        self.destinations.get(name).map(|p| global::expand_home(p))
    }
}

fn write_default(config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    std::fs::write(config_path, DEFAULT_CONFIG).context("Failed to write config file")?;
    Ok(())
}
