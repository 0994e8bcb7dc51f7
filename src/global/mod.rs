use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "meet-rec-mover";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .context("Unable to determine config directory")
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn drive_credentials_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("drive_credentials.json"))
}

/// Expand a leading `~` to the home directory. Other paths pass through.
pub fn expand_home(path: &str) -> PathBuf {
    let path = path.trim();
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    Path::new(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("~/Meet Recordings"), home.join("Meet Recordings"));
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("/srv/meet"), PathBuf::from("/srv/meet"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
    }
}
