//! Conversion of Drive-native documents into portable files.
//!
//! The move workflow only sees [`DocumentConverter`]; how the export is
//! fetched and authenticated is up to the implementation.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::DriveConfig;

pub mod google_drive;

pub use google_drive::{DriveCredentials, GoogleDriveConverter};

#[async_trait]
pub trait DocumentConverter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Convert `source` and return the path of the converted file.
    async fn convert(&self, source: &Path) -> Result<PathBuf>;
}

/// Pick the converter for the current configuration.
///
/// Falls back to [`UnconfiguredConverter`] when no Drive credentials are
/// available, so listing and moving sets without notes still work.
pub fn from_config(config: &DriveConfig) -> Box<dyn DocumentConverter> {
    match GoogleDriveConverter::from_config(config) {
        Ok(converter) => {
            info!("Using {} for document conversion", converter.name());
            Box::new(converter)
        }
        Err(e) => {
            warn!("Document conversion unavailable: {:#}", e);
            Box::new(UnconfiguredConverter::new(format!("{:#}", e)))
        }
    }
}

/// Converter that always fails with the reason conversion is unavailable.
pub struct UnconfiguredConverter {
    reason: String,
}

impl UnconfiguredConverter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DocumentConverter for UnconfiguredConverter {
    fn name(&self) -> &'static str {
        "Unconfigured"
    }

    async fn convert(&self, source: &Path) -> Result<PathBuf> {
        bail!(
            "Cannot convert {}: {}",
            source.display(),
            self.reason
        )
    }
}

/// Contents of a `.gdoc` pointer file written by Google Drive for desktop.
#[derive(Debug, Deserialize)]
struct GdocPointer {
    doc_id: Option<String>,
    url: Option<String>,
}

/// Read the Drive document id out of a `.gdoc` pointer file.
pub fn read_document_id(gdoc_path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(gdoc_path)
        .with_context(|| format!("Failed to read {}", gdoc_path.display()))?;
    parse_document_id(&content)
        .with_context(|| format!("Failed to extract document id from {}", gdoc_path.display()))
}

fn parse_document_id(content: &str) -> Result<String> {
    let pointer: GdocPointer =
        serde_json::from_str(content).context("Invalid .gdoc file contents")?;

    if let Some(id) = pointer.doc_id.filter(|id| !id.trim().is_empty()) {
        return Ok(id.trim().to_string());
    }

    if let Some(url) = pointer.url {
        let url_regex = Regex::new(r"/document/d/([A-Za-z0-9_-]+)")?;
        if let Some(id) = url_regex.captures(&url).and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }
    }

    bail!("No doc_id or document url in .gdoc file")
}

/// Where the converted copy of `source` is written: same directory, `.docx`.
pub fn converted_path(source: &Path) -> PathBuf {
    source.with_extension("docx")
}
