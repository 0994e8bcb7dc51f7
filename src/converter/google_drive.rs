use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::{converted_path, read_document_id, DocumentConverter};
use crate::config::DriveConfig;

const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// OAuth client and refresh token used to mint access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl DriveCredentials {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Drive credentials {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse Drive credentials {}", path.display()))
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Exports Google Docs as `.docx` through the Drive v3 API.
pub struct GoogleDriveConverter {
    client: reqwest::Client,
    credentials: DriveCredentials,
    api_base: String,
    token_uri: String,
}

impl GoogleDriveConverter {
    pub fn new(credentials: DriveCredentials, api_base: &str, token_uri: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            api_base: api_base.trim_end_matches('/').to_string(),
            token_uri: token_uri.to_string(),
        }
    }

    pub fn from_config(config: &DriveConfig) -> Result<Self> {
        let credentials_path = config.credentials_path()?;
        if !credentials_path.exists() {
            bail!(
                "Google Drive credentials not found at {}",
                credentials_path.display()
            );
        }
        let credentials = DriveCredentials::load(&credentials_path)?;

        info!(
            "Initialized Google Drive converter with base URL: {}",
            config.api_base
        );
        Ok(Self::new(credentials, &config.api_base, &config.token_uri))
    }

    /// Exchange the refresh token for a short-lived access token.
    async fn access_token(&self) -> Result<String> {
        let request = RefreshRequest {
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            refresh_token: &self.credentials.refresh_token,
            grant_type: "refresh_token",
        };

        let response = self
            .client
            .post(&self.token_uri)
            .form(&request)
            .send()
            .await
            .context("Failed to request Google access token")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read token response body")?;

        if !status.is_success() {
            error!("Token refresh failed with status {}: {}", status, response_text);
            bail!("Token refresh failed with status {}: {}", status, response_text);
        }

        let token: TokenResponse =
            serde_json::from_str(&response_text).context("Failed to parse token response")?;
        Ok(token.access_token)
    }

    async fn export_docx(&self, document_id: &str, access_token: &str) -> Result<Vec<u8>> {
        let export_url = format!("{}/files/{}/export", self.api_base, document_id);
        debug!("Exporting document {} as docx", document_id);

        let response = self
            .client
            .get(&export_url)
            .query(&[("mimeType", DOCX_MIME_TYPE)])
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to request document export")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Drive export failed with status {}: {}", status, body);

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&body) {
                bail!("Drive API error: {}", error_response.error.message);
            }
            bail!("Drive export failed with status {}: {}", status, body);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to download exported document")?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DocumentConverter for GoogleDriveConverter {
    fn name(&self) -> &'static str {
        "Google Drive export"
    }

    async fn convert(&self, source: &Path) -> Result<PathBuf> {
        let document_id = read_document_id(source)?;
        let output = converted_path(source);

        let access_token = self.access_token().await?;
        let content = self.export_docx(&document_id, &access_token).await?;

        tokio::fs::write(&output, &content)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!(
            "Converted {} -> {} ({} bytes)",
            source.display(),
            output.display(),
            content.len()
        );
        Ok(output)
    }
}
