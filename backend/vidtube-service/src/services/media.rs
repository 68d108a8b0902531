//! Media upload gateway
//!
//! Pushes a locally staged file to the media host and returns its durable
//! URL. The staged file is removed after every attempt, successful or not.

use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media gateway credentials are not configured")]
    NotConfigured,

    #[error("failed to read staged file: {0}")]
    Io(#[from] std::io::Error),

    #[error("media gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media gateway rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("media gateway response carried no URL")]
    MissingUrl,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
    /// Seconds, when the host could probe it
    pub duration: Option<f64>,
}

#[async_trait::async_trait]
pub trait MediaGateway: Send + Sync {
    /// Upload the staged file and consume it
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError>;
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    duration: Option<f64>,
}

/// Cloudinary signed-upload client
pub struct CloudinaryGateway {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryGateway {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.cloud_name
        )
    }

    async fn send(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        if self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(MediaError::NotConfigured);
        }

        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = chrono::Utc::now().timestamp();
        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            )
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", sign_params(timestamp, &self.api_secret));

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let payload: CloudinaryUploadResponse = response.json().await?;
        let url = payload
            .secure_url
            .or(payload.url)
            .ok_or(MediaError::MissingUrl)?;

        Ok(UploadedMedia {
            url,
            duration: payload.duration,
        })
    }
}

/// Signature over the signed parameters, sorted, followed by the secret
fn sign_params(timestamp: i64, api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("timestamp={}{}", timestamp, api_secret).as_bytes());
    hex::encode(hasher.finalize())
}

/// Remove a staged upload, ignoring files that are already gone
pub async fn discard_staged(local_path: &Path) {
    match tokio::fs::remove_file(local_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %local_path.display(),
            error = %e,
            "failed to remove staged upload"
        ),
    }
}

#[async_trait::async_trait]
impl MediaGateway for CloudinaryGateway {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        let result = self.send(local_path).await;
        discard_staged(local_path).await;

        match &result {
            Ok(media) => tracing::info!(url = %media.url, "media uploaded"),
            Err(e) => tracing::error!(error = %e, "media upload failed"),
        }
        crate::metrics::record_media_upload(result.is_ok());

        result
    }
}
