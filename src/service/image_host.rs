// service/image_host.rs
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{config::Config, service::error::ServiceError};

pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Remote storage for property photos.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Stores the image and returns its remote id.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ServiceError>;

    async fn release(&self, remote_image_id: &str) -> Result<(), ServiceError>;

    fn image_url(&self, remote_image_id: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

impl CloudinaryClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            cloud_name: config.cloudinary_cloud_name.clone(),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
            folder: config.cloudinary_folder.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.cloud_name, action
        )
    }

    /// Signs the parameters sorted by name, joined as `k=v&k=v`, with the
    /// api secret appended.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn ensure_configured(&self) -> Result<(), ServiceError> {
        if self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(ServiceError::ImageHost(
                "image host credentials are not configured".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ServiceError> {
        self.ensure_configured()?;

        let public_id = format!("{}/{}_{}", self.folder, Uuid::new_v4(), sanitize_file_name(file_name));
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("overwrite", "true"),
        ]);

        let file = format!("data:{};base64,{}", mime_type(file_name), STANDARD.encode(&bytes));

        let response = self
            .http
            .post(self.endpoint("upload"))
            .form(&[
                ("file", file.as_str()),
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("overwrite", "true"),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::ImageHost(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::ImageHost(format!(
                "upload rejected with status {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ImageHost(e.to_string()))?;

        tracing::info!("Uploaded image {}", body.public_id);

        Ok(body.public_id)
    }

    async fn release(&self, remote_image_id: &str) -> Result<(), ServiceError> {
        self.ensure_configured()?;

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", remote_image_id),
            ("timestamp", timestamp.as_str()),
        ]);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", remote_image_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::ImageHost(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::ImageHost(format!(
                "destroy rejected with status {}",
                response.status()
            )));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ImageHost(e.to_string()))?;

        // "not found" means the image is already gone.
        if body.result != "ok" && body.result != "not found" {
            tracing::warn!("Image host refused to release {}: {}", remote_image_id, body.result);
            return Err(ServiceError::ImageHost(format!(
                "could not release {}: {}",
                remote_image_id, body.result
            )));
        }

        Ok(())
    }

    fn image_url(&self, remote_image_id: &str) -> String {
        format!(
            "https://res.cloudinary.com/{}/image/upload/{}",
            self.cloud_name, remote_image_id
        )
    }
}

/// Lowercased extension of the file name, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn mime_type(file_name: &str) -> &'static str {
    match file_extension(file_name).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = base.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(base);

    let cleaned: String = stem
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}
