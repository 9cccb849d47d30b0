//! HTTP client for the product analysis backend.

use super::models::{image_mime, ImageSet, RawAnalysisResult, ScanIntent, SortMode};
use crate::config::Config;
use crate::error::ServiceError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use wreq::multipart::{Form, Part};
use wreq::Client;

/// Trait for analysis backend calls - enables mocking for tests.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Submits images for authenticity verification.
    async fn verify(&self, images: &ImageSet) -> Result<RawAnalysisResult>;

    /// Submits images for an online price check.
    async fn check_price(&self, images: &ImageSet, sort: SortMode) -> Result<RawAnalysisResult>;

    /// Submits images for detail extraction.
    async fn details(&self, images: &ImageSet) -> Result<RawAnalysisResult>;
}

/// Dispatches to the call matching an intent.
pub async fn submit(
    api: &(impl AnalysisApi + ?Sized),
    intent: ScanIntent,
    images: &ImageSet,
    sort: SortMode,
) -> Result<RawAnalysisResult> {
    match intent {
        ScanIntent::Verify => api.verify(images).await,
        ScanIntent::Price => api.check_price(images, sort).await,
        ScanIntent::Details => api.details(images).await,
    }
}

/// Multipart HTTP client for the `/verify`, `/price` and `/details` endpoints.
pub struct AnalysisClient {
    client: Client,
    base_url: String,
    legacy_upload: bool,
}

impl AnalysisClient {
    /// Creates a client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().gzip(true).brotli(true);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            legacy_upload: config.legacy_upload,
        })
    }

    /// Creates a client against a custom base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let config = Config { api_url: base_url.into(), ..Config::default() };
        Self::new(&config)
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the multipart body from the image set.
    async fn form(&self, images: &ImageSet) -> Result<Form> {
        if images.is_empty() {
            return Err(ServiceError::MissingImage.into());
        }

        let mut form = Form::new();

        if self.legacy_upload {
            // Older backends accept a single `file` part.
            if let Some(path) = images.primary() {
                form = form.part("file", image_part(path).await?);
            }
            return Ok(form);
        }

        for (field, path) in images.parts() {
            form = form.part(field, image_part(path).await?);
        }

        Ok(form)
    }

    /// POSTs a multipart form and decodes the JSON response.
    async fn post(&self, endpoint: &str, images: &ImageSet) -> Result<RawAnalysisResult> {
        let form = self.form(images).await?;
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|source| ServiceError::Transport { endpoint: endpoint.to_string(), source })?;

        let status = response.status();
        debug!("Response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|source| ServiceError::Transport { endpoint: endpoint.to_string(), source })?;

        if !status.is_success() {
            return Err(ServiceError::Server {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let value = serde_json::from_str(&body)
            .map_err(|source| ServiceError::Decode { endpoint: endpoint.to_string(), source })?;

        Ok(RawAnalysisResult::new(value))
    }
}

/// Reads an image from disk into a named multipart part.
async fn image_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ServiceError::Io { path: path.display().to_string(), source })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.jpg")
        .to_string();

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(&image_mime(path))
        .context("Invalid image MIME type")
}

#[async_trait]
impl AnalysisApi for AnalysisClient {
    async fn verify(&self, images: &ImageSet) -> Result<RawAnalysisResult> {
        info!("Submitting images for verification");
        self.post(ScanIntent::Verify.endpoint(), images).await
    }

    async fn check_price(&self, images: &ImageSet, sort: SortMode) -> Result<RawAnalysisResult> {
        info!("Checking prices (sort: {})", sort);
        let endpoint = format!("{}?sort={}", ScanIntent::Price.endpoint(), sort.as_query());
        self.post(&endpoint, images).await
    }

    async fn details(&self, images: &ImageSet) -> Result<RawAnalysisResult> {
        info!("Requesting product details");
        self.post(ScanIntent::Details.endpoint(), images).await
    }
}
