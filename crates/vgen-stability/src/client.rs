//! Generation service HTTP client.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use vgen_models::GenerationId;

use crate::error::{StabilityError, StabilityResult};
use crate::types::{GenerationPoll, SubmitOutcome};

// Fixed generation parameters sent with every submission.
const SEED: &str = "0";
const CFG_SCALE: &str = "1.8";
const MOTION_BUCKET_ID: &str = "127";

/// Configuration for the generation client.
#[derive(Debug, Clone)]
pub struct StabilityConfig {
    /// Base URL of the generation endpoint
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl StabilityConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StabilityResult<Self> {
        let base_url = std::env::var("STABILITY_AI_URL")
            .map_err(|_| StabilityError::Config("STABILITY_AI_URL is not set".into()))?;
        let api_key = std::env::var("STABILITY_AI_API_KEY")
            .map_err(|_| StabilityError::Config("STABILITY_AI_API_KEY is not set".into()))?;

        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(
                std::env::var("STABILITY_AI_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        })
    }
}

/// Client for the external image-to-video generation service.
#[derive(Clone)]
pub struct StabilityClient {
    http: Client,
    config: StabilityConfig,
}

impl StabilityClient {
    /// Create a new generation client.
    pub fn new(config: StabilityConfig) -> StabilityResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(StabilityError::Unreachable)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> StabilityResult<Self> {
        Self::new(StabilityConfig::from_env()?)
    }

    /// Submit a prepared still image for video generation.
    ///
    /// Posts the image with the fixed generation parameters and returns
    /// the raw status and body for any response, including non-2xx.
    pub async fn submit(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> StabilityResult<SubmitOutcome> {
        let form = Form::new()
            .part(
                "image",
                Part::bytes(image)
                    .file_name(filename.to_string())
                    .mime_str("image/png")
                    .map_err(|_| StabilityError::Config("invalid image mime".into()))?,
            )
            .text("seed", SEED)
            .text("cfg_scale", CFG_SCALE)
            .text("motion_bucket_id", MOTION_BUCKET_ID);

        debug!(url = %self.config.base_url, filename, "Submitting image for generation");

        let response = self
            .http
            .post(&self.config.base_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(StabilityError::Unreachable)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(StabilityError::Body)?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        if status >= 400 {
            warn!(status, "Generation service answered submission with an error status");
        }

        Ok(SubmitOutcome { status, body })
    }

    /// Check one generation for completion, requesting binary video content.
    pub async fn fetch_result(&self, generation_id: &GenerationId) -> StabilityResult<GenerationPoll> {
        let url = format!("{}/result/{}", self.config.base_url, generation_id);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(ACCEPT, "video/*")
            .send()
            .await
            .map_err(StabilityError::Unreachable)?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(GenerationPoll::Pending),
            StatusCode::OK => {
                let bytes = response.bytes().await.map_err(StabilityError::Body)?;
                Ok(GenerationPoll::Ready(bytes.to_vec()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Ok(GenerationPoll::Failed {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
