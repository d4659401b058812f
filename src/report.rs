//! Flavor-text reports after a detonation
//!
//! Reports come from a remote text-generation service. Every failure path
//! resolves to a canned line so callers never see an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::settings::ReportSettings;

pub const MISSING_KEY_FALLBACK: &str =
    "Missing API Key: The dryer exploded into a void of nothingness.";
pub const CONNECTION_FALLBACK: &str =
    "The blast was so powerful it severed the connection to the AI server.";
pub const EMPTY_FALLBACK: &str = "The device has ceased to be.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Device the report pretends caused the disaster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    Wind,
    Water,
    #[default]
    Bomb,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Wind => "wind",
            ReportMode::Water => "water",
            ReportMode::Bomb => "bomb",
        }
    }

    /// (tool, what it does)
    fn device(&self) -> (&'static str, &'static str) {
        match self {
            ReportMode::Wind => ("Hairdryer", "blowing air"),
            ReportMode::Water => ("High-Pressure Water Sprayer", "spraying water"),
            ReportMode::Bomb => ("Personal Ballistic Launcher", "firing micro-explosives"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Power level, 0-100
    pub intensity: u8,
    pub temperature_celsius: f32,
    pub mode: ReportMode,
}

impl ReportRequest {
    pub fn new(intensity: u8, temperature_celsius: f32, mode: ReportMode) -> Self {
        Self {
            intensity: intensity.min(100),
            temperature_celsius,
            mode,
        }
    }

    pub fn prompt(&self) -> String {
        let (tool, action) = self.mode.device();
        format!(
            "The user was playing a game. They used a modified {tool} ({action}) set to Power Level {}/100 \
             and Temperature {}°C, then pressed the self-destruct button.\n\n\
             Write a funny, sarcastic, 1-sentence \"Coroner's Report\" or \"Fire Dept Statement\" about the \
             cause of the disaster. Be creative with the physics of {}°C {}.",
            self.intensity,
            self.temperature_celsius,
            self.temperature_celsius,
            self.mode.as_str()
        )
    }
}

/// Produces report text. Never fails: errors become fallback lines.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate_report(&self, request: ReportRequest) -> String;
}

/// Always returns the same line
#[derive(Debug, Clone)]
pub struct CannedReporter {
    text: String,
}

impl CannedReporter {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for CannedReporter {
    fn default() -> Self {
        Self::new(EMPTY_FALLBACK)
    }
}

#[async_trait]
impl ReportGenerator for CannedReporter {
    async fn generate_report(&self, _request: ReportRequest) -> String {
        self.text.clone()
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no API key configured")]
    MissingKey,

    #[error("report request failed")]
    Http(#[from] reqwest::Error),

    #[error("report service returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("report service returned no text")]
    Empty,
}

/// Gemini `generateContent` client
pub struct GeminiReporter {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl GeminiReporter {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, ReportError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            http_client,
        })
    }

    /// Build from settings, reading the key from the configured env var
    pub fn from_settings(settings: &ReportSettings) -> Result<Self, ReportError> {
        Self::new(&settings.endpoint, &settings.model, settings.api_key())
    }

    fn url(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            key
        )
    }

    /// The raw request, without fallbacks
    pub async fn request_text(&self, request: &ReportRequest) -> Result<String, ReportError> {
        let key = self.api_key.as_deref().ok_or(ReportError::MissingKey)?;

        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt() }] }]
        });

        log::debug!("Requesting {} report from {}", request.mode.as_str(), self.model);

        let response = self
            .http_client
            .post(self.url(key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ReportError::Status { status, body });
        }

        let reply: GenerateContentResponse = response.json().await?;
        reply.text().ok_or(ReportError::Empty)
    }
}

#[async_trait]
impl ReportGenerator for GeminiReporter {
    async fn generate_report(&self, request: ReportRequest) -> String {
        match self.request_text(&request).await {
            Ok(text) => text,
            Err(ReportError::MissingKey) => MISSING_KEY_FALLBACK.to_string(),
            Err(ReportError::Empty) => {
                log::warn!("Report service returned no text");
                EMPTY_FALLBACK.to_string()
            }
            Err(e) => {
                log::error!("Report generation failed: {e}");
                CONNECTION_FALLBACK.to_string()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
