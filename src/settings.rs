//! Game settings
//!
//! Loaded from an optional JSON file. Every field has a default, so a
//! partial file (or none at all) is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::{ReportMode, ReportRequest};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings")]
    Parse(#[from] serde_json::Error),
}

/// Report collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Ask for a report after each detonation
    pub enabled: bool,
    /// Power level passed to the generator (0-100)
    pub intensity: u8,
    pub temperature_celsius: f32,
    pub mode: ReportMode,
    pub model: String,
    /// Base URL of the text-generation API
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 80,
            temperature_celsius: 120.0,
            mode: ReportMode::Bomb,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "API_KEY".to_string(),
        }
    }
}

impl ReportSettings {
    pub fn request(&self) -> ReportRequest {
        ReportRequest::new(self.intensity, self.temperature_celsius, self.mode)
    }

    /// Key from the environment; `None` if unset or blank
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed seed for reproducible layouts; random when absent
    pub seed: Option<u64>,
    /// Runtime clock granularity (ms)
    pub frame_ms: u64,
    /// Vibrate on falls and explosions
    pub haptics: bool,
    pub report: ReportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            frame_ms: 50,
            haptics: true,
            report: ReportSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.frame_ms = settings.frame_ms.max(1);
        settings.report.intensity = settings.report.intensity.min(100);
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `path`, falling back to defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Could not load settings from {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Configured seed, or a fresh random one
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
