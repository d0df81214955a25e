use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub data_dir: Option<String>,
    pub videos_dir: Option<String>,
    pub images_dir: Option<String>,
    pub backgrounds_dir: Option<String>,
    pub ui_dir: Option<String>,
    pub slideshow_file: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,

    // Sections
    pub admin: Option<AdminConfig>,
    pub polling: Option<PollingConfig>,
    pub video: Option<VideoConfig>,
    pub slideshow: Option<SlideshowConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AdminConfig {
    pub password: Option<String>,
    /// Argon2 PHC string, takes precedence over `password` when both are set.
    pub password_hash: Option<String>,
    pub session_ttl_hours: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub slideshow_state_ms: Option<u64>,
    pub admin_state_ms: Option<u64>,
    pub admin_submissions_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct VideoConfig {
    pub api_timeout_ms: Option<u64>,
    pub min_video_bytes: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SlideshowConfig {
    pub default_duration_ms: Option<u64>,
    pub transition_duration_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
