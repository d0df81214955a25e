mod file_config;

pub use file_config::{AdminConfig, FileConfig, PollingConfig, SlideshowConfig, VideoConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADMIN_PASSWORD: &str = "kaya";

/// CLI arguments that can be used for config resolution.
/// TOML values override these where present.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub videos_dir: Option<PathBuf>,
    pub ui_dir: Option<PathBuf>,
    pub slideshow_file: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub videos_dir: PathBuf,
    pub images_dir: PathBuf,
    pub backgrounds_dir: PathBuf,
    pub ui_dir: Option<PathBuf>,
    pub slideshow_file: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,

    pub admin: AdminSettings,
    pub polling: PollingSettings,
    pub video: VideoSettings,
    pub slideshow: SlideshowSettings,
}

#[derive(Debug, Clone)]
pub enum AdminSecret {
    Plain(String),
    Argon2Hash(String),
}

#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub secret: AdminSecret,
    pub session_ttl: Duration,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            secret: AdminSecret::Plain(DEFAULT_ADMIN_PASSWORD.to_string()),
            session_ttl: Duration::from_secs(12 * 60 * 60),
        }
    }
}

/// Front-end polling intervals, exposed verbatim through `/api/config`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PollingSettings {
    pub slideshow_state: u64,
    pub admin_state: u64,
    pub admin_submissions: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            slideshow_state: 2000,
            admin_state: 2000,
            admin_submissions: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoSettings {
    pub api_timeout: u64,
    /// Files smaller than this are treated as corrupt and left out of the inventory.
    #[serde(skip)]
    pub min_video_bytes: u64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            api_timeout: 10_000,
            min_video_bytes: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SlideshowSettings {
    pub default_duration: u64,
    pub transition_duration: u64,
}

impl Default for SlideshowSettings {
    fn default() -> Self {
        Self {
            default_duration: 30_000,
            transition_duration: 1200,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("data_dir must be specified via --data-dir or in config file")
            })?;
        if data_dir.exists() && !data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", data_dir);
        }

        // Everything else lives next to the data dir unless told otherwise.
        let project_root = data_dir
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let videos_dir = file
            .videos_dir
            .map(PathBuf::from)
            .or_else(|| cli.videos_dir.clone())
            .unwrap_or_else(|| project_root.join("videos"));
        let images_dir = file
            .images_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root.join("images"));
        let backgrounds_dir = file
            .backgrounds_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root.join("background_images"));
        let ui_dir = file.ui_dir.map(PathBuf::from).or_else(|| cli.ui_dir.clone());
        let slideshow_file = file
            .slideshow_file
            .map(PathBuf::from)
            .or_else(|| cli.slideshow_file.clone())
            .unwrap_or_else(|| project_root.join("slideshow.toml"));

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let admin_file = file.admin.unwrap_or_default();
        let default_admin = AdminSettings::default();
        let secret = match (admin_file.password_hash, admin_file.password) {
            (Some(hash), _) => AdminSecret::Argon2Hash(hash),
            (None, Some(password)) => {
                if password.is_empty() {
                    bail!("[admin].password must not be empty");
                }
                AdminSecret::Plain(password)
            }
            (None, None) => default_admin.secret,
        };
        let session_ttl = match admin_file.session_ttl_hours {
            Some(0) => bail!("[admin].session_ttl_hours must be greater than zero"),
            Some(hours) => Duration::from_secs(hours * 60 * 60),
            None => default_admin.session_ttl,
        };

        let polling_file = file.polling.unwrap_or_default();
        let polling_default = PollingSettings::default();
        let polling = PollingSettings {
            slideshow_state: polling_file
                .slideshow_state_ms
                .unwrap_or(polling_default.slideshow_state),
            admin_state: polling_file
                .admin_state_ms
                .unwrap_or(polling_default.admin_state),
            admin_submissions: polling_file
                .admin_submissions_ms
                .unwrap_or(polling_default.admin_submissions),
        };

        let video_file = file.video.unwrap_or_default();
        let video_default = VideoSettings::default();
        let video = VideoSettings {
            api_timeout: video_file.api_timeout_ms.unwrap_or(video_default.api_timeout),
            min_video_bytes: video_file
                .min_video_bytes
                .unwrap_or(video_default.min_video_bytes),
        };

        let slideshow_file_section = file.slideshow.unwrap_or_default();
        let slideshow_default = SlideshowSettings::default();
        let slideshow = SlideshowSettings {
            default_duration: slideshow_file_section
                .default_duration_ms
                .unwrap_or(slideshow_default.default_duration),
            transition_duration: slideshow_file_section
                .transition_duration_ms
                .unwrap_or(slideshow_default.transition_duration),
        };

        Ok(Self {
            data_dir,
            videos_dir,
            images_dir,
            backgrounds_dir,
            ui_dir,
            slideshow_file,
            port,
            logging_level,
            admin: AdminSettings {
                secret,
                session_ttl,
            },
            polling,
            video,
            slideshow,
        })
    }

    pub fn party_db_path(&self) -> PathBuf {
        self.data_dir.join("party.db")
    }

    pub fn play_counts_path(&self) -> PathBuf {
        self.data_dir.join("play_counts.json")
    }

    pub fn uses_default_password(&self) -> bool {
        matches!(&self.admin.secret, AdminSecret::Plain(p) if p == DEFAULT_ADMIN_PASSWORD)
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
