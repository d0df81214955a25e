use super::RequestsLoggingLevel;
use crate::config::{
    AdminSettings, AppConfig, PollingSettings, SlideshowSettings, VideoSettings,
};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub admin: AdminSettings,
    pub polling: PollingSettings,
    pub video: VideoSettings,
    pub slideshow: SlideshowSettings,
    pub videos_dir: PathBuf,
    pub images_dir: PathBuf,
    pub backgrounds_dir: PathBuf,
    /// Front-end build served for every path no API route claims.
    pub ui_dir: Option<PathBuf>,
    pub slideshow_file: PathBuf,
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            admin: config.admin.clone(),
            polling: config.polling.clone(),
            video: config.video.clone(),
            slideshow: config.slideshow.clone(),
            videos_dir: config.videos_dir.clone(),
            images_dir: config.images_dir.clone(),
            backgrounds_dir: config.backgrounds_dir.clone(),
            ui_dir: config.ui_dir.clone(),
            slideshow_file: config.slideshow_file.clone(),
        }
    }
}
