use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use party_server::config::{AppConfig, CliConfig, FileConfig};
use party_server::{
    run_server, PlayCountFile, RequestsLoggingLevel, ServerConfig, SlideDeck, SqlitePartyStore,
    VideoRotation,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the party database and the play counts file.
    #[clap(long, value_parser = parse_path)]
    pub data_dir: Option<PathBuf>,

    /// Directory with one subdirectory of videos per slide.
    #[clap(long, value_parser = parse_path)]
    pub videos_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the front-end build to be statically served.
    #[clap(long, value_parser = parse_path)]
    pub ui_dir: Option<PathBuf>,

    /// Path to the slide deck TOML file.
    #[clap(long, value_parser = parse_path)]
    pub slideshow_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        data_dir: cli_args.data_dir,
        videos_dir: cli_args.videos_dir,
        ui_dir: cli_args.ui_dir,
        slideshow_file: cli_args.slideshow_file,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    if app_config.uses_default_password() {
        warn!("Admin password is the built-in default, set [admin].password_hash in the config file");
    }

    std::fs::create_dir_all(&app_config.data_dir)
        .with_context(|| format!("Failed to create data dir {:?}", app_config.data_dir))?;

    info!(
        "Opening party database at {:?}...",
        app_config.party_db_path()
    );
    let party_store = Arc::new(SqlitePartyStore::new(app_config.party_db_path())?);

    info!("Scanning videos in {:?}...", app_config.videos_dir);
    let video_rotation = Arc::new(VideoRotation::open(
        &app_config.videos_dir,
        app_config.video.min_video_bytes,
        PlayCountFile::new(app_config.play_counts_path()),
    ));
    let totals = video_rotation.totals();
    info!(
        "Inventory ready: {} slides, {} videos",
        totals.total_slides, totals.total_videos
    );

    let slide_deck = SlideDeck::load_or_empty(&app_config.slideshow_file);
    info!("Slide deck has {} slides", slide_deck.slides.len());

    run_server(
        ServerConfig::from(&app_config),
        party_store,
        video_rotation,
        slide_deck,
    )
    .await
}
