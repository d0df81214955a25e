use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::{info, warn};
use walkdir::WalkDir;

use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;

use super::auth_routes::make_auth_routes;
use super::error::ApiResult;
use super::metrics::{init_metrics, metrics_handler, set_inventory_size};
use super::slideshow_routes::make_slideshow_routes;
use super::submission_routes::make_submission_routes;
use super::video_routes::make_video_routes;
use super::{log_requests, state::*, ServerConfig};
use crate::config::{PollingSettings, SlideshowSettings, VideoSettings};
use crate::slideshow::SlideDeck;

const BACKGROUND_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime: String,
    uptime_seconds: u64,
    total_slides: usize,
    total_videos: usize,
    total_plays: u64,
}

#[derive(Serialize)]
struct PublicConfigResponse {
    polling: PollingSettings,
    video: VideoSettings,
    slideshow: SlideshowSettings,
}

#[derive(Serialize)]
struct BackgroundsResponse {
    images: Vec<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed();
    let totals = state.video_rotation.totals();
    Json(HealthResponse {
        status: "ok",
        uptime: format_uptime(uptime),
        uptime_seconds: uptime.as_secs(),
        total_slides: totals.total_slides,
        total_videos: totals.total_videos,
        total_plays: totals.total_plays,
    })
}

async fn public_config(State(config): State<ServerConfig>) -> Json<PublicConfigResponse> {
    Json(PublicConfigResponse {
        polling: config.polling,
        video: config.video,
        slideshow: config.slideshow,
    })
}

fn is_background_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BACKGROUND_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// File names of the images directly inside `dir`, sorted. A missing
/// directory yields an empty list.
fn list_background_images(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_background_image(entry.path()))
        .filter_map(|entry| entry.file_name().to_str().map(|s| s.to_string()))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}

async fn backgrounds(State(config): State<ServerConfig>) -> ApiResult<Json<BackgroundsResponse>> {
    let dir = config.backgrounds_dir.clone();
    let names = tokio::task::spawn_blocking(move || list_background_images(&dir))
        .await
        .context("Background listing task failed")?;

    Ok(Json(BackgroundsResponse {
        images: names
            .into_iter()
            .map(|name| format!("/backgrounds/{}", name))
            .collect(),
    }))
}

pub fn make_app(
    config: ServerConfig,
    party_store: GuardedPartyStore,
    video_rotation: GuardedVideoRotation,
    slide_deck: SlideDeck,
) -> Result<Router> {
    init_metrics();
    let totals = video_rotation.totals();
    set_inventory_size(totals.total_slides, totals.total_videos);

    let state = ServerState::new(config.clone(), party_store, video_rotation, slide_deck);

    let api_routes: Router = Router::new()
        .route("/health", get(health))
        .route("/config", get(public_config))
        .route("/backgrounds", get(backgrounds))
        .with_state(state.clone())
        .merge(make_video_routes(state.clone()))
        .merge(make_slideshow_routes(state.clone()))
        .nest("/admin", make_auth_routes(state.clone()))
        .nest("/submissions", make_submission_routes(state.clone()));

    let home_router: Router = match &config.ui_dir {
        Some(ui_dir) => {
            if !ui_dir.is_dir() {
                warn!("UI directory {:?} does not exist", ui_dir);
            }
            let static_files_service = ServeDir::new(ui_dir).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new(),
    };

    let mut app: Router = home_router
        .nest("/api", api_routes)
        .route("/metrics", get(metrics_handler))
        .nest_service("/videos", ServeDir::new(&config.videos_dir))
        .nest_service("/images", ServeDir::new(&config.images_dir))
        .nest_service("/backgrounds", ServeDir::new(&config.backgrounds_dir));

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    party_store: GuardedPartyStore,
    video_rotation: GuardedVideoRotation,
    slide_deck: SlideDeck,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, party_store, video_rotation, slide_deck)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on http://0.0.0.0:{}", port);

    Ok(axum::serve(listener, app).await?)
}
