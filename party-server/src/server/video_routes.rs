use super::ServerConfig;
use super::error::{ApiError, ApiResult};
use super::json_body::JsonBody;
use super::metrics::{record_video_play, set_inventory_size};
use super::session::AdminAuth;
use super::state::{GuardedSlideDeck, GuardedVideoRotation, ServerState};
use crate::slideshow::{DeckSlide, SlideDeck, VideoOffset};
use crate::video_rotation::{video_url, InventorySnapshot, Selection};

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize, Debug)]
struct VideoSelectionResponse {
    slide_id: String,
    /// Inventory path, `None` when the slide has no local video.
    video_path: Option<String>,
    video_url: Option<String>,
    video_count: usize,
    play_count: u64,
    offset: Option<VideoOffset>,
    fallback_videos: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct PlayedBody {
    #[serde(default)]
    video_path: Option<String>,
}

#[derive(Serialize, Debug)]
struct PlayedResponse {
    slide_id: String,
    video_path: String,
    new_play_count: u64,
}

#[derive(Serialize, Debug)]
struct ReloadResponse {
    status: &'static str,
    total_slides: usize,
    total_videos: usize,
    pruned_counts: usize,
    deck_slides: usize,
}

async fn get_video(
    State(rotation): State<GuardedVideoRotation>,
    State(deck): State<GuardedSlideDeck>,
    Path(slide_id): Path<String>,
) -> ApiResult<Json<VideoSelectionResponse>> {
    let deck_slide: Option<DeckSlide> = deck.read().unwrap().slide(&slide_id).cloned();
    let fallback_videos = deck_slide
        .as_ref()
        .map(|s| s.fallback_videos.clone())
        .unwrap_or_default();

    let response = match rotation.select(&slide_id) {
        Selection::Video {
            path,
            play_count,
            video_count,
        } => VideoSelectionResponse {
            offset: deck_slide.as_ref().and_then(|s| s.offset_for(&path)),
            video_url: Some(video_url(&path)),
            video_path: Some(path),
            slide_id,
            video_count,
            play_count,
            fallback_videos,
        },
        Selection::UnknownSlide if deck_slide.is_none() => {
            return Err(ApiError::NotFound(format!("Unknown slide: {}", slide_id)));
        }
        Selection::NoLocalVideo | Selection::UnknownSlide => VideoSelectionResponse {
            slide_id,
            video_path: None,
            video_url: None,
            video_count: 0,
            play_count: 0,
            offset: None,
            fallback_videos,
        },
    };
    Ok(Json(response))
}

async fn report_played(
    State(rotation): State<GuardedVideoRotation>,
    Path(slide_id): Path<String>,
    JsonBody(body): JsonBody<PlayedBody>,
) -> ApiResult<Json<PlayedResponse>> {
    let raw_path = body
        .video_path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("video_path is required".to_string()))?;

    let played = rotation.record_played(&slide_id, &raw_path)?;
    record_video_play(&slide_id);
    info!(
        "Play reported: {} -> {} (count: {})",
        slide_id, played.video_path, played.play_count
    );

    Ok(Json(PlayedResponse {
        slide_id,
        video_path: played.video_path,
        new_play_count: played.play_count,
    }))
}

async fn get_inventory(State(rotation): State<GuardedVideoRotation>) -> Json<InventorySnapshot> {
    Json(rotation.snapshot())
}

async fn reload_inventory(
    _admin: AdminAuth,
    State(config): State<ServerConfig>,
    State(rotation): State<GuardedVideoRotation>,
    State(deck): State<GuardedSlideDeck>,
) -> ApiResult<Json<ReloadResponse>> {
    let slideshow_file = config.slideshow_file.clone();
    let (summary, fresh_deck) = tokio::task::spawn_blocking(move || {
        (rotation.reload(), SlideDeck::load_or_empty(&slideshow_file))
    })
    .await
    .map_err(|err| anyhow!("Inventory reload task failed: {}", err))?;

    let deck_slides = fresh_deck.slides.len();
    *deck.write().unwrap() = fresh_deck;
    set_inventory_size(summary.total_slides, summary.total_videos);
    info!(
        "Inventory reloaded: {} slides, {} videos, {} stale counts dropped",
        summary.total_slides, summary.total_videos, summary.pruned_counts
    );

    Ok(Json(ReloadResponse {
        status: "reloaded",
        total_slides: summary.total_slides,
        total_videos: summary.total_videos,
        pruned_counts: summary.pruned_counts,
        deck_slides,
    }))
}

pub fn make_video_routes(state: ServerState) -> Router {
    Router::new()
        .route("/video/{slide_id}", get(get_video))
        .route("/video/{slide_id}/played", post(report_played))
        .route("/inventory", get(get_inventory))
        .route("/inventory/reload", post(reload_inventory))
        .with_state(state)
}
