use super::error::ApiResult;
use super::json_body::JsonBody;
use super::session::AdminAuth;
use super::state::{GuardedPartyStore, GuardedSlideDeck, ServerState};
use crate::party_store::PlaybackState;
use crate::slideshow::{
    injected_since, injected_slides, merge_playlist, ControlAction, ControlRequest,
    InjectedSlide, PlaylistSlide, SyncReport,
};

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Deserialize, Debug)]
struct InjectedQuery {
    #[serde(default)]
    since: i64,
}

#[derive(Serialize)]
struct InjectedSlidesResponse {
    slides: Vec<InjectedSlide>,
}

#[derive(Serialize)]
struct PlaylistResponse {
    slides: Vec<PlaylistSlide>,
    total: usize,
    injected_count: usize,
}

async fn get_state(State(store): State<GuardedPartyStore>) -> ApiResult<Json<PlaybackState>> {
    Ok(Json(store.get_playback_state()?))
}

async fn control(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
    JsonBody(request): JsonBody<ControlRequest>,
) -> ApiResult<Json<PlaybackState>> {
    let action = ControlAction::try_from(request)?;
    let state = store.update_playback_state(&mut |state| action.apply(state))?;
    info!("Slideshow control: {}", action.name());
    Ok(Json(state))
}

async fn sync(
    State(store): State<GuardedPartyStore>,
    JsonBody(report): JsonBody<SyncReport>,
) -> ApiResult<Json<PlaybackState>> {
    Ok(Json(
        store.update_playback_state(&mut |state| report.apply(state))?,
    ))
}

async fn video_switched(State(store): State<GuardedPartyStore>) -> ApiResult<Json<PlaybackState>> {
    let state = store.update_playback_state(&mut |state| {
        let changed = state.request_video_switch;
        state.request_video_switch = false;
        changed
    })?;
    Ok(Json(state))
}

async fn hide_slide(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
    Path(slide_id): Path<String>,
) -> ApiResult<Json<PlaybackState>> {
    let state = store.update_playback_state(&mut |state| state.hide(&slide_id))?;
    info!("Slide hidden: {}", slide_id);
    Ok(Json(state))
}

async fn unhide_slide(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
    Path(slide_id): Path<String>,
) -> ApiResult<Json<PlaybackState>> {
    let state = store.update_playback_state(&mut |state| state.unhide(&slide_id))?;
    info!("Slide unhidden: {}", slide_id);
    Ok(Json(state))
}

fn set_muted(store: &GuardedPartyStore, muted: bool) -> ApiResult<Json<PlaybackState>> {
    let state = store.update_playback_state(&mut |state| {
        let changed = state.is_muted != muted;
        state.is_muted = muted;
        changed
    })?;
    info!("Slideshow {}", if muted { "muted" } else { "unmuted" });
    Ok(Json(state))
}

async fn mute(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
) -> ApiResult<Json<PlaybackState>> {
    set_muted(&store, true)
}

async fn unmute(
    _admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
) -> ApiResult<Json<PlaybackState>> {
    set_muted(&store, false)
}

async fn get_injected_slides(
    State(store): State<GuardedPartyStore>,
    Query(query): Query<InjectedQuery>,
) -> ApiResult<Json<InjectedSlidesResponse>> {
    let approved = store.list_approved_submissions()?;
    Ok(Json(InjectedSlidesResponse {
        slides: injected_since(injected_slides(&approved), query.since),
    }))
}

async fn get_playlist(
    State(store): State<GuardedPartyStore>,
    State(deck): State<GuardedSlideDeck>,
) -> ApiResult<Json<PlaylistResponse>> {
    let injected = injected_slides(&store.list_approved_submissions()?);
    let slides = {
        let deck = deck.read().unwrap();
        merge_playlist(&deck.slides, &injected)
    };

    Ok(Json(PlaylistResponse {
        total: slides.len(),
        injected_count: injected.len(),
        slides,
    }))
}

pub fn make_slideshow_routes(state: ServerState) -> Router {
    Router::new()
        .route("/slideshow/state", get(get_state))
        .route("/slideshow/control", post(control))
        .route("/slideshow/sync", post(sync))
        .route("/slideshow/video-switched", post(video_switched))
        .route("/slideshow/hide/{slide_id}", post(hide_slide))
        .route("/slideshow/unhide/{slide_id}", post(unhide_slide))
        .route("/slideshow/mute", post(mute))
        .route("/slideshow/unmute", post(unmute))
        .route("/slideshow/slides", get(get_playlist))
        .route("/injected-slides", get(get_injected_slides))
        .with_state(state)
}
