use crate::party_store::PlaybackState;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action goto requires slide_index")]
    MissingSlideIndex,
}

/// Body of `POST /api/slideshow/control`.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlRequest {
    pub action: String,
    pub slide_index: Option<i64>,
    pub slide_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    Pause,
    Resume,
    Goto {
        index: i64,
        slide_id: Option<String>,
    },
    Next,
    Prev,
    /// Asks the display to play another video for the current slide. The
    /// display clears the flag once it has switched.
    SwitchVideo,
}

impl TryFrom<ControlRequest> for ControlAction {
    type Error = ControlError;

    fn try_from(request: ControlRequest) -> Result<Self, Self::Error> {
        match request.action.trim().to_lowercase().as_str() {
            "pause" => Ok(ControlAction::Pause),
            "resume" => Ok(ControlAction::Resume),
            "goto" => Ok(ControlAction::Goto {
                index: request.slide_index.ok_or(ControlError::MissingSlideIndex)?,
                slide_id: request.slide_id,
            }),
            "next" => Ok(ControlAction::Next),
            "prev" => Ok(ControlAction::Prev),
            "switch_video" => Ok(ControlAction::SwitchVideo),
            other => Err(ControlError::UnknownAction(other.to_string())),
        }
    }
}

impl ControlAction {
    pub fn name(&self) -> &'static str {
        match self {
            ControlAction::Pause => "pause",
            ControlAction::Resume => "resume",
            ControlAction::Goto { .. } => "goto",
            ControlAction::Next => "next",
            ControlAction::Prev => "prev",
            ControlAction::SwitchVideo => "switch_video",
        }
    }

    /// Returns whether the state changed.
    pub fn apply(&self, state: &mut PlaybackState) -> bool {
        match self {
            ControlAction::Pause => set(&mut state.is_paused, true),
            ControlAction::Resume => set(&mut state.is_paused, false),
            ControlAction::Goto { index, slide_id } => {
                state.current_slide_index = (*index).max(0);
                state.current_slide = slide_id.clone().unwrap_or_default();
                true
            }
            ControlAction::Next => step(state, 1),
            ControlAction::Prev => step(state, -1),
            ControlAction::SwitchVideo => {
                state.request_video_switch = true;
                true
            }
        }
    }
}

fn set(flag: &mut bool, value: bool) -> bool {
    let changed = *flag != value;
    *flag = value;
    changed
}

/// Moves by `delta` slides, wrapping around when the display has told us how
/// many slides there are. The slide id is unknown until the display syncs.
fn step(state: &mut PlaybackState, delta: i64) -> bool {
    let next = state.current_slide_index + delta;
    state.current_slide_index = if state.total_slides > 0 {
        next.rem_euclid(state.total_slides)
    } else {
        next.max(0)
    };
    state.current_slide.clear();
    true
}

/// Body of `POST /api/slideshow/sync`, sent by the main display.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncReport {
    pub slide_id: String,
    pub slide_index: i64,
    pub slide_duration: Option<i64>,
    pub slide_started_at: Option<String>,
    /// Slide count including injected slides.
    pub total_slides: Option<i64>,
}

impl SyncReport {
    pub fn apply(&self, state: &mut PlaybackState) -> bool {
        state.current_slide = self.slide_id.clone();
        state.current_slide_index = self.slide_index;
        if let Some(duration) = self.slide_duration {
            state.slide_duration = duration;
        }
        if let Some(started_at) = &self.slide_started_at {
            state.slide_started_at = Some(started_at.clone());
        }
        if let Some(total) = self.total_slides {
            state.total_slides = total;
        }
        true
    }
}
