use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Submissions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SubmissionStatus::Pending),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

/// Terminal state an admin can move a pending submission to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target_status(&self) -> SubmissionStatus {
        match self {
            Decision::Approve => SubmissionStatus::Approved,
            Decision::Reject => SubmissionStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub id: i64,
    pub guest_name: Option<String>,
    pub memory: String,
    pub resolution: String,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Both fields are required")]
    MissingField,
}

/// A guest submission that passed validation: both texts are trimmed and
/// non-empty, a blank guest name becomes `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    guest_name: Option<String>,
    memory: String,
    resolution: String,
}

impl NewSubmission {
    pub fn new(
        guest_name: Option<&str>,
        memory: &str,
        resolution: &str,
    ) -> Result<Self, SubmissionError> {
        let memory = memory.trim();
        let resolution = resolution.trim();
        if memory.is_empty() || resolution.is_empty() {
            return Err(SubmissionError::MissingField);
        }
        let guest_name = guest_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(Self {
            guest_name,
            memory: memory.to_string(),
            resolution: resolution.to_string(),
        })
    }

    pub fn guest_name(&self) -> Option<&str> {
        self.guest_name.as_deref()
    }

    pub fn memory(&self) -> &str {
        &self.memory
    }

    pub fn resolution(&self) -> &str {
        &self.resolution
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Decided(Submission),
    NotFound,
    /// The submission was decided before; carries its current status.
    AlreadyDecided(SubmissionStatus),
}

// =============================================================================
// Admin sessions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSession {
    pub token: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds, exclusive: the session is no longer valid at this instant.
    pub expires_at: i64,
}

impl AdminSession {
    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

// =============================================================================
// Playback state
// =============================================================================

pub const DEFAULT_SLIDE_DURATION_MS: i64 = 30_000;

/// What the main display is currently showing. There is exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub is_paused: bool,
    pub current_slide: String,
    pub current_slide_index: i64,
    pub slide_duration: i64,
    /// As reported by the display, passed through untouched.
    pub slide_started_at: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub request_video_switch: bool,
    pub total_slides: i64,
    pub hidden_slides: Vec<String>,
    pub is_muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_paused: false,
            current_slide: String::new(),
            current_slide_index: 0,
            slide_duration: DEFAULT_SLIDE_DURATION_MS,
            slide_started_at: None,
            last_updated: Utc::now(),
            request_video_switch: false,
            total_slides: 0,
            hidden_slides: Vec::new(),
            is_muted: true,
        }
    }
}

impl PlaybackState {
    /// Returns false when the slide was already hidden.
    pub fn hide(&mut self, slide_id: &str) -> bool {
        if self.hidden_slides.iter().any(|s| s == slide_id) {
            return false;
        }
        self.hidden_slides.push(slide_id.to_string());
        true
    }

    /// Returns false when the slide was not hidden.
    pub fn unhide(&mut self, slide_id: &str) -> bool {
        let before = self.hidden_slides.len();
        self.hidden_slides.retain(|s| s != slide_id);
        before != self.hidden_slides.len()
    }
}
