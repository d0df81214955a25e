//! Slides generated from approved guest submissions, and how they are woven
//! into the deck.

use super::deck::DeckSlide;
use crate::party_store::Submission;
use serde::Serialize;

pub const INJECTED_SLIDE_TYPE: &str = "guest-submission";
pub const INJECTED_SLIDE_DURATION_MS: u64 = 25_000;
pub const ANONYMOUS_GUEST: &str = "Anonymous";

const MEMORY_BACKGROUND: &str = "/images/memories.png";
const RESOLUTION_BACKGROUND: &str = "/images/resolutions.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideTemplate {
    Memory,
    Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedSlide {
    pub id: String,
    #[serde(rename = "type")]
    pub slide_type: &'static str,
    pub template: SlideTemplate,
    pub text: String,
    pub guest_name: String,
    pub duration: u64,
    pub background: &'static str,
    /// Milliseconds since the epoch. Clients poll with `since` to pick up new slides.
    pub injected_at: i64,
}

/// The memory slide and the resolution slide of one submission. The
/// resolution is stamped one millisecond later so it always follows.
pub fn slides_for_submission(submission: &Submission) -> [InjectedSlide; 2] {
    let base = submission
        .reviewed_at
        .unwrap_or(submission.created_at)
        .timestamp_millis();
    let guest_name = submission
        .guest_name
        .clone()
        .unwrap_or_else(|| ANONYMOUS_GUEST.to_string());

    [
        InjectedSlide {
            id: format!("submission-{}-memory", submission.id),
            slide_type: INJECTED_SLIDE_TYPE,
            template: SlideTemplate::Memory,
            text: submission.memory.clone(),
            guest_name: guest_name.clone(),
            duration: INJECTED_SLIDE_DURATION_MS,
            background: MEMORY_BACKGROUND,
            injected_at: base,
        },
        InjectedSlide {
            id: format!("submission-{}-resolution", submission.id),
            slide_type: INJECTED_SLIDE_TYPE,
            template: SlideTemplate::Resolution,
            text: submission.resolution.clone(),
            guest_name,
            duration: INJECTED_SLIDE_DURATION_MS,
            background: RESOLUTION_BACKGROUND,
            injected_at: base + 1,
        },
    ]
}

/// All injected slides, in approval order.
pub fn injected_slides(approved: &[Submission]) -> Vec<InjectedSlide> {
    let mut slides: Vec<InjectedSlide> = approved.iter().flat_map(slides_for_submission).collect();
    slides.sort_by_key(|s| s.injected_at);
    slides
}

/// Slides injected at or after `since`. The bound is inclusive so a client
/// polling with the last timestamp it saw never misses a slide stamped in the
/// same millisecond.
pub fn injected_since(slides: Vec<InjectedSlide>, since: i64) -> Vec<InjectedSlide> {
    slides.into_iter().filter(|s| s.injected_at >= since).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlaylistSlide {
    Deck(DeckSlide),
    Injected(InjectedSlide),
}

impl PlaylistSlide {
    pub fn id(&self) -> &str {
        match self {
            PlaylistSlide::Deck(slide) => &slide.id,
            PlaylistSlide::Injected(slide) => &slide.id,
        }
    }

    pub fn is_injected(&self) -> bool {
        matches!(self, PlaylistSlide::Injected(_))
    }
}

/// Positions in `playlist` where a new block can go without touching another
/// injected slide on either side.
fn valid_insert_positions(playlist: &[PlaylistSlide]) -> Vec<usize> {
    (0..=playlist.len())
        .filter(|&i| {
            let before_ok = i == 0 || !playlist[i - 1].is_injected();
            let after_ok = i == playlist.len() || !playlist[i].is_injected();
            before_ok && after_ok
        })
        .collect()
}

/// Weaves injected slides into the deck. Slides are taken in `injected_at`
/// order two at a time, and each pair goes to the valid position closest to
/// one third of the current playlist (earliest on ties). A pair that fits
/// nowhere is appended.
pub fn merge_playlist(deck: &[DeckSlide], injected: &[InjectedSlide]) -> Vec<PlaylistSlide> {
    let mut playlist: Vec<PlaylistSlide> = deck.iter().cloned().map(PlaylistSlide::Deck).collect();

    let mut sorted = injected.to_vec();
    sorted.sort_by_key(|s| s.injected_at);

    for pair in sorted.chunks(2) {
        let target = playlist.len() / 3;
        let insert_at = valid_insert_positions(&playlist)
            .into_iter()
            .min_by_key(|&p| p.abs_diff(target))
            .unwrap_or(playlist.len());

        for (offset, slide) in pair.iter().enumerate() {
            playlist.insert(insert_at + offset, PlaylistSlide::Injected(slide.clone()));
        }
    }
    playlist
}
