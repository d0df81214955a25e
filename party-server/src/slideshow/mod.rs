mod control;
mod deck;
mod injected;

pub use control::{ControlAction, ControlError, ControlRequest, SyncReport};
pub use deck::{DeckSlide, SlideDeck, VideoOffset};
pub use injected::{
    injected_since, injected_slides, merge_playlist, slides_for_submission, InjectedSlide,
    PlaylistSlide, SlideTemplate, INJECTED_SLIDE_TYPE,
};
