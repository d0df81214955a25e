//! Shared constants for end-to-end tests
//!
//! When fixture data changes (slides, videos, password), update only this file.

// ============================================================================
// Admin Credentials
// ============================================================================

/// Admin password configured on every test server
pub const ADMIN_PASS: &str = "test-admin-pass";

// ============================================================================
// Fixture Slides
// ============================================================================

/// Slide with three local videos
pub const SLIDE_INTRO: &str = "intro";

/// Videos of the intro slide, in the order the inventory lists them
pub const INTRO_VIDEOS: [&str; 3] = ["intro/a.mp4", "intro/b.mp4", "intro/c.mp4"];

/// Slide with a single local video
pub const SLIDE_DANCE: &str = "dance";

/// The dance slide's only video
pub const DANCE_VIDEO: &str = "dance/floor.mp4";

/// Slide directory holding only a too-small file
pub const SLIDE_BROKEN: &str = "broken";

/// Slide that only exists in the deck, with external fallbacks
pub const SLIDE_REMOTE: &str = "remote";

/// Fallback ids configured for the remote slide
pub const REMOTE_FALLBACKS: [&str; 2] = ["yt-abc123", "yt-def456"];

/// Number of slides in the fixture deck
pub const DECK_SLIDE_COUNT: usize = 6;

/// Background images written into the fixture backgrounds dir
pub const BACKGROUND_IMAGES: [&str; 2] = ["balloons.png", "confetti.jpg"];

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to come up
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
