use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Part of a video to play, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoOffset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSlide {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// External streaming ids, tried in order when the slide has no local file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_videos: Vec<String>,
    /// Keyed by video file name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub offsets: BTreeMap<String, VideoOffset>,
    /// Presentation fields the server does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideDeck {
    #[serde(default)]
    pub slides: Vec<DeckSlide>,
}

impl SlideDeck {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read slide deck {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse slide deck {:?}", path))
    }

    /// A missing or broken deck file leaves the slideshow with no default
    /// slides; the server keeps running.
    pub fn load_or_empty(path: &Path) -> Self {
        if !path.exists() {
            warn!("Slide deck {:?} not found, starting with no slides", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(deck) => {
                info!("Loaded {} slides from {:?}", deck.slides.len(), path);
                deck
            }
            Err(err) => {
                warn!("{:#}", err);
                Self::default()
            }
        }
    }

    pub fn slide(&self, slide_id: &str) -> Option<&DeckSlide> {
        self.slides.iter().find(|s| s.id == slide_id)
    }
}

impl DeckSlide {
    /// Offset configured for an inventory path (`<slide>/<file>`).
    pub fn offset_for(&self, video_path: &str) -> Option<VideoOffset> {
        let file_name = video_path.rsplit('/').next().unwrap_or(video_path);
        self.offsets.get(file_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DECK: &str = r##"
        [[slides]]
        id = "one-dance"
        duration_ms = 45000
        fallback_videos = ["yt:abc", "yt:def"]
        title = "One Dance"
        colors = ["#ff0000", "#00ff00"]

        [slides.offsets."clip.mp4"]
        start = 12.5
        end = 40.0

        [[slides]]
        id = "lemonade"
    "##;

    #[test]
    fn parses_slides_in_order_with_extra_fields() {
        let deck = SlideDeck::parse(DECK).unwrap();
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[0].id, "one-dance");
        assert_eq!(deck.slides[1].id, "lemonade");

        let one_dance = deck.slide("one-dance").unwrap();
        assert_eq!(one_dance.duration_ms, Some(45000));
        assert_eq!(one_dance.fallback_videos, vec!["yt:abc", "yt:def"]);
        assert_eq!(
            one_dance.extra.get("title"),
            Some(&toml::Value::String("One Dance".to_string()))
        );
        assert!(!one_dance.extra.contains_key("offsets"));

        let lemonade = deck.slide("lemonade").unwrap();
        assert!(lemonade.fallback_videos.is_empty());
        assert!(deck.slide("missing").is_none());
    }

    #[test]
    fn offsets_are_looked_up_by_file_name() {
        let deck = SlideDeck::parse(DECK).unwrap();
        let one_dance = deck.slide("one-dance").unwrap();
        assert_eq!(
            one_dance.offset_for("one-dance/clip.mp4"),
            Some(VideoOffset {
                start: Some(12.5),
                end: Some(40.0)
            })
        );
        assert_eq!(one_dance.offset_for("one-dance/other.mp4"), None);
    }

    #[test]
    fn serializes_extra_fields_flat() {
        let deck = SlideDeck::parse(DECK).unwrap();
        let json = serde_json::to_value(&deck.slides[0]).unwrap();
        assert_eq!(json["id"], "one-dance");
        assert_eq!(json["title"], "One Dance");
        assert_eq!(json["colors"][1], "#00ff00");
        assert_eq!(json["offsets"]["clip.mp4"]["start"], 12.5);
    }

    #[test]
    fn missing_or_broken_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slideshow.toml");
        assert_eq!(SlideDeck::load_or_empty(&path), SlideDeck::default());

        std::fs::write(&path, "[[slides]]\nduration_ms = 3").unwrap();
        assert!(SlideDeck::load(&path).is_err());
        assert_eq!(SlideDeck::load_or_empty(&path), SlideDeck::default());
    }
}
