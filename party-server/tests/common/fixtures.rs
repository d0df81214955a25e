//! Test fixture creation for the videos tree, slide deck and images

use super::constants::*;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Large enough to pass the default minimum video size
const FAKE_VIDEO_BYTES: [u8; 2048] = [0u8; 2048];

/// Below the minimum video size, treated as corrupt
const CORRUPT_VIDEO_BYTES: [u8; 16] = [0u8; 16];

const FIXTURE_DECK: &str = r#"
[[slides]]
id = "intro"
title = "Welcome to the party"

[slides.offsets."b.mp4"]
start = 5.0
end = 20.0

[[slides]]
id = "dance"
duration_ms = 45000

[[slides]]
id = "broken"

[[slides]]
id = "remote"
fallback_videos = ["yt-abc123", "yt-def456"]

[[slides]]
id = "toast"
title = "Cheers"

[[slides]]
id = "outro"
"#;

/// Paths of a fixture party tree living inside a temp dir
pub struct FixturePaths {
    pub data_dir: PathBuf,
    pub videos_dir: PathBuf,
    pub images_dir: PathBuf,
    pub backgrounds_dir: PathBuf,
    pub slideshow_file: PathBuf,
}

fn write_video(videos_dir: &Path, relative_path: &str, bytes: &[u8]) -> Result<()> {
    let path = videos_dir.join(relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Creates a temporary party tree:
/// - `intro` with three videos, `dance` with one, `broken` with a corrupt one
/// - a hidden `_draft.mp4` and an in-progress `.part` download that must be ignored
/// - a six slide deck file
/// - two background images and a non-image file
pub fn create_test_party() -> Result<(TempDir, FixturePaths)> {
    let dir = TempDir::new()?;
    let paths = FixturePaths {
        data_dir: dir.path().join("data"),
        videos_dir: dir.path().join("videos"),
        images_dir: dir.path().join("images"),
        backgrounds_dir: dir.path().join("background_images"),
        slideshow_file: dir.path().join("slideshow.toml"),
    };

    fs::create_dir_all(&paths.data_dir)?;
    fs::create_dir_all(&paths.images_dir)?;
    fs::create_dir_all(&paths.backgrounds_dir)?;

    for video in INTRO_VIDEOS {
        write_video(&paths.videos_dir, video, &FAKE_VIDEO_BYTES)?;
    }
    write_video(&paths.videos_dir, DANCE_VIDEO, &FAKE_VIDEO_BYTES)?;
    write_video(&paths.videos_dir, "dance/_draft.mp4", &FAKE_VIDEO_BYTES)?;
    write_video(&paths.videos_dir, "dance/next.mp4.part", &FAKE_VIDEO_BYTES)?;
    write_video(&paths.videos_dir, "broken/tiny.mp4", &CORRUPT_VIDEO_BYTES)?;

    fs::write(&paths.slideshow_file, FIXTURE_DECK)?;

    for image in BACKGROUND_IMAGES {
        fs::write(paths.backgrounds_dir.join(image), b"image")?;
    }
    fs::write(paths.backgrounds_dir.join("README.txt"), b"not an image")?;
    fs::write(paths.images_dir.join("memories.png"), b"image")?;

    Ok((dir, paths))
}

/// Drops a new video into a slide directory of a running server's tree
pub fn add_video(videos_dir: &Path, relative_path: &str) -> Result<()> {
    write_video(videos_dir, relative_path, &FAKE_VIDEO_BYTES)
}
