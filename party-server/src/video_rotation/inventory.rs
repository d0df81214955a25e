//! Filesystem scan of the per-slide video directories.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

const VIDEO_EXTENSION: &str = "mp4";

/// Slide id -> playable video paths, each path being `<slide_id>/<file name>`
/// relative to the videos directory. Paths within a slide are sorted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inventory {
    slides: BTreeMap<String, Vec<String>>,
}

/// Whether a file name looks like a finished, visible video.
///
/// Names starting with `_` are hidden on purpose, `.part` files are downloads
/// still in progress.
pub fn is_playable_video_name(name: &str) -> bool {
    if name.starts_with('_') || name.ends_with(".part") {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(VIDEO_EXTENSION))
        .unwrap_or(false)
}

fn scan_slide_dir(
    slide_id: &str,
    slide_dir: &Path,
    min_video_bytes: u64,
) -> Result<Vec<String>, walkdir::Error> {
    let mut videos = Vec::new();
    for entry in WalkDir::new(slide_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str() else {
            warn!("Skipping non UTF-8 file name in {:?}", slide_dir);
            continue;
        };
        if !is_playable_video_name(name) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        if metadata.len() < min_video_bytes {
            warn!(
                "Skipping small/corrupt file {:?} ({} bytes)",
                entry.path(),
                metadata.len()
            );
            continue;
        }
        videos.push(format!("{}/{}", slide_id, name));
    }
    videos.sort();
    Ok(videos)
}

impl Inventory {
    pub fn new(slides: BTreeMap<String, Vec<String>>) -> Self {
        let slides = slides
            .into_iter()
            .map(|(slide_id, mut videos)| {
                videos.sort();
                videos.dedup();
                (slide_id, videos)
            })
            .collect();
        Self { slides }
    }

    /// Scans `videos_dir/<slide_id>/*.mp4`. A slide whose directory cannot be
    /// read is kept with no videos, so callers fall back to external sources
    /// for it instead of losing the whole scan.
    pub fn scan(videos_dir: &Path, min_video_bytes: u64) -> Self {
        let read_dir = match std::fs::read_dir(videos_dir) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                warn!("Video directory {:?} not readable: {}", videos_dir, err);
                return Self::default();
            }
        };

        let mut slide_dirs: Vec<(String, std::path::PathBuf)> = read_dir
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                Some((name, entry.path()))
            })
            .collect();
        slide_dirs.sort();

        let mut slides = BTreeMap::new();
        for (slide_id, slide_dir) in slide_dirs {
            let videos = match scan_slide_dir(&slide_id, &slide_dir, min_video_bytes) {
                Ok(videos) => videos,
                Err(err) => {
                    warn!("Failed to scan slide {}: {}", slide_id, err);
                    Vec::new()
                }
            };
            if !videos.is_empty() {
                info!("  {}: {} videos", slide_id, videos.len());
            }
            slides.insert(slide_id, videos);
        }

        let inventory = Self { slides };
        info!(
            "Inventory loaded: {} slides, {} videos",
            inventory.total_slides(),
            inventory.total_videos()
        );
        inventory
    }

    pub fn videos(&self, slide_id: &str) -> Option<&[String]> {
        self.slides.get(slide_id).map(|v| v.as_slice())
    }

    pub fn contains(&self, slide_id: &str, path: &str) -> bool {
        self.videos(slide_id)
            .map(|videos| videos.binary_search_by(|v| v.as_str().cmp(path)).is_ok())
            .unwrap_or(false)
    }

    pub fn slides(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.slides.iter()
    }

    pub fn all_paths(&self) -> HashSet<&str> {
        self.slides
            .values()
            .flat_map(|videos| videos.iter().map(|v| v.as_str()))
            .collect()
    }

    pub fn total_slides(&self) -> usize {
        self.slides.len()
    }

    pub fn total_videos(&self) -> usize {
        self.slides.values().map(|v| v.len()).sum()
    }
}
