use super::inventory::Inventory;
use super::play_counts::PlayCountFile;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use thiserror::Error;
use tracing::{error, info, warn};

/// URL prefix under which the videos directory is served.
pub const VIDEOS_URL_PREFIX: &str = "videos/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotationError {
    #[error("Unknown slide: {0}")]
    UnknownSlide(String),

    #[error("Video {path} is not part of slide {slide_id}")]
    UnknownVideo { slide_id: String, path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPlay {
    pub video_path: String,
    pub play_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The slide has no directory in the inventory.
    UnknownSlide,
    /// The slide exists but has no playable local file.
    NoLocalVideo,
    Video {
        path: String,
        play_count: u64,
        video_count: usize,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoEntry {
    pub path: String,
    pub filename: String,
    pub play_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventorySnapshot {
    pub slides: BTreeMap<String, Vec<VideoEntry>>,
    pub total_slides: usize,
    pub total_videos: usize,
    pub total_plays: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RotationTotals {
    pub total_slides: usize,
    pub total_videos: usize,
    pub total_plays: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReloadSummary {
    pub total_slides: usize,
    pub total_videos: usize,
    pub pruned_counts: usize,
}

/// Returns the video with the fewest plays; ties go to the lexicographically
/// smallest path so repeated calls with equal counts agree.
pub fn least_played<'a>(videos: &'a [String], counts: &HashMap<String, u64>) -> Option<&'a str> {
    videos
        .iter()
        .min_by(|a, b| {
            let count_a = counts.get(*a).copied().unwrap_or(0);
            let count_b = counts.get(*b).copied().unwrap_or(0);
            count_a.cmp(&count_b).then_with(|| a.cmp(b))
        })
        .map(|v| v.as_str())
}

/// Inventory paths a reported path may stand for: the path as given, then
/// the same path without the `/videos/` URL prefix handed to players.
pub fn video_path_candidates(raw: &str) -> [&str; 2] {
    let trimmed = raw.trim().trim_start_matches('/');
    [
        trimmed,
        trimmed.strip_prefix(VIDEOS_URL_PREFIX).unwrap_or(trimmed),
    ]
}

pub fn video_url(path: &str) -> String {
    format!("/{}{}", VIDEOS_URL_PREFIX, path)
}

fn prune_counts(counts: &mut HashMap<String, u64>, inventory: &Inventory) -> usize {
    let present = inventory.all_paths();
    let before = counts.len();
    counts.retain(|path, _| present.contains(path.as_str()));
    before - counts.len()
}

/// Owner of the video inventory and the play counters.
///
/// Lock order is inventory first, then counts. Increments and the file write
/// that follows them happen under the counts lock, so concurrent reports are
/// never lost.
pub struct VideoRotation {
    videos_dir: PathBuf,
    min_video_bytes: u64,
    inventory: RwLock<Inventory>,
    counts: Mutex<HashMap<String, u64>>,
    counts_file: PlayCountFile,
}

impl VideoRotation {
    /// Scans `videos_dir` and loads persisted counts, dropping counts of files
    /// that are no longer there.
    pub fn open<P: AsRef<Path>>(videos_dir: P, min_video_bytes: u64, counts_file: PlayCountFile) -> Self {
        let videos_dir = videos_dir.as_ref().to_path_buf();
        let inventory = Inventory::scan(&videos_dir, min_video_bytes);
        Self::with_inventory(videos_dir, min_video_bytes, inventory, counts_file)
    }

    pub fn with_inventory(
        videos_dir: PathBuf,
        min_video_bytes: u64,
        inventory: Inventory,
        counts_file: PlayCountFile,
    ) -> Self {
        let mut counts = match counts_file.load() {
            Ok(counts) => {
                info!("Loaded {} play count entries", counts.len());
                counts
            }
            Err(err) => {
                error!("Error loading play counts, starting fresh: {:#}", err);
                HashMap::new()
            }
        };
        let pruned = prune_counts(&mut counts, &inventory);
        if pruned > 0 {
            info!("Cleaned up {} stale play count entries", pruned);
        }

        Self {
            videos_dir,
            min_video_bytes,
            inventory: RwLock::new(inventory),
            counts: Mutex::new(counts),
            counts_file,
        }
    }

    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    pub fn select(&self, slide_id: &str) -> Selection {
        let inventory = self.inventory.read().unwrap();
        let Some(videos) = inventory.videos(slide_id) else {
            return Selection::UnknownSlide;
        };
        let counts = self.counts.lock().unwrap();
        match least_played(videos, &counts) {
            Some(path) => Selection::Video {
                path: path.to_string(),
                play_count: counts.get(path).copied().unwrap_or(0),
                video_count: videos.len(),
            },
            None => Selection::NoLocalVideo,
        }
    }

    /// Counts one play of `raw_path`, which must be one of the slide's
    /// current videos.
    pub fn record_played(
        &self,
        slide_id: &str,
        raw_path: &str,
    ) -> Result<RecordedPlay, RotationError> {
        let candidates = video_path_candidates(raw_path);
        let inventory = self.inventory.read().unwrap();
        if inventory.videos(slide_id).is_none() {
            return Err(RotationError::UnknownSlide(slide_id.to_string()));
        }
        let Some(path) = candidates
            .into_iter()
            .find(|path| inventory.contains(slide_id, path))
        else {
            let path = candidates[1];
            warn!("Rejected play report for {}: {}", slide_id, path);
            return Err(RotationError::UnknownVideo {
                slide_id: slide_id.to_string(),
                path: path.to_string(),
            });
        };

        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(path.to_string()).or_insert(0);
        *count += 1;
        let play_count = *count;
        if let Err(err) = self.counts_file.save(&counts) {
            error!("Error saving play counts: {:#}", err);
        }
        Ok(RecordedPlay {
            video_path: path.to_string(),
            play_count,
        })
    }

    /// Rescans the videos directory. Counts survive for files still present
    /// and are dropped for the ones that disappeared.
    pub fn reload(&self) -> ReloadSummary {
        let fresh = Inventory::scan(&self.videos_dir, self.min_video_bytes);

        let mut inventory = self.inventory.write().unwrap();
        *inventory = fresh;
        let mut counts = self.counts.lock().unwrap();
        let pruned_counts = prune_counts(&mut counts, &inventory);
        if pruned_counts > 0 {
            info!("Cleaned up {} stale play count entries", pruned_counts);
            if let Err(err) = self.counts_file.save(&counts) {
                error!("Error saving play counts: {:#}", err);
            }
        }

        ReloadSummary {
            total_slides: inventory.total_slides(),
            total_videos: inventory.total_videos(),
            pruned_counts,
        }
    }

    pub fn play_count(&self, path: &str) -> u64 {
        self.counts
            .lock()
            .unwrap()
            .get(path.trim().trim_start_matches('/'))
            .copied()
            .unwrap_or(0)
    }

    pub fn video_count(&self, slide_id: &str) -> usize {
        self.inventory
            .read()
            .unwrap()
            .videos(slide_id)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    pub fn totals(&self) -> RotationTotals {
        let inventory = self.inventory.read().unwrap();
        let counts = self.counts.lock().unwrap();
        RotationTotals {
            total_slides: inventory.total_slides(),
            total_videos: inventory.total_videos(),
            total_plays: counts.values().sum(),
        }
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        let inventory = self.inventory.read().unwrap();
        let counts = self.counts.lock().unwrap();
        let slides = inventory
            .slides()
            .map(|(slide_id, videos)| {
                let entries = videos
                    .iter()
                    .map(|path| VideoEntry {
                        path: path.clone(),
                        filename: path.rsplit('/').next().unwrap_or(path).to_string(),
                        play_count: counts.get(path).copied().unwrap_or(0),
                    })
                    .collect();
                (slide_id.clone(), entries)
            })
            .collect();

        InventorySnapshot {
            slides,
            total_slides: inventory.total_slides(),
            total_videos: inventory.total_videos(),
            total_plays: counts.values().sum(),
        }
    }
}
