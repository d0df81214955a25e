mod inventory;
mod play_counts;
mod rotation;

pub use inventory::{is_playable_video_name, Inventory};
pub use play_counts::PlayCountFile;
pub use rotation::{
    least_played, video_path_candidates, video_url, InventorySnapshot, RecordedPlay,
    ReloadSummary, RotationError, RotationTotals, Selection, VideoEntry, VideoRotation,
};
