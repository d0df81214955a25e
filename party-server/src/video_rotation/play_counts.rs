//! Durable storage of per-video play counts.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const PLAY_COUNTS_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct PersistedPlayCounts {
    version: u32,
    last_updated: String,
    counts: BTreeMap<String, u64>,
}

/// JSON file holding `path -> count`. Writes go through a temp file in the
/// same directory followed by a rename, so readers never see a torn file.
#[derive(Debug, Clone)]
pub struct PlayCountFile {
    path: PathBuf,
}

impl PlayCountFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty map.
    pub fn load(&self) -> Result<HashMap<String, u64>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read play counts {:?}", self.path))?;
        let persisted: PersistedPlayCounts = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse play counts {:?}", self.path))?;
        Ok(persisted.counts.into_iter().collect())
    }

    pub fn save(&self, counts: &HashMap<String, u64>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {:?}", dir))?;

        let persisted = PersistedPlayCounts {
            version: PLAY_COUNTS_FORMAT_VERSION,
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            counts: counts.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
        serde_json::to_writer_pretty(&mut tmp, &persisted)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let file = PlayCountFile::new(dir.path().join("play_counts.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn saved_counts_load_back() {
        let dir = TempDir::new().unwrap();
        let file = PlayCountFile::new(dir.path().join("nested").join("play_counts.json"));
        let mut counts = HashMap::new();
        counts.insert("one-dance/a.mp4".to_string(), 3);
        counts.insert("lemonade/x.mp4".to_string(), 1);

        file.save(&counts).unwrap();

        assert_eq!(file.load().unwrap(), counts);
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["counts"]["one-dance/a.mp4"], 3);
        assert!(raw["last_updated"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let file = PlayCountFile::new(dir.path().join("play_counts.json"));
        let mut counts = HashMap::new();
        for i in 0..5 {
            counts.insert("s/a.mp4".to_string(), i);
            file.save(&counts).unwrap();
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(file.load().unwrap()["s/a.mp4"], 4);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("play_counts.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PlayCountFile::new(path).load().is_err());
    }
}
