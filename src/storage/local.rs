//! Local filesystem state store.
//!
//! Titles are written oldest first, one per line, capped at `max_saved`.
//! Writes go to a temporary sibling that is renamed over the target, so a
//! crash mid-write leaves the previous file intact.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::SeenState;
use crate::storage::StateStore;

/// Seen-state kept in a flat text file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
    max_saved: usize,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>, max_saved: usize) -> Self {
        Self {
            path: path.into(),
            max_saved,
        }
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> SeenState {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let state: SeenState = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect();
                log::debug!("Loaded {} seen title(s) from {}", state.len(), self.location());
                state
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No state file at {}; treating as first run", self.location());
                SeenState::new()
            }
            Err(e) => {
                log::warn!(
                    "State file {} is unreadable ({}); treating as first run",
                    self.location(),
                    e
                );
                SeenState::new()
            }
        }
    }

    async fn save(&self, state: &SeenState) -> Result<()> {
        let kept = state.newest(self.max_saved);
        let mut content = kept.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        self.write_bytes(content.as_bytes()).await?;
        log::info!("Saved {} seen title(s) to {}", kept.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn titles(n: usize) -> SeenState {
        (0..n).map(|i| format!("Notice {i}")).collect()
    }

    #[tokio::test]
    async fn test_missing_file_is_first_run() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::new(tmp.path().join("nope.txt"), 200);

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_first_run() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let store = FileStateStore::new(&path, 200);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        let store = FileStateStore::new(&path, 200);

        let state: SeenState = ["Exam routine", "Holiday notice"].into_iter().collect();
        store.save(&state).await.unwrap();

        assert_eq!(store.load().await, state);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Exam routine\nHoliday notice\n"
        );
    }

    #[tokio::test]
    async fn test_save_caps_to_newest() {
        let tmp = TempDir::new().unwrap();
        let store = FileStateStore::new(tmp.path().join("seen.txt"), 200);

        store.save(&titles(250)).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 200);
        assert!(!loaded.contains("Notice 49"));
        assert!(loaded.contains("Notice 50"));
        assert!(loaded.contains("Notice 249"));
    }

    #[tokio::test]
    async fn test_load_skips_blank_lines_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        std::fs::write(&path, "A\n\n  \nB\nA\n").unwrap();

        let loaded = FileStateStore::new(&path, 200).load().await;
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/seen.txt");
        let store = FileStateStore::new(&path, 10);

        store.save(&titles(3)).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_previous_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.txt");
        std::fs::write(&path, "Old\n").unwrap();
        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(path.with_extension("tmp")).unwrap();

        let store = FileStateStore::new(&path, 10);
        assert!(store.save(&titles(3)).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Old\n");
    }
}
