//! File-backed announcement registry.
//!
//! A memory registry with persistence: saves are atomic (temp file +
//! rename) and can be triggered automatically after a configurable number
//! of writes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use solveil_core::error::{Result, SolveilError};
use solveil_core::traits::AnnouncementRegistry;
use solveil_core::types::{Announcement, AnnouncementStats};

use crate::MemoryRegistry;

/// File format magic bytes.
const MAGIC: &[u8; 4] = b"VEIL";
/// Current file format version.
const VERSION: u8 = 1;
/// Header: magic (4) + version (1) + count (8).
const HEADER_SIZE: usize = 13;

/// File-backed announcement registry.
///
/// # File Format
///
/// ```text
/// magic (4 bytes): "VEIL"
/// version (1 byte): 1
/// count (8 bytes LE): number of announcements
/// body: JSON array of announcements
/// ```
pub struct FileRegistry {
    path: PathBuf,
    memory: MemoryRegistry,
    dirty: AtomicBool,
    auto_save_threshold: u64,
    writes_since_save: AtomicU64,
}

impl FileRegistry {
    /// Opens (or creates) a file registry at the given path.
    ///
    /// An existing file is loaded; otherwise the registry starts empty and
    /// the file is created on first save.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let registry = Self {
            path: path.as_ref().to_path_buf(),
            memory: MemoryRegistry::new(),
            dirty: AtomicBool::new(false),
            auto_save_threshold: 100,
            writes_since_save: AtomicU64::new(0),
        };

        if registry.path.exists() {
            registry.load().await?;
        }

        Ok(registry)
    }

    /// Opens a file registry with a custom auto-save threshold.
    pub async fn with_auto_save(path: impl AsRef<Path>, threshold: u64) -> Result<Self> {
        let mut registry = Self::new(path).await?;
        registry.auto_save_threshold = threshold;
        Ok(registry)
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<()> {
        let mut file = fs::File::open(&self.path).await?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await?;

        if contents.len() < HEADER_SIZE {
            return Err(SolveilError::RegistryError("file too short".into()));
        }
        if &contents[0..4] != MAGIC {
            return Err(SolveilError::RegistryError("invalid magic bytes".into()));
        }
        let version = contents[4];
        if version != VERSION {
            return Err(SolveilError::VersionMismatch {
                expected: VERSION,
                actual: version,
            });
        }

        let count = u64::from_le_bytes(
            contents[5..HEADER_SIZE]
                .try_into()
                .expect("header slice is 8 bytes"),
        );
        info!(count, "Loading announcements from file");

        if contents.len() > HEADER_SIZE {
            let announcements: Vec<Announcement> = serde_json::from_slice(&contents[HEADER_SIZE..])
                .map_err(|e| SolveilError::RegistryError(format!("corrupt body: {e}")))?;
            self.memory.import(announcements)?;
        }

        self.dirty.store(false, Ordering::SeqCst);
        debug!("Registry loaded");
        Ok(())
    }

    /// Saves all announcements to the file, atomically.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<()> {
        let announcements = self.memory.all_announcements();
        let count = announcements.len() as u64;

        info!(count, path = ?self.path, "Saving registry");

        let serialized = serde_json::to_vec(&announcements)?;

        let mut contents = Vec::with_capacity(HEADER_SIZE + serialized.len());
        contents.extend_from_slice(MAGIC);
        contents.push(VERSION);
        contents.extend_from_slice(&count.to_le_bytes());
        contents.extend_from_slice(&serialized);

        // Write to temp, fsync, then rename into place
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;

        self.dirty.store(false, Ordering::SeqCst);
        self.writes_since_save.store(0, Ordering::SeqCst);

        debug!("Registry saved");
        Ok(())
    }

    /// Returns true if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Saves if dirty.
    pub async fn flush(&self) -> Result<()> {
        if self.is_dirty() {
            self.save().await?;
        }
        Ok(())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns statistics.
    pub fn stats(&self) -> AnnouncementStats {
        self.memory.stats()
    }

    /// Returns the number of announcements.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    async fn maybe_auto_save(&self) -> Result<()> {
        let writes = self.writes_since_save.fetch_add(1, Ordering::SeqCst);
        if writes >= self.auto_save_threshold {
            self.save().await?;
        }
        Ok(())
    }
}

impl Drop for FileRegistry {
    fn drop(&mut self) {
        if self.is_dirty() {
            warn!("FileRegistry dropped with unsaved changes");
        }
    }
}

#[async_trait]
impl AnnouncementRegistry for FileRegistry {
    async fn publish(&self, announcement: Announcement) -> Result<u64> {
        let id = self.memory.publish(announcement).await?;
        self.dirty.store(true, Ordering::SeqCst);
        self.maybe_auto_save().await?;
        Ok(id)
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<Announcement>> {
        self.memory.get_by_id(id).await
    }

    async fn get_after(&self, after_id: u64, limit: usize) -> Result<Vec<Announcement>> {
        self.memory.get_after(after_id, limit).await
    }

    async fn get_by_view_tag(&self, view_tag: u8) -> Result<Vec<Announcement>> {
        self.memory.get_by_view_tag(view_tag).await
    }

    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<Announcement>> {
        self.memory.get_by_time_range(start, end).await
    }

    async fn count(&self) -> Result<u64> {
        self.memory.count().await
    }

    async fn next_id(&self) -> Result<u64> {
        self.memory.next_id().await
    }
}
