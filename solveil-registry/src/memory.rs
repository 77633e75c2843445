//! In-memory announcement registry.
//!
//! Fast, thread-safe storage suitable for development, testing, and
//! single-process deployments.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use solveil_core::error::Result;
use solveil_core::traits::AnnouncementRegistry;
use solveil_core::types::{Announcement, AnnouncementStats};

/// In-memory announcement registry.
///
/// # Indexing
///
/// Announcements are indexed by:
/// - ID: direct lookup and batch iteration (`get_after`)
/// - View tag: O(1) bucket lookup for distribution queries
/// - Timestamp: time-range scans
///
/// # Thread Safety
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug)]
pub struct MemoryRegistry {
    /// Primary storage: ID -> Announcement
    announcements: DashMap<u64, Announcement>,
    /// View tag index: tag -> [announcement IDs]
    view_tag_index: DashMap<u8, Vec<u64>>,
    /// Next announcement ID
    next_id: AtomicU64,
    /// Registry statistics
    stats: RwLock<AnnouncementStats>,
}

impl MemoryRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            announcements: DashMap::new(),
            view_tag_index: DashMap::new(),
            next_id: AtomicU64::new(1),
            stats: RwLock::new(AnnouncementStats::new()),
        }
    }

    /// Creates a registry with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            announcements: DashMap::with_capacity(capacity),
            view_tag_index: DashMap::with_capacity(256),
            next_id: AtomicU64::new(1),
            stats: RwLock::new(AnnouncementStats::new()),
        }
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> AnnouncementStats {
        self.stats.read().clone()
    }

    /// Clears all announcements.
    pub fn clear(&self) {
        self.announcements.clear();
        self.view_tag_index.clear();
        self.next_id.store(1, Ordering::SeqCst);
        *self.stats.write() = AnnouncementStats::new();
    }

    /// Returns the number of announcements.
    pub fn len(&self) -> usize {
        self.announcements.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.announcements.is_empty()
    }

    /// Returns all announcements (export/backup).
    pub fn all_announcements(&self) -> Vec<Announcement> {
        let mut all: Vec<Announcement> = self
            .announcements
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|a| a.id);
        all
    }

    /// Imports announcements, preserving IDs where present.
    ///
    /// Used to restore from backup or sync from another source.
    pub fn import(&self, announcements: Vec<Announcement>) -> Result<usize> {
        let mut imported = 0;

        for mut ann in announcements {
            if ann.id == 0 {
                ann.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            } else {
                let current = self.next_id.load(Ordering::SeqCst);
                if ann.id >= current {
                    self.next_id.store(ann.id + 1, Ordering::SeqCst);
                }
            }

            ann.validate()?;

            self.view_tag_index
                .entry(ann.view_tag)
                .or_insert_with(Vec::new)
                .push(ann.id);
            self.stats.write().add(&ann);
            self.announcements.insert(ann.id, ann);
            imported += 1;
        }

        Ok(imported)
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnnouncementRegistry for MemoryRegistry {
    #[instrument(skip(self, announcement), fields(view_tag = announcement.view_tag))]
    async fn publish(&self, mut announcement: Announcement) -> Result<u64> {
        announcement.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        announcement.id = id;

        debug!(id, view_tag = announcement.view_tag, "Publishing announcement");

        self.view_tag_index
            .entry(announcement.view_tag)
            .or_insert_with(Vec::new)
            .push(id);
        self.stats.write().add(&announcement);
        self.announcements.insert(id, announcement);

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: u64) -> Result<Option<Announcement>> {
        Ok(self.announcements.get(&id).map(|entry| entry.clone()))
    }

    #[instrument(skip(self))]
    async fn get_after(&self, after_id: u64, limit: usize) -> Result<Vec<Announcement>> {
        let mut ids: Vec<u64> = self
            .announcements
            .iter()
            .map(|entry| *entry.key())
            .filter(|id| *id > after_id)
            .collect();
        ids.sort_unstable();
        ids.truncate(limit.min(solveil_core::MAX_SCAN_BATCH_SIZE));

        let mut batch = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(ann) = self.announcements.get(&id) {
                batch.push(ann.clone());
            }
        }

        debug!(after_id, count = batch.len(), "Retrieved batch");
        Ok(batch)
    }

    #[instrument(skip(self))]
    async fn get_by_view_tag(&self, view_tag: u8) -> Result<Vec<Announcement>> {
        let ids = match self.view_tag_index.get(&view_tag) {
            Some(ids) => ids.clone(),
            None => return Ok(Vec::new()),
        };

        let mut announcements = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(ann) = self.announcements.get(&id) {
                announcements.push(ann.clone());
            }
        }

        debug!(view_tag, count = announcements.len(), "Retrieved by view tag");
        Ok(announcements)
    }

    #[instrument(skip(self))]
    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<Announcement>> {
        let mut announcements: Vec<Announcement> = self
            .announcements
            .iter()
            .filter(|entry| {
                let ts = entry.value().timestamp;
                ts >= start && ts <= end
            })
            .map(|entry| entry.value().clone())
            .collect();

        announcements.sort_by_key(|a| a.timestamp);

        debug!(start, end, count = announcements.len(), "Retrieved by time range");
        Ok(announcements)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.announcements.len() as u64)
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.next_id.load(Ordering::SeqCst))
    }
}
