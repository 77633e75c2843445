//! # Solveil Scanner
//!
//! Batch scanning of announcement registries to discover payments.
//!
//! ## Features
//!
//! - **Batch processing**: walks the registry in configurable ID batches
//! - **Resumable scans**: tracks the last scanned ID to continue later
//! - **Progress reporting**: callback hook for UI updates
//! - **Balance lookup**: optional [`ChainQuery`] integration so discovered
//!   payments carry their lamport balance
//!
//! Cancellation follows the runtime: dropping the future returned by a
//! scan method cancels it between registry batches.
//!
//! ## Example
//!
//! ```rust,ignore
//! use solveil_scanner::{Scanner, ScannerConfig};
//! use solveil_registry::MemoryRegistry;
//!
//! let scanner = Scanner::new(account.into_keys());
//! let discoveries = scanner.scan_all(&registry).await?;
//! for payment in discoveries {
//!     println!("found payment at {}", payment.stealth_address);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use solveil_core::error::Result;
use solveil_core::traits::{AnnouncementRegistry, ChainQuery};
use solveil_core::types::{Announcement, StealthKeys};
use solveil_core::DEFAULT_SCAN_BATCH_SIZE;
use solveil_stealth::discovery::{scan_announcement, DiscoveredPayment, ScanResult, ScanStats};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Scanner configuration.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    /// Registry batch size.
    pub batch_size: usize,
    /// Stop after the first discovery.
    pub stop_on_first: bool,
    /// Minimum timestamp to scan from (inclusive).
    pub from_timestamp: Option<u64>,
    /// Maximum timestamp to scan to (inclusive).
    pub to_timestamp: Option<u64>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SCAN_BATCH_SIZE,
            stop_on_first: false,
            from_timestamp: None,
            to_timestamp: None,
        }
    }
}

impl ScannerConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Enables stopping on first discovery.
    pub fn stop_on_first(mut self) -> Self {
        self.stop_on_first = true;
        self
    }

    /// Sets the time range filter (inclusive).
    pub fn time_range(mut self, from: u64, to: u64) -> Self {
        self.from_timestamp = Some(from);
        self.to_timestamp = Some(to);
        self
    }

    fn passes_time_filter(&self, announcement: &Announcement) -> bool {
        if let Some(from) = self.from_timestamp {
            if announcement.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to_timestamp {
            if announcement.timestamp > to {
                return false;
            }
        }
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROGRESS AND POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Scan progress information.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Total announcements in the registry.
    pub total: u64,
    /// Announcements scanned so far.
    pub scanned: u64,
    /// Discoveries so far.
    pub discoveries: u64,
    /// Scan rate (announcements per second).
    pub rate: f64,
    /// Percentage complete (0-100).
    pub percent: f64,
}

impl ScanProgress {
    fn new(total: u64) -> Self {
        Self {
            total,
            scanned: 0,
            discoveries: 0,
            rate: 0.0,
            percent: 0.0,
        }
    }

    fn update(&mut self, scanned: u64, discoveries: u64, elapsed_ms: u64) {
        self.scanned = scanned;
        self.discoveries = discoveries;
        if elapsed_ms > 0 {
            self.rate = (scanned as f64 / elapsed_ms as f64) * 1000.0;
        }
        if self.total > 0 {
            self.percent = (scanned as f64 / self.total as f64) * 100.0;
        }
    }
}

/// Scan position for resumable scanning.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScanPosition {
    /// Last scanned announcement ID.
    pub last_id: u64,
    /// Last scanned timestamp.
    pub last_timestamp: u64,
    /// Announcements scanned in this session.
    pub total_scanned: u64,
    /// Discoveries in this session.
    pub total_discoveries: u64,
}

impl ScanPosition {
    /// Creates a fresh position.
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, announcement: &Announcement, discovered: bool) {
        self.last_id = announcement.id;
        self.last_timestamp = announcement.timestamp;
        self.total_scanned += 1;
        if discovered {
            self.total_discoveries += 1;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Walks a registry and discovers payments for one key bundle.
///
/// Per announcement: view-tag filter, then the mandatory expected-address
/// equality check, then signing-key recovery; optionally a chain balance
/// query. Foreign announcements are silent negatives.
pub struct Scanner {
    keys: StealthKeys,
    position: RwLock<ScanPosition>,
    stats: RwLock<ScanStats>,
}

impl Scanner {
    /// Creates a scanner over a key bundle.
    ///
    /// Use [`Account::into_keys`](solveil_stealth::Account::into_keys) to
    /// hand an account's keys to the scanner.
    pub fn new(keys: StealthKeys) -> Self {
        Self {
            keys,
            position: RwLock::new(ScanPosition::new()),
            stats: RwLock::new(ScanStats::new()),
        }
    }

    /// Returns the current scan position.
    pub fn position(&self) -> ScanPosition {
        self.position.read().clone()
    }

    /// Returns the accumulated statistics.
    pub fn stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    /// Resets position and statistics; the next scan starts from the
    /// beginning of the registry.
    pub fn reset_position(&self) {
        *self.position.write() = ScanPosition::new();
        *self.stats.write() = ScanStats::new();
    }

    /// Scans everything after the current position with default
    /// configuration.
    #[instrument(skip(self, registry))]
    pub async fn scan_all(
        &self,
        registry: &dyn AnnouncementRegistry,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.scan_with_config(registry, ScannerConfig::default())
            .await
    }

    /// Scans with custom configuration.
    #[instrument(skip(self, registry, config))]
    pub async fn scan_with_config(
        &self,
        registry: &dyn AnnouncementRegistry,
        config: ScannerConfig,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.scan_inner(registry, None, config, None).await
    }

    /// Scans and queries the chain for each discovery's balance.
    #[instrument(skip(self, registry, chain, config))]
    pub async fn scan_funded(
        &self,
        registry: &dyn AnnouncementRegistry,
        chain: &dyn ChainQuery,
        config: ScannerConfig,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.scan_inner(registry, Some(chain), config, None).await
    }

    /// Scans with progress reporting.
    #[instrument(skip(self, registry, config, progress_callback))]
    pub async fn scan_with_progress(
        &self,
        registry: &dyn AnnouncementRegistry,
        config: ScannerConfig,
        progress_callback: ProgressCallback,
    ) -> Result<Vec<DiscoveredPayment>> {
        self.scan_inner(registry, None, config, Some(progress_callback))
            .await
    }

    /// Scans a single announcement without touching position tracking.
    pub fn scan_one(&self, announcement: &Announcement) -> ScanResult {
        let result = scan_announcement(&self.keys, announcement);
        self.stats.write().record(&result);
        result
    }

    async fn scan_inner(
        &self,
        registry: &dyn AnnouncementRegistry,
        chain: Option<&dyn ChainQuery>,
        config: ScannerConfig,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<Vec<DiscoveredPayment>> {
        let start = Instant::now();
        let mut discoveries = Vec::new();
        let mut scanned = 0u64;

        let total = registry.count().await?;
        let mut progress = ScanProgress::new(total);

        info!(total, batch_size = config.batch_size, "Starting scan");

        let mut last_id = self.position.read().last_id;
        loop {
            let batch = registry.get_after(last_id, config.batch_size).await?;
            if batch.is_empty() {
                break;
            }

            debug!(after = last_id, count = batch.len(), "Scanning batch");

            for announcement in &batch {
                last_id = announcement.id;

                if !config.passes_time_filter(announcement) {
                    self.position.write().update(announcement, false);
                    continue;
                }

                let result = scan_announcement(&self.keys, announcement);
                self.stats.write().record(&result);
                scanned += 1;

                let discovered = result.is_discovered();
                self.position.write().update(announcement, discovered);

                if let Some(mut payment) = result.into_payment() {
                    if let Some(chain) = chain {
                        payment.lamports = Some(chain.balance(&payment.stealth_address).await?);
                    }
                    discoveries.push(payment);

                    if config.stop_on_first {
                        info!("Stopping on first discovery");
                        return Ok(discoveries);
                    }
                }

                if let Some(callback) = &progress_callback {
                    if scanned % 100 == 0 {
                        progress.update(
                            scanned,
                            discoveries.len() as u64,
                            start.elapsed().as_millis() as u64,
                        );
                        callback(progress.clone());
                    }
                }
            }
        }

        let duration = start.elapsed();
        {
            let mut stats = self.stats.write();
            stats.duration_ms = duration.as_millis() as u64;
        }

        if let Some(callback) = &progress_callback {
            progress.update(
                scanned,
                discoveries.len() as u64,
                duration.as_millis() as u64,
            );
            callback(progress);
        }

        let stats = self.stats.read();
        info!(
            discoveries = discoveries.len(),
            scanned = stats.total_scanned,
            duration_ms = stats.duration_ms,
            "Scan complete"
        );

        Ok(discoveries)
    }
}

/// Scan result summary, suitable for serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Announcements scanned.
    pub total_scanned: u64,
    /// Payments discovered.
    pub discoveries: u64,
    /// Malformed announcements skipped.
    pub errors: u64,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Scan rate (announcements per second).
    pub rate: f64,
    /// Percentage of announcements filtered out.
    pub filter_efficiency: f64,
}

impl From<ScanStats> for ScanSummary {
    fn from(stats: ScanStats) -> Self {
        Self {
            total_scanned: stats.total_scanned,
            discoveries: stats.discoveries,
            errors: stats.errors,
            duration_ms: stats.duration_ms,
            rate: stats.rate(),
            filter_efficiency: stats.filter_efficiency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    use solveil_core::error::SolveilError;
    use solveil_core::types::{Pubkey, StealthAddress};
    use solveil_registry::MemoryRegistry;
    use solveil_stealth::{Account, Payment};

    struct FixedBalance(u64);

    #[async_trait]
    impl ChainQuery for FixedBalance {
        async fn balance(&self, _address: &StealthAddress) -> Result<u64> {
            Ok(self.0)
        }
    }

    struct FailingChain;

    #[async_trait]
    impl ChainQuery for FailingChain {
        async fn balance(&self, _address: &StealthAddress) -> Result<u64> {
            Err(SolveilError::ChainError("rpc unreachable".into()))
        }
    }

    fn setup() -> (Scanner, Account) {
        let account = Account::generate().unwrap();
        let backup = Account::from_keystore_json(&account.to_keystore_json().unwrap()).unwrap();
        (Scanner::new(backup.into_keys()), account)
    }

    async fn publish_for(registry: &MemoryRegistry, account: &Account) -> Payment {
        let payment = Payment::for_recipient(&account.meta_address()).unwrap();
        registry.publish(payment.announcement()).await.unwrap();
        payment
    }

    async fn publish_foreign(registry: &MemoryRegistry) {
        let other = Account::generate().unwrap();
        let payment = Payment::for_recipient(&other.meta_address()).unwrap();
        registry.publish(payment.announcement()).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_empty_registry() {
        let (scanner, _) = setup();
        let registry = MemoryRegistry::new();
        assert!(scanner.scan_all(&registry).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_finds_own_payment() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        let payment = publish_for(&registry, &account).await;
        let discoveries = scanner.scan_all(&registry).await.unwrap();

        assert_eq!(discoveries.len(), 1);
        assert_eq!(discoveries[0].stealth_address, payment.stealth_address());
        assert_eq!(
            discoveries[0].signing_key.public(),
            payment.stealth_address().pubkey()
        );
    }

    #[tokio::test]
    async fn test_scan_ignores_foreign_payments() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        publish_for(&registry, &account).await;
        for _ in 0..10 {
            publish_foreign(&registry).await;
        }

        let discoveries = scanner.scan_all(&registry).await.unwrap();
        assert_eq!(discoveries.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_multiple_payments() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        for _ in 0..5 {
            publish_for(&registry, &account).await;
        }

        let discoveries = scanner.scan_all(&registry).await.unwrap();
        assert_eq!(discoveries.len(), 5);
    }

    #[tokio::test]
    async fn test_scan_stop_on_first() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        for _ in 0..3 {
            publish_for(&registry, &account).await;
        }

        let config = ScannerConfig::new().stop_on_first();
        let discoveries = scanner.scan_with_config(&registry, config).await.unwrap();
        assert_eq!(discoveries.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_time_filter() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        for ts in [100u64, 200, 300] {
            let payment = Payment::for_recipient(&account.meta_address()).unwrap();
            let mut ann = payment.announcement();
            ann.timestamp = ts;
            registry.publish(ann).await.unwrap();
        }

        let config = ScannerConfig::new().time_range(150, 250);
        let discoveries = scanner.scan_with_config(&registry, config).await.unwrap();
        assert_eq!(discoveries.len(), 1);
        assert_eq!(discoveries[0].timestamp, 200);
    }

    #[tokio::test]
    async fn test_scan_resumes_from_position() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        publish_for(&registry, &account).await;
        let first = scanner.scan_all(&registry).await.unwrap();
        assert_eq!(first.len(), 1);

        // A second scan over the same registry finds nothing new
        let again = scanner.scan_all(&registry).await.unwrap();
        assert!(again.is_empty());

        // New announcements after the position are picked up
        publish_for(&registry, &account).await;
        let more = scanner.scan_all(&registry).await.unwrap();
        assert_eq!(more.len(), 1);

        let pos = scanner.position();
        assert_eq!(pos.total_discoveries, 2);
    }

    #[tokio::test]
    async fn test_reset_position_rescans() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        publish_for(&registry, &account).await;
        assert_eq!(scanner.scan_all(&registry).await.unwrap().len(), 1);

        scanner.reset_position();
        assert_eq!(scanner.scan_all(&registry).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_funded_attaches_balances() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();
        publish_for(&registry, &account).await;

        let chain = FixedBalance(1_500_000);
        let discoveries = scanner
            .scan_funded(&registry, &chain, ScannerConfig::new())
            .await
            .unwrap();

        assert_eq!(discoveries.len(), 1);
        assert_eq!(discoveries[0].lamports, Some(1_500_000));
    }

    #[tokio::test]
    async fn test_scan_funded_propagates_chain_errors() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();
        publish_for(&registry, &account).await;

        let result = scanner
            .scan_funded(&registry, &FailingChain, ScannerConfig::new())
            .await;
        assert!(matches!(result, Err(SolveilError::ChainError(_))));
    }

    #[tokio::test]
    async fn test_scan_with_progress_callback() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        for _ in 0..3 {
            publish_for(&registry, &account).await;
        }

        let updates = Arc::new(RwLock::new(Vec::new()));
        let updates_clone = updates.clone();
        let callback: ProgressCallback = Box::new(move |progress| {
            updates_clone.write().push(progress);
        });

        scanner
            .scan_with_progress(&registry, ScannerConfig::new(), callback)
            .await
            .unwrap();

        let updates = updates.read();
        assert!(!updates.is_empty());
        let last = updates.last().unwrap();
        assert!(last.percent >= 99.0);
        assert_eq!(last.discoveries, 3);
    }

    #[tokio::test]
    async fn test_scan_skips_malformed_announcements() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        // A structurally valid announcement whose ephemeral key is a
        // small-order point
        let mut bad_point = [0u8; 32];
        bad_point[0] = 1;
        let ann = solveil_core::types::Announcement::new(
            Pubkey::from_array(bad_point),
            7,
            StealthAddress::from_array([9; 32]),
        );
        registry.publish(ann).await.unwrap();
        publish_for(&registry, &account).await;

        let discoveries = scanner.scan_all(&registry).await.unwrap();
        assert_eq!(discoveries.len(), 1);
        assert_eq!(scanner.stats().errors, 1);
    }

    #[tokio::test]
    async fn test_scan_summary_from_stats() {
        let (scanner, account) = setup();
        let registry = MemoryRegistry::new();

        publish_for(&registry, &account).await;
        publish_foreign(&registry).await;

        scanner.scan_all(&registry).await.unwrap();

        let summary = ScanSummary::from(scanner.stats());
        assert_eq!(summary.total_scanned, 2);
        assert_eq!(summary.discoveries, 1);
    }
}
