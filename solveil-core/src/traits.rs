//! Async seams between the cryptographic core and the outside world.
//!
//! The core never talks to a chain or a database directly; it consumes
//! these two narrow interfaces. Both are object-safe so callers can hand
//! in test doubles.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Announcement, StealthAddress};

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for announcement storage and retrieval.
///
/// Implementations might use:
/// - In-memory storage (testing/development)
/// - A local file (single-node durability)
/// - An indexer over on-chain memo transactions
#[async_trait]
pub trait AnnouncementRegistry: Send + Sync {
    /// Publishes a new announcement. Returns the assigned announcement ID.
    async fn publish(&self, announcement: Announcement) -> Result<u64>;

    /// Retrieves a specific announcement by ID.
    async fn get_by_id(&self, id: u64) -> Result<Option<Announcement>>;

    /// Retrieves up to `limit` announcements with IDs strictly greater than
    /// `after_id`, in ascending ID order. This is the scanner's batch
    /// iteration primitive and makes scans resumable.
    async fn get_after(&self, after_id: u64, limit: usize) -> Result<Vec<Announcement>>;

    /// Retrieves announcements carrying the given view tag.
    async fn get_by_view_tag(&self, view_tag: u8) -> Result<Vec<Announcement>>;

    /// Retrieves announcements within a time range (inclusive).
    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<Announcement>>;

    /// Returns total announcement count.
    async fn count(&self) -> Result<u64>;

    /// Returns the next available announcement ID.
    async fn next_id(&self) -> Result<u64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN QUERY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for the chain-side queries the scanner needs.
///
/// Calls are cancellable by dropping the returned future.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Returns the lamport balance of an account.
    async fn balance(&self, address: &StealthAddress) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pubkey;

    struct FixedBalance(u64);

    #[async_trait]
    impl ChainQuery for FixedBalance {
        async fn balance(&self, _address: &StealthAddress) -> Result<u64> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_chain_query_object_safety() {
        let chain: Box<dyn ChainQuery> = Box::new(FixedBalance(42));
        let addr = StealthAddress::from_pubkey(Pubkey::from_array([1; 32]));
        assert_eq!(chain.balance(&addr).await.unwrap(), 42);
    }
}
