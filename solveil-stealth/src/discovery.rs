//! Per-announcement payment discovery (recipient scan step).

use subtle::ConstantTimeEq;

use solveil_core::error::{Result, SolveilError};
use solveil_core::types::{Announcement, Pubkey, StealthAddress, StealthKeys};
use solveil_crypto::{
    check_view_tag, compute_expected_address, derive_stealth_keypair, StealthSigningKey,
};

/// Result of scanning a single announcement.
#[derive(Debug)]
pub enum ScanResult {
    /// Not for this recipient: view tag mismatch, or a colliding tag whose
    /// recomputed address failed the equality check. Silent negative.
    NotForUs,
    /// Tag matched, address verified, signing key recovered.
    Discovered(DiscoveredPayment),
    /// The announcement was malformed (bad ephemeral point, invalid
    /// structure). Skippable, but recorded separately from negatives.
    Failed(SolveilError),
}

impl ScanResult {
    /// Returns true if a payment was discovered.
    pub fn is_discovered(&self) -> bool {
        matches!(self, ScanResult::Discovered(_))
    }

    /// Returns the discovered payment if present.
    pub fn into_payment(self) -> Option<DiscoveredPayment> {
        match self {
            ScanResult::Discovered(payment) => Some(payment),
            _ => None,
        }
    }
}

/// A payment discovered during scanning, including the capability to spend
/// it.
#[derive(Debug)]
pub struct DiscoveredPayment {
    /// Registry ID of the announcement that led here.
    pub announcement_id: u64,
    /// The one-time address holding the funds.
    pub stealth_address: StealthAddress,
    /// The sender's ephemeral public key.
    pub ephemeral_pubkey: Pubkey,
    /// The scalar-form signing key for the address.
    pub signing_key: StealthSigningKey,
    /// Announcement timestamp.
    pub timestamp: u64,
    /// Lamport balance, when a chain query was performed.
    pub lamports: Option<u64>,
}

/// Scans one announcement against a key bundle.
///
/// Flow: view-tag filter, then the mandatory address-equality check against
/// the announcement's claimed address, then signing-key recovery. Tag
/// mismatches and equality failures are silent negatives; only malformed
/// announcements produce `Failed`.
pub fn scan_announcement(keys: &StealthKeys, announcement: &Announcement) -> ScanResult {
    if let Err(e) = announcement.validate() {
        return ScanResult::Failed(e);
    }

    match check_view_tag(
        &keys.viewing.seed,
        &announcement.ephemeral_pubkey,
        announcement.view_tag,
    ) {
        Ok(true) => {}
        Ok(false) => return ScanResult::NotForUs,
        Err(e) => return ScanResult::Failed(e),
    }

    // The tag is necessary but not sufficient: confirm the claimed address.
    let expected = match compute_expected_address(
        &keys.viewing.seed,
        &keys.spending.public,
        &announcement.ephemeral_pubkey,
    ) {
        Ok(address) => address,
        Err(e) => return ScanResult::Failed(e),
    };
    let claimed = announcement.stealth_address;
    if !bool::from(expected.as_bytes().ct_eq(claimed.as_bytes())) {
        // Colliding view tag from an unrelated announcement
        return ScanResult::NotForUs;
    }

    match derive_stealth_keypair(
        &keys.viewing.seed,
        &keys.spending.seed,
        &announcement.ephemeral_pubkey,
    ) {
        Ok(signing_key) => ScanResult::Discovered(DiscoveredPayment {
            announcement_id: announcement.id,
            stealth_address: claimed,
            ephemeral_pubkey: announcement.ephemeral_pubkey,
            signing_key,
            timestamp: announcement.timestamp,
            lamports: None,
        }),
        Err(e) => ScanResult::Failed(e),
    }
}

/// Scans a slice of announcements, returning the discovered payments.
pub fn scan_announcements(keys: &StealthKeys, announcements: &[Announcement]) -> Vec<DiscoveredPayment> {
    announcements
        .iter()
        .filter_map(|ann| scan_announcement(keys, ann).into_payment())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN STATISTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Statistics for scanning operations.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Total announcements scanned.
    pub total_scanned: u64,
    /// Payments discovered.
    pub discoveries: u64,
    /// Malformed announcements skipped.
    pub errors: u64,
    /// Duration of the scan in milliseconds.
    pub duration_ms: u64,
}

impl ScanStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scan result.
    pub fn record(&mut self, result: &ScanResult) {
        self.total_scanned += 1;
        match result {
            ScanResult::Discovered(_) => self.discoveries += 1,
            ScanResult::Failed(_) => self.errors += 1,
            ScanResult::NotForUs => {}
        }
    }

    /// Returns the scan rate (announcements per second).
    pub fn rate(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.total_scanned as f64 / self.duration_ms as f64) * 1000.0
        }
    }

    /// Returns the fraction of announcements filtered out, as a percentage.
    pub fn filter_efficiency(&self) -> f64 {
        if self.total_scanned == 0 {
            0.0
        } else {
            ((self.total_scanned - self.discoveries) as f64 / self.total_scanned as f64) * 100.0
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WITHDRAWAL PLANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Checks that a withdrawal fits the available funds after the fee reserve,
/// returning the amount to transfer.
///
/// # Errors
/// `InsufficientBalance` when `requested + fee_reserve` exceeds
/// `available`.
pub fn plan_withdrawal(available: u64, requested: u64, fee_reserve: u64) -> Result<u64> {
    let spendable = available.saturating_sub(fee_reserve);
    if requested > spendable {
        return Err(SolveilError::InsufficientBalance {
            requested,
            available: spendable,
        });
    }
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::payment::Payment;

    fn account_and_payment() -> (Account, Payment) {
        let account = Account::generate().unwrap();
        let payment = Payment::for_recipient(&account.meta_address()).unwrap();
        (account, payment)
    }

    #[test]
    fn test_scan_discovers_own_payment() {
        let (account, payment) = account_and_payment();
        let result = scan_announcement(account.keys(), &payment.announcement());

        assert!(result.is_discovered());
        let discovered = result.into_payment().unwrap();
        assert_eq!(discovered.stealth_address, payment.stealth_address());
        assert_eq!(
            discovered.signing_key.public(),
            payment.stealth_address().pubkey()
        );
        assert!(discovered.lamports.is_none());
    }

    #[test]
    fn test_scan_skips_foreign_payment() {
        let (account, _) = account_and_payment();
        let other = Account::generate().unwrap();
        let foreign = Payment::for_recipient(&other.meta_address()).unwrap();

        let result = scan_announcement(account.keys(), &foreign.announcement());
        // Either the tag filters it (255/256) or the address check does.
        assert!(!result.is_discovered());
    }

    #[test]
    fn test_scan_wrong_view_tag_is_silent_negative() {
        let (account, payment) = account_and_payment();
        let mut ann = payment.announcement();
        ann.view_tag = ann.view_tag.wrapping_add(1);

        let result = scan_announcement(account.keys(), &ann);
        assert!(matches!(result, ScanResult::NotForUs));
    }

    #[test]
    fn test_scan_tag_collision_fails_address_check() {
        // A foreign announcement doctored to carry our expected tag must
        // still be rejected, silently, by the address-equality check.
        let (account, _) = account_and_payment();
        let other = Account::generate().unwrap();
        let foreign = Payment::for_recipient(&other.meta_address()).unwrap();

        let our_tag = solveil_crypto::view_tag::view_tag_from_shared(
            &solveil_crypto::derive::receiver_shared_secret(
                &account.keys().viewing.seed,
                &foreign.ephemeral_pubkey(),
            )
            .unwrap(),
        );

        let mut ann = foreign.announcement();
        ann.view_tag = our_tag;

        let result = scan_announcement(account.keys(), &ann);
        assert!(matches!(result, ScanResult::NotForUs));
    }

    #[test]
    fn test_scan_malformed_ephemeral_is_failed() {
        let (account, payment) = account_and_payment();
        let mut ann = payment.announcement();
        ann.ephemeral_pubkey = Pubkey::from_array([0u8; 32]);

        let result = scan_announcement(account.keys(), &ann);
        assert!(matches!(result, ScanResult::Failed(_)));
    }

    #[test]
    fn test_scan_announcements_batch() {
        let (account, payment) = account_and_payment();
        let other = Account::generate().unwrap();

        let announcements = vec![
            payment.announcement(),
            Payment::for_recipient(&other.meta_address())
                .unwrap()
                .announcement(),
            Payment::for_recipient(&account.meta_address())
                .unwrap()
                .announcement(),
        ];

        let discovered = scan_announcements(account.keys(), &announcements);
        assert_eq!(discovered.len(), 2);
    }

    #[test]
    fn test_scan_stats_record() {
        let mut stats = ScanStats::new();
        let (account, payment) = account_and_payment();

        stats.record(&scan_announcement(account.keys(), &payment.announcement()));
        stats.record(&ScanResult::NotForUs);
        stats.record(&ScanResult::Failed(SolveilError::InvalidPoint("x".into())));

        assert_eq!(stats.total_scanned, 3);
        assert_eq!(stats.discoveries, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_plan_withdrawal() {
        assert_eq!(plan_withdrawal(10_000, 4_000, 5_000).unwrap(), 4_000);
        assert_eq!(plan_withdrawal(10_000, 5_000, 5_000).unwrap(), 5_000);

        let err = plan_withdrawal(10_000, 6_000, 5_000).unwrap_err();
        assert!(matches!(
            err,
            SolveilError::InsufficientBalance {
                requested: 6_000,
                available: 5_000
            }
        ));

        // Fee reserve larger than the balance leaves nothing spendable
        assert!(plan_withdrawal(1_000, 1, 5_000).is_err());
    }
}
