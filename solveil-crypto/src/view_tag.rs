//! View-tag computation and checking.
//!
//! The view tag is the first byte of `SHA-256(shared_secret)`. Recipients
//! compare it against the announced tag before doing any point arithmetic,
//! which skips ~255/256 of foreign announcements.
//!
//! A positive match is *necessary but not sufficient*: callers must follow
//! it with a full address recomputation
//! ([`compute_expected_address`](crate::derive::compute_expected_address))
//! and an equality check against the announcement's claimed address.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use solveil_core::error::Result;
use solveil_core::types::{Pubkey, Seed};
use solveil_core::VIEW_TAG_SPACE;

use crate::derive::receiver_shared_secret;

/// Computes the view tag of a shared secret: `SHA-256(ss)[0]`.
pub fn view_tag_from_shared(shared_secret: &[u8; 32]) -> u8 {
    let mut tweak: [u8; 32] = Sha256::digest(shared_secret).into();
    let tag = tweak[0];
    tweak.zeroize();
    tag
}

/// Checks whether an announced view tag matches this viewing key and
/// ephemeral key. Expected false-positive rate: 1/256.
///
/// # Errors
/// `InvalidPoint` if the ephemeral key does not decode to a usable point.
pub fn check_view_tag(
    viewing_seed: &Seed,
    ephemeral_pubkey: &Pubkey,
    view_tag: u8,
) -> Result<bool> {
    let shared = receiver_shared_secret(viewing_seed, ephemeral_pubkey)?;
    let computed = view_tag_from_shared(&shared);
    Ok(bool::from(computed.ct_eq(&view_tag)))
}

/// Running distribution of observed view tags.
///
/// Useful for uniformity analysis of a registry and for the scan-filter
/// false-positive-rate tests.
#[derive(Debug, Clone)]
pub struct ViewTagStats {
    /// Count of each view tag value.
    pub distribution: Vec<u64>,
    /// Total number of tags recorded.
    pub total: u64,
}

impl Default for ViewTagStats {
    fn default() -> Self {
        Self {
            distribution: vec![0; VIEW_TAG_SPACE],
            total: 0,
        }
    }
}

impl ViewTagStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a view tag.
    pub fn add(&mut self, tag: u8) {
        self.distribution[tag as usize] += 1;
        self.total += 1;
    }

    /// Returns the expected count per tag under a uniform distribution.
    pub fn expected_uniform_count(&self) -> f64 {
        self.total as f64 / VIEW_TAG_SPACE as f64
    }

    /// Computes the chi-squared statistic for a uniformity test.
    pub fn chi_squared(&self) -> f64 {
        let expected = self.expected_uniform_count();
        if expected == 0.0 {
            return 0.0;
        }
        self.distribution
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                (diff * diff) / expected
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{compute_stealth_address, generate_stealth_keys};
    use rand::rngs::OsRng;
    use rand::Rng;

    #[test]
    fn test_view_tag_deterministic() {
        let secret = [42u8; 32];
        assert_eq!(view_tag_from_shared(&secret), view_tag_from_shared(&secret));
    }

    #[test]
    fn test_check_view_tag_soundness() {
        // Tags from real payments always check out, including the boundary
        // values 0 and 255 when they occur.
        let keys = generate_stealth_keys(&mut OsRng).unwrap();
        let meta = keys.meta_address();

        for _ in 0..16 {
            let payment = compute_stealth_address(&meta, &mut OsRng).unwrap();
            assert!(check_view_tag(
                &keys.viewing.seed,
                &payment.ephemeral_pubkey,
                payment.view_tag
            )
            .unwrap());
        }
    }

    #[test]
    fn test_check_view_tag_rejects_shifted_tag() {
        let keys = generate_stealth_keys(&mut OsRng).unwrap();
        let payment = compute_stealth_address(&keys.meta_address(), &mut OsRng).unwrap();

        let wrong = payment.view_tag.wrapping_add(1);
        assert!(!check_view_tag(&keys.viewing.seed, &payment.ephemeral_pubkey, wrong).unwrap());
    }

    #[test]
    fn test_check_view_tag_boundary_values() {
        // 0 and 255 are ordinary tag values; checking them against a fixed
        // ephemeral key gives exactly one positive when the computed tag
        // happens to be that boundary value, never an error.
        let keys = generate_stealth_keys(&mut OsRng).unwrap();
        let payment = compute_stealth_address(&keys.meta_address(), &mut OsRng).unwrap();

        for tag in [0u8, 255u8] {
            let matched =
                check_view_tag(&keys.viewing.seed, &payment.ephemeral_pubkey, tag).unwrap();
            assert_eq!(matched, payment.view_tag == tag);
        }
    }

    #[test]
    fn test_check_view_tag_invalid_ephemeral() {
        let keys = generate_stealth_keys(&mut OsRng).unwrap();
        let bad = solveil_core::Pubkey::from_array([0u8; 32]);
        assert!(check_view_tag(&keys.viewing.seed, &bad, 0).is_err());
    }

    #[test]
    fn test_view_tag_distribution_uniform() {
        // Chi-squared uniformity over random shared secrets. With 255
        // degrees of freedom the p=0.001 critical value is ~310; a healthy
        // hash stays well below 500.
        let mut rng = rand::thread_rng();
        let mut stats = ViewTagStats::new();
        for _ in 0..10_000 {
            let secret: [u8; 32] = rng.gen();
            stats.add(view_tag_from_shared(&secret));
        }
        let chi_sq = stats.chi_squared();
        assert!(chi_sq < 500.0, "view tags not uniform: chi-squared = {chi_sq}");
    }

    #[test]
    fn test_false_positive_rate() {
        // Announcements for someone else match our tag at ~1/256. Over
        // 10,000 trials, 3 sigma around the mean 39 is roughly [20, 59].
        let ours = generate_stealth_keys(&mut OsRng).unwrap();
        let theirs = generate_stealth_keys(&mut OsRng).unwrap();
        let their_meta = theirs.meta_address();

        let mut false_positives = 0u32;
        for _ in 0..10_000 {
            let payment = compute_stealth_address(&their_meta, &mut OsRng).unwrap();
            if check_view_tag(&ours.viewing.seed, &payment.ephemeral_pubkey, payment.view_tag)
                .unwrap()
            {
                false_positives += 1;
            }
        }

        assert!(
            (20..=59).contains(&false_positives),
            "false-positive count {false_positives} outside 1/256 +- 3 sigma"
        );
    }
}
