//! Sender-side stealth payment construction.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use solveil_core::error::Result;
use solveil_core::types::{Announcement, MetaAddress, Pubkey, StealthAddress};
use solveil_crypto::compute_stealth_address;

/// A prepared stealth payment.
///
/// Construction eagerly derives the one-time address and announcement
/// values; the ephemeral private key is consumed during derivation and
/// never retained, so a `Payment` can be held and logged freely.
#[derive(Clone, Debug)]
pub struct Payment {
    stealth_address: StealthAddress,
    ephemeral_pubkey: Pubkey,
    view_tag: u8,
}

impl Payment {
    /// Prepares a payment to the given meta-address using the operating
    /// system RNG.
    pub fn for_recipient(meta: &MetaAddress) -> Result<Self> {
        Self::for_recipient_with(meta, &mut OsRng)
    }

    /// Prepares a payment using the given RNG.
    pub fn for_recipient_with<R: RngCore + CryptoRng>(
        meta: &MetaAddress,
        rng: &mut R,
    ) -> Result<Self> {
        let derived = compute_stealth_address(meta, rng)?;
        Ok(Self {
            stealth_address: derived.stealth_address,
            ephemeral_pubkey: derived.ephemeral_pubkey,
            view_tag: derived.view_tag,
        })
    }

    /// Prepares a payment to a meta-address in `st:sol:` text form.
    pub fn for_recipient_str(meta: &str) -> Result<Self> {
        Self::for_recipient(&meta.parse::<MetaAddress>()?)
    }

    /// Prepares a payment to a meta-address string using the given RNG.
    pub fn for_recipient_str_with<R: RngCore + CryptoRng>(
        meta: &str,
        rng: &mut R,
    ) -> Result<Self> {
        Self::for_recipient_with(&meta.parse::<MetaAddress>()?, rng)
    }

    /// The one-time address to transfer funds to.
    pub fn stealth_address(&self) -> StealthAddress {
        self.stealth_address
    }

    /// The ephemeral public key to announce.
    pub fn ephemeral_pubkey(&self) -> Pubkey {
        self.ephemeral_pubkey
    }

    /// The view tag to announce.
    pub fn view_tag(&self) -> u8 {
        self.view_tag
    }

    /// Builds the announcement for this payment.
    pub fn announcement(&self) -> Announcement {
        Announcement::new(self.ephemeral_pubkey, self.view_tag, self.stealth_address)
    }

    /// Encodes the announcement memo JSON to attach to the funding
    /// transaction.
    pub fn memo_json(&self) -> String {
        self.announcement().to_memo()
    }
}
