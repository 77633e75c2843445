//! Announcement type and its memo wire codec.
//!
//! Senders publish announcements so recipients can discover payments. The
//! on-chain memo form is a small JSON object:
//!
//! ```text
//! {"v":1,"t":"STEALTH","e":"<base58 ephemeral pubkey>","vt":0..255,"s":"<base58 stealth address>"}
//! ```
//!
//! Decoding failures are soft (`InvalidAnnouncement`) so that scanners can
//! walk mixed memo streams and skip everything that is not a stealth
//! announcement.

use serde::{Deserialize, Serialize};

use super::{Pubkey, StealthAddress};
use crate::constants::{ANNOUNCEMENT_KIND, PROTOCOL_VERSION, VIEW_TAG_SPACE};
use crate::error::{Result, SolveilError};

/// An announcement published alongside a stealth payment.
///
/// `id` and `timestamp` are registry metadata: `id` is assigned by the
/// registry on publish and neither field is part of the memo wire form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Unique identifier (assigned by the registry).
    pub id: u64,
    /// The sender's ephemeral Ed25519 public key.
    pub ephemeral_pubkey: Pubkey,
    /// First byte of the tweak; filters scanning by ~256x.
    pub view_tag: u8,
    /// The one-time address the payment was sent to.
    pub stealth_address: StealthAddress,
    /// Unix timestamp when the announcement was created.
    pub timestamp: u64,
}

/// JSON wire form of an announcement memo.
#[derive(Serialize, Deserialize)]
struct MemoWire {
    v: u64,
    t: String,
    e: String,
    vt: u64,
    s: String,
}

impl Announcement {
    /// Creates a new announcement with the current timestamp.
    pub fn new(ephemeral_pubkey: Pubkey, view_tag: u8, stealth_address: StealthAddress) -> Self {
        Self {
            id: 0, // assigned by registry
            ephemeral_pubkey,
            view_tag,
            stealth_address,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Validates the announcement structure.
    pub fn validate(&self) -> Result<()> {
        if self.ephemeral_pubkey.as_bytes().iter().all(|&b| b == 0) {
            return Err(SolveilError::InvalidAnnouncement(
                "ephemeral key is all zeros".into(),
            ));
        }

        // Timestamp not more than 1 hour in the future
        let now = Self::current_timestamp();
        if self.timestamp > now + 3600 {
            return Err(SolveilError::InvalidAnnouncement(
                "timestamp is too far in the future".into(),
            ));
        }

        Ok(())
    }

    /// Encodes the memo wire form. Deterministic: same announcement, same
    /// bytes.
    pub fn to_memo(&self) -> String {
        let wire = MemoWire {
            v: u64::from(PROTOCOL_VERSION),
            t: ANNOUNCEMENT_KIND.to_string(),
            e: self.ephemeral_pubkey.to_base58(),
            vt: u64::from(self.view_tag),
            s: self.stealth_address.to_base58(),
        };
        serde_json::to_string(&wire).expect("memo wire form is always serializable")
    }

    /// Decodes a memo payload.
    ///
    /// Unknown extra fields are ignored, and any `v >= 1` that preserves the
    /// four named fields is accepted. Everything else (non-JSON, missing or
    /// unexpected `t`, malformed Base58, `vt` out of range) fails softly
    /// with `InvalidAnnouncement`.
    pub fn from_memo(memo: &str) -> Result<Self> {
        let wire: MemoWire = serde_json::from_str(memo)
            .map_err(|e| SolveilError::InvalidAnnouncement(format!("not a stealth memo: {e}")))?;

        if wire.t != ANNOUNCEMENT_KIND {
            return Err(SolveilError::InvalidAnnouncement(format!(
                "unexpected memo kind '{}'",
                wire.t
            )));
        }
        if wire.v == 0 {
            return Err(SolveilError::InvalidAnnouncement(
                "version cannot be 0".into(),
            ));
        }
        if wire.vt >= VIEW_TAG_SPACE as u64 {
            return Err(SolveilError::InvalidAnnouncement(format!(
                "view tag {} out of range",
                wire.vt
            )));
        }

        let ephemeral_pubkey = Pubkey::from_base58(&wire.e)
            .map_err(|e| SolveilError::InvalidAnnouncement(format!("bad ephemeral key: {e}")))?;
        let stealth_address = StealthAddress::from_base58(&wire.s)
            .map_err(|e| SolveilError::InvalidAnnouncement(format!("bad stealth address: {e}")))?;

        Ok(Self {
            id: 0,
            ephemeral_pubkey,
            view_tag: wire.vt as u8,
            stealth_address,
            timestamp: Self::current_timestamp(),
        })
    }

    /// Returns the current Unix timestamp in seconds.
    fn current_timestamp() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Statistics about announcements in a registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnouncementStats {
    /// Total number of announcements.
    pub total_count: u64,
    /// Announcements per view tag (distribution analysis).
    pub view_tag_distribution: Vec<u64>,
    /// Earliest announcement timestamp.
    pub earliest_timestamp: Option<u64>,
    /// Latest announcement timestamp.
    pub latest_timestamp: Option<u64>,
}

impl Default for AnnouncementStats {
    fn default() -> Self {
        Self {
            total_count: 0,
            view_tag_distribution: vec![0; VIEW_TAG_SPACE],
            earliest_timestamp: None,
            latest_timestamp: None,
        }
    }
}

impl AnnouncementStats {
    /// Creates empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates stats with a new announcement.
    pub fn add(&mut self, announcement: &Announcement) {
        self.total_count += 1;
        self.view_tag_distribution[announcement.view_tag as usize] += 1;

        match self.earliest_timestamp {
            Some(t) if announcement.timestamp >= t => {}
            _ => self.earliest_timestamp = Some(announcement.timestamp),
        }
        match self.latest_timestamp {
            Some(t) if announcement.timestamp <= t => {}
            _ => self.latest_timestamp = Some(announcement.timestamp),
        }
    }
}
