//! Key types for solveil.
//!
//! - [`Pubkey`]: a compressed Ed25519 public key (32 bytes, Base58 text form)
//! - [`Seed`]: a 32-byte Ed25519 seed, zeroized on drop
//! - [`KeyPair`]: seed plus its canonical public key
//! - [`StealthKeys`]: the recipient's private bundle (spending + viewing)

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{PUBKEY_SIZE, SEED_SIZE};
use crate::error::{Result, SolveilError};

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A compressed Ed25519 public key, which on Solana doubles as the account
/// address. Whether the bytes decode to a valid point is checked where the
/// key is actually used, not here.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey {
    bytes: [u8; PUBKEY_SIZE],
}

impl Pubkey {
    /// Creates a public key from raw bytes.
    ///
    /// # Errors
    /// Returns `InvalidEncoding` if the slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; PUBKEY_SIZE] = bytes.try_into().map_err(|_| {
            SolveilError::InvalidEncoding(format!(
                "public key must be {} bytes, got {}",
                PUBKEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes: arr })
    }

    /// Creates a public key from a fixed-size array.
    pub fn from_array(bytes: [u8; PUBKEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; PUBKEY_SIZE] {
        &self.bytes
    }

    /// Returns the Base58-encoded key (Bitcoin alphabet).
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Parses a Base58-encoded key.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolveilError::InvalidEncoding(format!("bad base58: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pubkey({})", self.to_base58())
    }
}

impl std::fmt::Display for Pubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl Serialize for Pubkey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEED
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte Ed25519 seed. Automatically zeroized when dropped; never
/// exposed in logs or error messages.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; SEED_SIZE],
}

impl Seed {
    /// Creates a seed from raw bytes.
    ///
    /// # Errors
    /// Returns `InvalidEncoding` if the slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SEED_SIZE] = bytes.try_into().map_err(|_| {
            SolveilError::InvalidEncoding(format!(
                "seed must be {} bytes, got {}",
                SEED_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes: arr })
    }

    /// Creates a seed from a fixed-size array.
    pub fn from_array(bytes: [u8; SEED_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    ///
    /// # Security
    /// Handle the returned bytes carefully; do not log or expose them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the seed as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; SEED_SIZE] {
        &self.bytes
    }

    /// Returns the Base58-encoded seed (keystore persistence).
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Parses a Base58-encoded seed.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolveilError::InvalidEncoding(format!("bad base58: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seed([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A seed together with its canonical Ed25519 public key.
///
/// Invariant (enforced at construction sites in `solveil-crypto`): `public`
/// is the clamp-and-multiply image of `SHA-512(seed)[0..32]` on the
/// basepoint.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    /// Public key (safe to share).
    #[zeroize(skip)]
    pub public: Pubkey,
    /// Seed (keep private, auto-zeroized).
    pub seed: Seed,
}

impl KeyPair {
    /// Creates a key pair from a public key and seed.
    pub fn new(public: Pubkey, seed: Seed) -> Self {
        Self { public, seed }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("seed", &"[REDACTED]")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH KEY BUNDLE
// ═══════════════════════════════════════════════════════════════════════════════

/// The recipient's complete private key bundle.
///
/// The spending seed is required to construct stealth signing keys; the
/// viewing seed grants discovery capability only and may be delegated to a
/// scanning service.
#[derive(ZeroizeOnDrop)]
pub struct StealthKeys {
    /// Keys for spending from stealth addresses.
    pub spending: KeyPair,
    /// Keys for scanning announcements.
    pub viewing: KeyPair,
}

impl StealthKeys {
    /// Creates a key bundle from spending and viewing pairs.
    pub fn new(spending: KeyPair, viewing: KeyPair) -> Self {
        Self { spending, viewing }
    }

    /// Returns the public meta-address for this bundle.
    pub fn meta_address(&self) -> super::MetaAddress {
        super::MetaAddress::new(self.viewing.public, self.spending.public)
    }
}

impl std::fmt::Debug for StealthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthKeys")
            .field("spending", &self.spending.public)
            .field("viewing", &self.viewing.public)
            .finish()
    }
}
