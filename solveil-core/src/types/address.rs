//! Address types for solveil.
//!
//! - [`MetaAddress`]: the long-lived public address a recipient publishes
//! - [`StealthAddress`]: a one-time account address derived per payment

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Pubkey;
use crate::constants::{META_ADDRESS_PAYLOAD_SIZE, META_ADDRESS_PREFIX, PUBKEY_SIZE};
use crate::error::{Result, SolveilError};

// ═══════════════════════════════════════════════════════════════════════════════
// META-ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A solveil meta-address: the pair of public keys a recipient publishes
/// once so that anyone can derive fresh one-time addresses for them.
///
/// Text form is `st:sol:` followed by Base58 (Bitcoin alphabet) of the
/// 64-byte concatenation `viewing_pubkey || spending_pubkey`. Encoding is
/// deterministic; decoding checks structure only. Point validity is the
/// caller's responsibility when the keys are used.
///
/// # Example
/// ```
/// use solveil_core::{MetaAddress, Pubkey};
///
/// let meta = MetaAddress::new(Pubkey::from_array([1; 32]), Pubkey::from_array([2; 32]));
/// let s = meta.to_string();
/// let parsed: MetaAddress = s.parse().unwrap();
/// assert_eq!(parsed, meta);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetaAddress {
    /// Public key used for ECDH during scanning.
    pub viewing_pubkey: Pubkey,
    /// Public key the stealth tweak is added to.
    pub spending_pubkey: Pubkey,
}

impl MetaAddress {
    /// Creates a meta-address from viewing and spending public keys.
    pub fn new(viewing_pubkey: Pubkey, spending_pubkey: Pubkey) -> Self {
        Self {
            viewing_pubkey,
            spending_pubkey,
        }
    }

    /// Serializes to the 64-byte binary form `viewing || spending`.
    pub fn to_bytes(&self) -> [u8; META_ADDRESS_PAYLOAD_SIZE] {
        let mut bytes = [0u8; META_ADDRESS_PAYLOAD_SIZE];
        bytes[..PUBKEY_SIZE].copy_from_slice(self.viewing_pubkey.as_bytes());
        bytes[PUBKEY_SIZE..].copy_from_slice(self.spending_pubkey.as_bytes());
        bytes
    }

    /// Deserializes from the 64-byte binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != META_ADDRESS_PAYLOAD_SIZE {
            return Err(SolveilError::InvalidEncoding(format!(
                "meta-address payload must be {} bytes, got {}",
                META_ADDRESS_PAYLOAD_SIZE,
                bytes.len()
            )));
        }
        Ok(Self {
            viewing_pubkey: Pubkey::from_bytes(&bytes[..PUBKEY_SIZE])?,
            spending_pubkey: Pubkey::from_bytes(&bytes[PUBKEY_SIZE..])?,
        })
    }
}

impl std::fmt::Display for MetaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            META_ADDRESS_PREFIX,
            bs58::encode(self.to_bytes()).into_string()
        )
    }
}

impl FromStr for MetaAddress {
    type Err = SolveilError;

    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix(META_ADDRESS_PREFIX).ok_or_else(|| {
            SolveilError::InvalidEncoding(format!(
                "meta-address must start with '{META_ADDRESS_PREFIX}'"
            ))
        })?;
        if body.is_empty() {
            return Err(SolveilError::InvalidEncoding(
                "meta-address payload is empty".into(),
            ));
        }
        let bytes = bs58::decode(body)
            .into_vec()
            .map_err(|e| SolveilError::InvalidEncoding(format!("bad base58: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for MetaAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MetaAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A one-time account address: the canonical compressed Ed25519 point
/// `spending_pubkey + tweak * B`. Funds land here and only the recipient
/// can reconstruct the matching signing scalar.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StealthAddress(Pubkey);

impl StealthAddress {
    /// Creates a stealth address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(Pubkey::from_bytes(bytes)?))
    }

    /// Creates a stealth address from a fixed-size array.
    pub fn from_array(bytes: [u8; PUBKEY_SIZE]) -> Self {
        Self(Pubkey::from_array(bytes))
    }

    /// Creates a stealth address from a public key.
    pub fn from_pubkey(pubkey: Pubkey) -> Self {
        Self(pubkey)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns the address as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; PUBKEY_SIZE] {
        self.0.as_array()
    }

    /// Returns the underlying public key.
    pub fn pubkey(&self) -> Pubkey {
        self.0
    }

    /// Returns the Base58-encoded address.
    pub fn to_base58(&self) -> String {
        self.0.to_base58()
    }

    /// Parses a Base58-encoded address.
    pub fn from_base58(s: &str) -> Result<Self> {
        Ok(Self(Pubkey::from_base58(s)?))
    }
}

impl std::fmt::Debug for StealthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StealthAddress({})", self.to_base58())
    }
}

impl std::fmt::Display for StealthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_meta() -> MetaAddress {
        MetaAddress::new(
            Pubkey::from_array([0xAA; PUBKEY_SIZE]),
            Pubkey::from_array([0xBB; PUBKEY_SIZE]),
        )
    }

    #[test]
    fn test_meta_address_string_roundtrip() {
        let meta = make_meta();
        let s = meta.to_string();
        assert!(s.starts_with(META_ADDRESS_PREFIX));
        let parsed: MetaAddress = s.parse().unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_meta_address_encoding_deterministic() {
        let meta = make_meta();
        assert_eq!(meta.to_string(), meta.to_string());
    }

    #[test]
    fn test_meta_address_bytes_roundtrip() {
        let meta = make_meta();
        let bytes = meta.to_bytes();
        assert_eq!(bytes.len(), 64);
        let meta2 = MetaAddress::from_bytes(&bytes).unwrap();
        assert_eq!(meta, meta2);
    }

    #[test]
    fn test_meta_address_rejects_malformed() {
        for bad in ["invalid", "st:sol:", "st:eth:ABC", "st:sol:0OIl", ""] {
            let result: Result<MetaAddress> = bad.parse();
            assert!(
                matches!(result, Err(SolveilError::InvalidEncoding(_))),
                "expected InvalidEncoding for {bad:?}"
            );
        }
    }

    #[test]
    fn test_meta_address_rejects_wrong_payload_length() {
        // 32 bytes of payload instead of 64
        let short = format!(
            "{}{}",
            META_ADDRESS_PREFIX,
            bs58::encode([1u8; 32]).into_string()
        );
        let result: Result<MetaAddress> = short.parse();
        assert!(matches!(result, Err(SolveilError::InvalidEncoding(_))));
    }

    #[test]
    fn test_meta_address_case_sensitive() {
        let meta = make_meta();
        let upper = meta.to_string().to_uppercase();
        // Uppercasing either breaks the prefix or the Base58 payload.
        let result: Result<MetaAddress> = upper.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_meta_address_serde() {
        let meta = make_meta();
        let json = serde_json::to_string(&meta).unwrap();
        let meta2: MetaAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, meta2);
    }

    #[test]
    fn test_stealth_address_base58_roundtrip() {
        let addr = StealthAddress::from_array([0x42; PUBKEY_SIZE]);
        let s = addr.to_base58();
        let addr2 = StealthAddress::from_base58(&s).unwrap();
        assert_eq!(addr, addr2);
    }
}
