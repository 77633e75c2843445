//! Protocol constants for solveil.
//!
//! All cryptographic sizes follow Ed25519 / X25519 (RFC 8032 / RFC 7748).

// ═══════════════════════════════════════════════════════════════════════════════
// CURVE25519 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an Ed25519 seed (private key material) in bytes.
pub const SEED_SIZE: usize = 32;

/// Size of a compressed Ed25519 public key / account address in bytes.
pub const PUBKEY_SIZE: usize = 32;

/// Size of the X25519 ECDH shared secret in bytes.
pub const SHARED_SECRET_SIZE: usize = 32;

/// Size of the SHA-256 tweak derived from the shared secret.
pub const TWEAK_SIZE: usize = 32;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW TAG CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a view tag in bytes.
/// One byte gives a 1/256 false-positive rate, cutting recipient scan cost
/// by roughly 256x.
pub const VIEW_TAG_SIZE: usize = 1;

/// Number of possible view tag values (2^8).
pub const VIEW_TAG_SPACE: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// META-ADDRESS ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Textual prefix of an encoded meta-address.
pub const META_ADDRESS_PREFIX: &str = "st:sol:";

/// Size of the Base58 payload of a meta-address: viewing pubkey followed by
/// spending pubkey.
pub const META_ADDRESS_PAYLOAD_SIZE: usize = PUBKEY_SIZE + PUBKEY_SIZE;

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCEMENT WIRE FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Current announcement wire-format version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Discriminant tag of a stealth announcement memo.
pub const ANNOUNCEMENT_KIND: &str = "STEALTH";

/// Upper bound on an encoded announcement memo: two Base58 32-byte keys
/// plus JSON framing.
pub const MEMO_MAX_SIZE: usize = 160;

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default batch size when iterating a registry.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 1000;

/// Maximum announcements fetched in a single registry request.
pub const MAX_SCAN_BATCH_SIZE: usize = 10_000;
