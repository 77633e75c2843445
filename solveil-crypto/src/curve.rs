//! The Ed25519/X25519 curve bridge.
//!
//! Every conversion between the two curve forms, and every endianness
//! decision, lives in this module:
//!
//! - Edwards point decoding with identity/small-order rejection
//! - Edwards y to Montgomery u mapping (`u = (1 + y) / (1 - y)`)
//! - Ed25519 seed to clamped X25519 secret (RFC 7748 §5)
//! - Scalar construction mod L for both endian conventions: the SHA-256
//!   tweak is interpreted **big-endian**, the SHA-512 spending scalar
//!   **little-endian** as Ed25519 requires
//!
//! Scalar arithmetic and X25519 scalar-mult are constant-time in the dalek
//! crates; field inversion is only reached through `to_montgomery` on
//! public values.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha512};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

use solveil_core::error::{Result, SolveilError};
use solveil_core::types::Pubkey;
use solveil_core::PUBKEY_SIZE;

// ═══════════════════════════════════════════════════════════════════════════════
// POINT DECODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Decodes 32 bytes as a usable public Ed25519 point.
///
/// # Errors
/// `InvalidPoint` if the bytes do not decompress, are a non-canonical
/// encoding, or decompress to the identity or another small-order point.
/// Any canonical point of the prime-order subgroup passes.
pub fn decompress_public_point(bytes: &[u8; PUBKEY_SIZE]) -> Result<EdwardsPoint> {
    let point = CompressedEdwardsY(*bytes)
        .decompress()
        .ok_or_else(|| SolveilError::InvalidPoint("not a valid Ed25519 encoding".into()))?;

    if point.compress().as_bytes() != bytes {
        return Err(SolveilError::InvalidPoint("non-canonical encoding".into()));
    }

    // is_small_order also covers the identity (order 1)
    if point.is_small_order() {
        return Err(SolveilError::InvalidPoint(
            "identity or small-order point".into(),
        ));
    }

    Ok(point)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EDWARDS -> MONTGOMERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Converts a compressed Ed25519 public key to its X25519 (Montgomery u)
/// form: `u = (1 + y) * (1 - y)^-1 (mod p)`, emitted as 32 little-endian
/// bytes with the top bit cleared.
///
/// # Errors
/// `InvalidPoint` under the same conditions as [`decompress_public_point`].
pub fn edwards_to_montgomery(bytes: &[u8; PUBKEY_SIZE]) -> Result<[u8; 32]> {
    let point = decompress_public_point(bytes)?;
    let mut u = point.to_montgomery().to_bytes();
    u[31] &= 0x7f;
    Ok(u)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEED -> X25519 SECRET
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives the clamped X25519 secret from an Ed25519 seed:
/// `SHA-512(seed)[0..32]` with RFC 7748 clamping.
///
/// This is the same expansion that produced the seed's Ed25519 public key,
/// which is what makes sender- and receiver-computed ECDH outputs agree.
pub fn x25519_secret_from_seed(seed: &[u8; 32]) -> Zeroizing<[u8; 32]> {
    let mut hash: [u8; 64] = Sha512::digest(seed).into();
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&hash[..32]);
    key[0] &= 248;
    key[31] &= 127;
    key[31] |= 64;
    hash.zeroize();
    key
}

/// Performs X25519 scalar multiplication between a clamped secret and a
/// Montgomery u-coordinate, returning the 32-byte shared secret.
pub fn x25519_shared_secret(secret: &[u8; 32], public_u: &[u8; 32]) -> Zeroizing<[u8; 32]> {
    let secret = StaticSecret::from(*secret);
    let public = X25519Public::from(*public_u);
    Zeroizing::new(secret.diffie_hellman(&public).to_bytes())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCALARS MOD L
// ═══════════════════════════════════════════════════════════════════════════════

/// Interprets 32 bytes as a **big-endian** integer and reduces it mod L.
/// This is the tweak-scalar convention.
pub fn scalar_from_be_bytes(bytes: &[u8; 32]) -> Scalar {
    let mut le = *bytes;
    le.reverse();
    let scalar = Scalar::from_bytes_mod_order(le);
    le.zeroize();
    scalar
}

/// Derives the Ed25519 spending scalar from a seed: clamped
/// `SHA-512(seed)[0..32]`, interpreted **little-endian**, reduced mod L.
///
/// Matches the expansion `ed25519-dalek` applies when computing the seed's
/// verifying key, so `clamped_scalar_from_seed(seed) * B` equals the
/// canonical public key of `seed`.
pub fn clamped_scalar_from_seed(seed: &[u8; 32]) -> Scalar {
    let mut hash: [u8; 64] = Sha512::digest(seed).into();
    let mut lower = [0u8; 32];
    lower.copy_from_slice(&hash[..32]);
    lower[0] &= 248;
    lower[31] &= 127;
    lower[31] |= 64;
    let scalar = Scalar::from_bytes_mod_order(lower);
    hash.zeroize();
    lower.zeroize();
    scalar
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEED -> ED25519 PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes the canonical Ed25519 public key of a seed.
pub fn pubkey_from_seed(seed: &[u8; 32]) -> Pubkey {
    let signing = SigningKey::from_bytes(seed);
    Pubkey::from_array(signing.verifying_key().to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;

    #[test]
    fn test_basepoint_maps_to_x25519_basepoint() {
        // The Ed25519 basepoint corresponds to u = 9, the X25519 basepoint.
        let compressed = ED25519_BASEPOINT_POINT.compress().to_bytes();
        let u = edwards_to_montgomery(&compressed).unwrap();
        let mut expected = [0u8; 32];
        expected[0] = 9;
        assert_eq!(u, expected);
    }

    #[test]
    fn test_montgomery_top_bit_cleared() {
        let seed = [0x5Au8; 32];
        let pk = pubkey_from_seed(&seed);
        let u = edwards_to_montgomery(pk.as_array()).unwrap();
        assert_eq!(u[31] & 0x80, 0);
    }

    #[test]
    fn test_decompress_rejects_identity() {
        // Compressed identity: y = 1
        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert!(matches!(
            decompress_public_point(&identity),
            Err(SolveilError::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_decompress_rejects_small_order() {
        // y = 0 decompresses to a 4-torsion point
        let zero = [0u8; 32];
        assert!(matches!(
            decompress_public_point(&zero),
            Err(SolveilError::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_decompress_rejects_non_canonical_encoding() {
        // y = p + 1: a non-canonical encoding of y = 1
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0xee;
        bytes[31] = 0x7f;
        assert!(matches!(
            decompress_public_point(&bytes),
            Err(SolveilError::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_decompress_rejects_some_non_point() {
        // Roughly half of all y values are off-curve; at least one of these
        // candidates must fail to decompress outright.
        let mut rejected_any = false;
        for b in 2u8..=64 {
            let mut bytes = [0u8; 32];
            bytes[0] = b;
            if CompressedEdwardsY(bytes).decompress().is_none() {
                rejected_any = true;
                break;
            }
        }
        assert!(rejected_any);
    }

    #[test]
    fn test_decompress_accepts_real_pubkey() {
        let pk = pubkey_from_seed(&[9u8; 32]);
        assert!(decompress_public_point(pk.as_array()).is_ok());
    }

    #[test]
    fn test_scalar_from_be_bytes_one() {
        let mut be = [0u8; 32];
        be[31] = 1;
        assert_eq!(scalar_from_be_bytes(&be), Scalar::ONE);
    }

    #[test]
    fn test_scalar_endianness_differs() {
        // The same non-palindromic bytes must produce different scalars
        // under the two conventions.
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        bytes[31] = 1;
        let be = scalar_from_be_bytes(&bytes);
        let le = Scalar::from_bytes_mod_order(bytes);
        assert_ne!(be, le);
    }

    #[test]
    fn test_clamped_scalar_matches_dalek_pubkey() {
        // clamped_scalar_from_seed(seed) * B must equal the canonical
        // ed25519-dalek public key of the same seed.
        for fill in [0u8, 1, 0x42, 0xFF] {
            let seed = [fill; 32];
            let scalar = clamped_scalar_from_seed(&seed);
            let derived = EdwardsPoint::mul_base(&scalar).compress().to_bytes();
            assert_eq!(&derived, pubkey_from_seed(&seed).as_array());
        }
    }

    #[test]
    fn test_x25519_rfc7748_vector() {
        // RFC 7748 §5.2, first test vector.
        let scalar: [u8; 32] =
            hex::decode("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4")
                .unwrap()
                .try_into()
                .unwrap();
        let u: [u8; 32] =
            hex::decode("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c")
                .unwrap()
                .try_into()
                .unwrap();
        let expected: [u8; 32] =
            hex::decode("c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(*x25519_shared_secret(&scalar, &u), expected);
    }

    #[test]
    fn test_ecdh_agreement_via_bridge() {
        // ECDH over converted Ed25519 keys agrees in both directions.
        let seed_a = [0x11u8; 32];
        let seed_b = [0x22u8; 32];
        let pub_a = pubkey_from_seed(&seed_a);
        let pub_b = pubkey_from_seed(&seed_b);

        let shared_ab = x25519_shared_secret(
            &x25519_secret_from_seed(&seed_a),
            &edwards_to_montgomery(pub_b.as_array()).unwrap(),
        );
        let shared_ba = x25519_shared_secret(
            &x25519_secret_from_seed(&seed_b),
            &edwards_to_montgomery(pub_a.as_array()).unwrap(),
        );
        assert_eq!(*shared_ab, *shared_ba);
    }
}
