//! Ed25519 signing with scalar-form secret keys.
//!
//! The stealth scalar `s_stealth = (s_spend + t) mod L` is produced by
//! addition, so no 32-byte seed expands to it and seed-in signing APIs do
//! not apply. This module signs directly from the scalar:
//!
//! ```text
//! prefix = SHA-512(le_bytes(s))[32..64]
//! r = SHA-512(prefix || M) mod L
//! R = r * B
//! k = SHA-512(R || A || M) mod L
//! S = (r + k * s) mod L
//! signature = R || S
//! ```
//!
//! The nonce is deterministic per (key, message) and never reused across
//! messages. Output verifies under the ordinary Ed25519 rules and is
//! indistinguishable from a standard signature to any verifier.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, Zeroizing};

use solveil_core::error::{Result, SolveilError};
use solveil_core::types::Pubkey;
use solveil_core::SIGNATURE_SIZE;

/// A scalar-form Ed25519 signing key together with its public key
/// `A = s * B`. The scalar is zeroized on drop.
pub struct StealthSigningKey {
    scalar: Scalar,
    public: Pubkey,
}

impl StealthSigningKey {
    /// Wraps a scalar, computing its public key.
    pub fn from_scalar(scalar: Scalar) -> Self {
        let public = Pubkey::from_array(EdwardsPoint::mul_base(&scalar).compress().to_bytes());
        Self { scalar, public }
    }

    /// Reconstructs a signing key from little-endian scalar bytes
    /// (keystore or IPC transport).
    pub fn from_scalar_bytes(bytes: &[u8; 32]) -> Self {
        Self::from_scalar(Scalar::from_bytes_mod_order(*bytes))
    }

    /// Returns the public key `s * B`.
    pub fn public(&self) -> Pubkey {
        self.public
    }

    /// Returns the scalar as little-endian bytes.
    ///
    /// # Security
    /// This is the spending capability for the address. The returned buffer
    /// zeroizes itself, but the caller decides where the copy goes.
    pub fn scalar_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.scalar.to_bytes())
    }

    /// Signs arbitrary bytes, producing a 64-byte Ed25519 signature that
    /// verifies under `self.public()`.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        // prefix = SHA-512(le_bytes(s))[32..64]
        let scalar_bytes = Zeroizing::new(self.scalar.to_bytes());
        let mut prefix_hash: [u8; 64] = Sha512::digest(&scalar_bytes[..]).into();

        // r = SHA-512(prefix || M) mod L
        let mut hasher = Sha512::new();
        hasher.update(&prefix_hash[32..64]);
        hasher.update(message);
        let mut r_wide: [u8; 64] = hasher.finalize().into();
        let mut r = Scalar::from_bytes_mod_order_wide(&r_wide);

        let big_r = EdwardsPoint::mul_base(&r).compress();

        // k = SHA-512(R || A || M) mod L
        let mut hasher = Sha512::new();
        hasher.update(big_r.as_bytes());
        hasher.update(self.public.as_bytes());
        hasher.update(message);
        let k_wide: [u8; 64] = hasher.finalize().into();
        let k = Scalar::from_bytes_mod_order_wide(&k_wide);

        let s = r + k * self.scalar;

        let mut signature = [0u8; SIGNATURE_SIZE];
        signature[..32].copy_from_slice(big_r.as_bytes());
        signature[32..].copy_from_slice(&s.to_bytes());

        prefix_hash.zeroize();
        r_wide.zeroize();
        r.zeroize();

        signature
    }
}

impl Drop for StealthSigningKey {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl std::fmt::Debug for StealthSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StealthSigningKey(public: {}, [REDACTED])", self.public)
    }
}

/// Verifies a 64-byte signature against a public key with the standard
/// Ed25519 verifier (`ed25519-dalek`).
///
/// # Errors
/// - `InvalidPoint` if the public key does not decode
/// - `VerificationFailed` if the signature does not verify
pub fn verify_signature(
    message: &[u8],
    signature: &[u8; SIGNATURE_SIZE],
    public: &Pubkey,
) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(public.as_array())
        .map_err(|e| SolveilError::InvalidPoint(format!("bad verifying key: {e}")))?;
    let signature = Signature::from_bytes(signature);
    verifying_key
        .verify(message, &signature)
        .map_err(|e| SolveilError::VerificationFailed(e.to_string()))
}
