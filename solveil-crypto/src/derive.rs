//! Stealth key generation and address derivation.
//!
//! ## Derivation flow
//!
//! ```text
//! sender:   ss = X25519(ephemeral_seed, viewing_pubkey)
//! receiver: ss = X25519(viewing_seed, ephemeral_pubkey)
//!           tweak = SHA-256(ss)          view_tag = tweak[0]
//!           t = be(tweak) mod L
//! sender:   P_stealth = P_spend + t * B
//! receiver: s_stealth = (s_spend + t) mod L,  P_stealth = s_stealth * B
//! ```
//!
//! Both sides land on the same `P_stealth` byte-for-byte; only the receiver
//! can form `s_stealth`.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use solveil_core::error::{Result, SolveilError};
use solveil_core::types::{KeyPair, MetaAddress, Pubkey, Seed, StealthAddress, StealthKeys};

use crate::curve;
use crate::sign::StealthSigningKey;

/// What the sender walks away with: where to send funds, and the two values
/// to announce.
#[derive(Clone, Debug)]
pub struct StealthAddressResult {
    /// The one-time address to send funds to.
    pub stealth_address: StealthAddress,
    /// The ephemeral public key to announce.
    pub ephemeral_pubkey: Pubkey,
    /// The view tag to announce.
    pub view_tag: u8,
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Generates a fresh stealth key bundle from the given RNG.
///
/// Draws two independent 32-byte seeds and computes their canonical Ed25519
/// public keys.
///
/// # Errors
/// `RngFailure` if the RNG refuses to deliver bytes.
pub fn generate_stealth_keys<R: RngCore + CryptoRng>(rng: &mut R) -> Result<StealthKeys> {
    let spending = generate_keypair(rng)?;
    let viewing = generate_keypair(rng)?;
    Ok(StealthKeys::new(spending, viewing))
}

/// Generates a fresh stealth key bundle from the operating system RNG.
pub fn generate_stealth_keys_os() -> Result<StealthKeys> {
    generate_stealth_keys(&mut OsRng)
}

fn generate_keypair<R: RngCore + CryptoRng>(rng: &mut R) -> Result<KeyPair> {
    let mut seed = Zeroizing::new([0u8; 32]);
    rng.try_fill_bytes(seed.as_mut())
        .map_err(|e| SolveilError::RngFailure(e.to_string()))?;
    let public = curve::pubkey_from_seed(&seed);
    Ok(KeyPair::new(public, Seed::from_array(*seed)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED SECRET AND TWEAK
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes the shared secret from the receiver's side:
/// `X25519(viewing_seed, ephemeral_pubkey)`.
///
/// # Errors
/// `InvalidPoint` if the ephemeral key does not decode to a usable point.
pub fn receiver_shared_secret(
    viewing_seed: &Seed,
    ephemeral_pubkey: &Pubkey,
) -> Result<Zeroizing<[u8; 32]>> {
    let viewing_x = curve::x25519_secret_from_seed(viewing_seed.as_array());
    let ephemeral_u = curve::edwards_to_montgomery(ephemeral_pubkey.as_array())?;
    Ok(curve::x25519_shared_secret(&viewing_x, &ephemeral_u))
}

/// Hashes a shared secret into the per-payment tweak: the first byte is the
/// view tag, the big-endian interpretation mod L is the tweak scalar.
pub(crate) fn tweak_from_shared(shared_secret: &[u8; 32]) -> (u8, Scalar) {
    let mut tweak: [u8; 32] = Sha256::digest(shared_secret).into();
    let view_tag = tweak[0];
    let scalar = curve::scalar_from_be_bytes(&tweak);
    tweak.zeroize();
    (view_tag, scalar)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SENDER SIDE
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives a one-time stealth address for the recipient behind `meta`
/// (sender side).
///
/// Generates a fresh ephemeral keypair, performs ECDH against the viewing
/// key, and adds the tweak point to the spending key. The ephemeral seed is
/// zeroized before this function returns; only its public half survives, in
/// the result.
///
/// # Errors
/// - `InvalidPoint` if either meta-address key does not decode to a usable
///   point
/// - `RngFailure` if the RNG refuses to deliver bytes
pub fn compute_stealth_address<R: RngCore + CryptoRng>(
    meta: &MetaAddress,
    rng: &mut R,
) -> Result<StealthAddressResult> {
    // Validate the spending key before doing any ephemeral work
    let spend_point = curve::decompress_public_point(meta.spending_pubkey.as_array())?;
    let viewing_u = curve::edwards_to_montgomery(meta.viewing_pubkey.as_array())?;

    let mut ephemeral_seed = Zeroizing::new([0u8; 32]);
    rng.try_fill_bytes(ephemeral_seed.as_mut())
        .map_err(|e| SolveilError::RngFailure(e.to_string()))?;
    let ephemeral_pubkey = curve::pubkey_from_seed(&ephemeral_seed);

    let ephemeral_x = curve::x25519_secret_from_seed(&ephemeral_seed);
    let shared = curve::x25519_shared_secret(&ephemeral_x, &viewing_u);

    let (view_tag, tweak) = tweak_from_shared(&shared);
    let stealth_point = spend_point + EdwardsPoint::mul_base(&tweak);

    Ok(StealthAddressResult {
        stealth_address: StealthAddress::from_array(stealth_point.compress().to_bytes()),
        ephemeral_pubkey,
        view_tag,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECEIVER SIDE
// ═══════════════════════════════════════════════════════════════════════════════

/// Recomputes the stealth address the sender would have derived, without
/// touching the spending seed (receiver side).
///
/// Used by scanners to confirm that an announcement's claimed address is
/// really ours before reporting it.
pub fn compute_expected_address(
    viewing_seed: &Seed,
    spending_pubkey: &Pubkey,
    ephemeral_pubkey: &Pubkey,
) -> Result<StealthAddress> {
    let spend_point = curve::decompress_public_point(spending_pubkey.as_array())?;
    let shared = receiver_shared_secret(viewing_seed, ephemeral_pubkey)?;
    let (_view_tag, tweak) = tweak_from_shared(&shared);
    let stealth_point = spend_point + EdwardsPoint::mul_base(&tweak);
    Ok(StealthAddress::from_array(
        stealth_point.compress().to_bytes(),
    ))
}

/// Recovers the stealth signing key for a payment (receiver side):
/// `s_stealth = (s_spend + t) mod L`.
///
/// The result is a scalar-form key. No seed exists whose standard
/// seed-to-scalar expansion yields it, so signing must go through
/// [`StealthSigningKey::sign`](crate::sign::StealthSigningKey::sign).
///
/// # Errors
/// `InvalidPoint` if the ephemeral key does not decode; infallible
/// otherwise.
pub fn derive_stealth_keypair(
    viewing_seed: &Seed,
    spending_seed: &Seed,
    ephemeral_pubkey: &Pubkey,
) -> Result<StealthSigningKey> {
    let shared = receiver_shared_secret(viewing_seed, ephemeral_pubkey)?;
    let (_view_tag, tweak) = tweak_from_shared(&shared);

    let mut spend_scalar = curve::clamped_scalar_from_seed(spending_seed.as_array());
    let stealth_scalar = spend_scalar + tweak;
    spend_scalar.zeroize();

    Ok(StealthSigningKey::from_scalar(stealth_scalar))
}
