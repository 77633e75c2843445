//! # Solveil Cryptography
//!
//! The cryptographic core of the solveil stealth-address scheme: an
//! EIP-5564-style additive tweak on Ed25519, with a twisted-Edwards to
//! Montgomery bridge so ECDH runs over X25519 while signing keys stay
//! Ed25519-compatible.
//!
//! This crate provides:
//!
//! - **Curve bridge**: Ed25519/X25519 conversions and scalar arithmetic mod L
//! - **Derivation**: stealth key generation, sender-side address computation,
//!   receiver-side keypair recovery
//! - **View tags**: the one-byte scan filter
//! - **Signing**: Ed25519 signatures from scalar-form secret keys
//!
//! ## Security Properties
//!
//! - Scalar and point operations on secrets are constant-time (dalek)
//! - Seeds, scalars, shared secrets, and tweaks are zeroized on release
//! - Small-order and identity points are rejected wherever a public key
//!   enters the system
//!
//! ## Example
//!
//! ```rust,ignore
//! use solveil_crypto::{compute_stealth_address, derive_stealth_keypair, generate_stealth_keys_os};
//!
//! // Recipient publishes a meta-address once
//! let keys = generate_stealth_keys_os()?;
//! let meta = keys.meta_address();
//!
//! // Sender derives a fresh one-time address
//! let payment = compute_stealth_address(&meta, &mut rand::rngs::OsRng)?;
//!
//! // Recipient recovers the signing key
//! let signing = derive_stealth_keypair(&keys.viewing.seed, &keys.spending.seed, &payment.ephemeral_pubkey)?;
//! assert_eq!(signing.public(), payment.stealth_address.pubkey());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod curve;
pub mod derive;
pub mod sign;
pub mod view_tag;

pub use derive::{
    compute_expected_address, compute_stealth_address, derive_stealth_keypair,
    generate_stealth_keys, generate_stealth_keys_os, StealthAddressResult,
};
pub use sign::{verify_signature, StealthSigningKey};
pub use view_tag::{check_view_tag, view_tag_from_shared};
