//! Account keystore: persisted key material as a JSON object.
//!
//! Format:
//!
//! ```json
//! {
//!   "viewingPrivkey":  "<base58 seed>",
//!   "spendingPrivkey": "<base58 seed>",
//!   "viewingPubkey":   "<base58 pubkey>",
//!   "spendingPubkey":  "<base58 pubkey>"
//! }
//! ```
//!
//! This is a local convenience format, not a wire format. It carries no
//! MAC or encryption; protecting the file is the caller's job.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use solveil_core::error::{Result, SolveilError};
use solveil_core::types::{KeyPair, Pubkey, Seed, StealthKeys};
use solveil_crypto::curve::pubkey_from_seed;

/// Serialized account key material.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keystore {
    viewing_privkey: String,
    spending_privkey: String,
    viewing_pubkey: String,
    spending_pubkey: String,
}

impl Keystore {
    /// Builds a keystore from a key bundle.
    pub fn from_keys(keys: &StealthKeys) -> Self {
        Self {
            viewing_privkey: keys.viewing.seed.to_base58(),
            spending_privkey: keys.spending.seed.to_base58(),
            viewing_pubkey: keys.viewing.public.to_base58(),
            spending_pubkey: keys.spending.public.to_base58(),
        }
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses keystore JSON back into a key bundle.
    ///
    /// # Errors
    /// `InvalidEncoding` if a field is malformed, or if a stored public key
    /// is not the canonical public key of its seed (a corrupted or
    /// hand-edited file).
    pub fn parse_json(json: &str) -> Result<StealthKeys> {
        let mut keystore: Keystore = serde_json::from_str(json)?;
        let keys = keystore.to_keys();
        keystore.zeroize_secrets();
        keys
    }

    fn to_keys(&self) -> Result<StealthKeys> {
        let viewing_seed = Seed::from_base58(&self.viewing_privkey)?;
        let spending_seed = Seed::from_base58(&self.spending_privkey)?;
        let viewing_pubkey = Pubkey::from_base58(&self.viewing_pubkey)?;
        let spending_pubkey = Pubkey::from_base58(&self.spending_pubkey)?;

        // The stored public keys are redundant; reject files where they
        // disagree with the seeds.
        if pubkey_from_seed(viewing_seed.as_array()) != viewing_pubkey {
            return Err(SolveilError::InvalidEncoding(
                "viewing pubkey does not match viewing seed".into(),
            ));
        }
        if pubkey_from_seed(spending_seed.as_array()) != spending_pubkey {
            return Err(SolveilError::InvalidEncoding(
                "spending pubkey does not match spending seed".into(),
            ));
        }

        Ok(StealthKeys::new(
            KeyPair::new(spending_pubkey, spending_seed),
            KeyPair::new(viewing_pubkey, viewing_seed),
        ))
    }

    fn zeroize_secrets(&mut self) {
        self.viewing_privkey.zeroize();
        self.spending_privkey.zeroize();
    }
}

impl Drop for Keystore {
    fn drop(&mut self) {
        self.zeroize_secrets();
    }
}

impl std::fmt::Debug for Keystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystore")
            .field("viewing_pubkey", &self.viewing_pubkey)
            .field("spending_pubkey", &self.spending_pubkey)
            .field("seeds", &"[REDACTED]")
            .finish()
    }
}
