//! A receiving account: the recipient-side facade.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use solveil_core::error::Result;
use solveil_core::types::{MetaAddress, Pubkey, StealthAddress, StealthKeys};
use solveil_crypto::{
    check_view_tag, compute_expected_address, derive_stealth_keypair, generate_stealth_keys,
    StealthSigningKey,
};

use crate::keystore::Keystore;

/// A stealth receiving account.
///
/// Owns the recipient's key bundle and exposes the operations a wallet
/// needs: publishing the meta-address, filtering announcements, verifying
/// claimed addresses, and recovering signing keys for discovered payments.
///
/// # Example
///
/// ```rust,ignore
/// use solveil_stealth::{Account, Payment};
///
/// let account = Account::generate()?;
/// println!("receive at: {}", account.meta_address_string());
///
/// // Somebody pays us...
/// let payment = Payment::for_recipient(&account.meta_address())?;
///
/// // ...and we can spend it.
/// let key = account.derive_signing_key(&payment.ephemeral_pubkey())?;
/// assert_eq!(key.public(), payment.stealth_address().pubkey());
/// ```
pub struct Account {
    keys: StealthKeys,
}

impl Account {
    /// Generates a new account from the operating system RNG.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a new account from the given RNG (deterministic RNGs are
    /// useful in tests).
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        Ok(Self {
            keys: generate_stealth_keys(rng)?,
        })
    }

    /// Wraps an existing key bundle.
    pub fn from_keys(keys: StealthKeys) -> Self {
        Self { keys }
    }

    /// Returns the public meta-address.
    pub fn meta_address(&self) -> MetaAddress {
        self.keys.meta_address()
    }

    /// Returns the meta-address in its `st:sol:` text form.
    pub fn meta_address_string(&self) -> String {
        self.meta_address().to_string()
    }

    /// Returns the viewing public key.
    pub fn viewing_pubkey(&self) -> Pubkey {
        self.keys.viewing.public
    }

    /// Returns the spending public key.
    pub fn spending_pubkey(&self) -> Pubkey {
        self.keys.spending.public
    }

    /// Borrows the key bundle (delegate to a scanner, etc.).
    pub fn keys(&self) -> &StealthKeys {
        &self.keys
    }

    /// Consumes the account, releasing the key bundle.
    pub fn into_keys(self) -> StealthKeys {
        self.keys
    }

    /// Checks an announced view tag against this account.
    ///
    /// A positive result must be followed by [`expected_address`]
    /// (false-positive rate 1/256).
    ///
    /// [`expected_address`]: Account::expected_address
    pub fn check_view_tag(&self, ephemeral_pubkey: &Pubkey, view_tag: u8) -> Result<bool> {
        check_view_tag(&self.keys.viewing.seed, ephemeral_pubkey, view_tag)
    }

    /// Recomputes the stealth address this account expects for an ephemeral
    /// key.
    pub fn expected_address(&self, ephemeral_pubkey: &Pubkey) -> Result<StealthAddress> {
        compute_expected_address(
            &self.keys.viewing.seed,
            &self.keys.spending.public,
            ephemeral_pubkey,
        )
    }

    /// Recovers the scalar-form signing key for a payment made with the
    /// given ephemeral key.
    pub fn derive_signing_key(&self, ephemeral_pubkey: &Pubkey) -> Result<StealthSigningKey> {
        derive_stealth_keypair(
            &self.keys.viewing.seed,
            &self.keys.spending.seed,
            ephemeral_pubkey,
        )
    }

    /// Serializes the account's key material to keystore JSON.
    pub fn to_keystore_json(&self) -> Result<String> {
        Keystore::from_keys(&self.keys).to_json()
    }

    /// Restores an account from keystore JSON.
    pub fn from_keystore_json(json: &str) -> Result<Self> {
        Ok(Self::from_keys(Keystore::parse_json(json)?))
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("meta_address", &self.meta_address_string())
            .field("keys", &"[REDACTED]")
            .finish()
    }
}
