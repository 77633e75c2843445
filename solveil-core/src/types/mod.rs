//! Domain types for solveil.

mod address;
mod announcement;
mod keys;

pub use address::{MetaAddress, StealthAddress};
pub use announcement::{Announcement, AnnouncementStats};
pub use keys::{KeyPair, Pubkey, Seed, StealthKeys};
