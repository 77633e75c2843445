//! # Solveil Registry
//!
//! Announcement storage for the solveil protocol: an in-memory registry for
//! testing and single-process use, and a file-backed registry for
//! single-node durability. Production deployments would back the
//! [`AnnouncementRegistry`](solveil_core::AnnouncementRegistry) trait with
//! an indexer over on-chain memo transactions instead.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;

pub use file::FileRegistry;
pub use memory::MemoryRegistry;
