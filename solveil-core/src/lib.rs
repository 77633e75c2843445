//! # Solveil Core
//!
//! Core types, errors, and traits for the solveil stealth-address protocol.
//!
//! This crate provides the foundational building blocks used by all other
//! solveil crates:
//!
//! - **Types**: Domain models for keys, addresses, and announcements
//! - **Errors**: The protocol-wide error enum with context
//! - **Constants**: Protocol constants and sizes
//! - **Traits**: Async seams for announcement storage and chain queries
//!
//! ## Example
//!
//! ```rust
//! use solveil_core::{MetaAddress, Pubkey};
//!
//! let meta = MetaAddress::new(Pubkey::from_array([1; 32]), Pubkey::from_array([2; 32]));
//! let encoded = meta.to_string();
//! assert!(encoded.starts_with("st:sol:"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{Result, SolveilError};
pub use traits::*;
pub use types::*;
