//! Nullable infrastructure for deterministic testing.
//!
//! External capabilities (clock, outward value transfer) are abstracted
//! behind traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never move real value
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod transfer;

pub use clock::NullClock;
pub use transfer::NullTransfer;
