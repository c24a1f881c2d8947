//! Fundamental types for the DecentraFund escrow engine.
//!
//! This crate defines the primitives shared across every other crate in the workspace:
//! addresses, native amounts, timestamps and the clock capability, and the
//! value-transfer seam through which escrows pay out.

pub mod address;
pub mod amount;
pub mod error;
pub mod math;
pub mod time;
pub mod transfer;

pub use address::Address;
pub use amount::{Wei, WEI_PER_ETHER};
pub use error::{TransferError, TypesError};
pub use math::mul_div;
pub use time::{Clock, SystemClock, Timestamp, SECONDS_PER_DAY};
pub use transfer::ValueTransfer;
