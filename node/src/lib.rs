//! DecentraFund platform: wires the escrow engine together.
//!
//! The platform is the single entry point the API and indexer layers call:
//! - Creates campaigns through the factory and hands out per-campaign locks
//! - Moves native value between backer balances and campaign escrows
//! - Mints incentive tokens for every accepted contribution
//! - Publishes factory, campaign and token events on a synchronous bus
//!
//! Time is injected through [`dfund_types::Clock`]; nothing runs in the background.

pub mod bank;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod platform;

pub use bank::Bank;
pub use config::PlatformConfig;
pub use error::NodeError;
pub use events::{EventBus, PlatformEvent};
pub use logging::{init_logging, LogFormat};
pub use platform::{ContributionReceipt, Platform};
