//! Campaign factory.
//!
//! Validates creation requests, derives each campaign's identity from the
//! factory address and a monotonically increasing nonce, and keeps the
//! append-only registry of deployed campaigns.

pub mod error;
pub mod factory;

pub use error::FactoryError;
pub use factory::{CampaignFactory, CampaignParams, CampaignRequest, FactoryEvent};
