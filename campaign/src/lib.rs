//! Milestone-gated crowdfunding escrow.
//!
//! A [`Campaign`] collects contributions until its target is met, then releases
//! the escrow tranche by tranche as backers approve each milestone by a
//! contribution-weighted vote. Cancelled, underfunded and milestone-rejected
//! campaigns return escrow to backers through `request_refund`.
//!
//! State machines:
//! - Campaign: Active → Successful (target met) | Failed (deadline, lazily) | Cancelled
//! - Milestone: Pending → Voting → Approved | Rejected
//!
//! All operations take the caller-visible `now`; nothing advances on its own.

pub mod campaign;
pub mod error;
pub mod events;
pub mod governance;
pub mod milestone;
pub mod view;

#[cfg(test)]
mod testing;

pub use campaign::{Campaign, CampaignStatus, CampaignTerms, RecoveryPool};
pub use error::CampaignError;
pub use events::CampaignEvent;
pub use milestone::{Milestone, MilestoneOutcome, MilestoneStatus, Vote};
pub use view::{CampaignDetails, CampaignInfo};
