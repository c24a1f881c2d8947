//! Read model served to the HTTP layer.

use dfund_types::{Address, Timestamp, Wei};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignStatus;

/// Descriptive metadata supplied at creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDetails {
    pub title: String,
    pub description: String,
    /// Content hash of the pinned campaign image/metadata.
    pub image_hash: String,
    pub category: String,
}

/// Snapshot of a campaign's headline state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInfo {
    pub id: Address,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub image_hash: String,
    pub category: String,
    pub target_amount: Wei,
    pub current_amount: Wei,
    pub deadline: Timestamp,
    pub created_at: Timestamp,
    pub status: CampaignStatus,
    pub total_milestones: usize,
    pub current_milestone: usize,
    pub total_backers: u64,
}
