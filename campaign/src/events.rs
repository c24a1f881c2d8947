//! Campaign state-change notifications consumed by the synchronizer.
//!
//! Delivery to consumers is at-least-once; each event carries enough identity
//! (backer, milestone index) for an idempotent mirror.

use dfund_types::{Address, Timestamp, Wei};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignStatus;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignEvent {
    ContributionMade {
        backer: Address,
        amount: Wei,
        timestamp: Timestamp,
    },
    RefundIssued {
        backer: Address,
        amount: Wei,
    },
    MilestoneSubmitted {
        milestone_index: usize,
        description: String,
    },
    MilestoneVoted {
        milestone_index: usize,
        voter: Address,
        support: bool,
        weight: Wei,
    },
    MilestoneApproved {
        milestone_index: usize,
        amount: Wei,
    },
    MilestoneRejected {
        milestone_index: usize,
    },
    FundsWithdrawn {
        creator: Address,
        amount: Wei,
    },
    CampaignStatusChanged {
        new_status: CampaignStatus,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
}
