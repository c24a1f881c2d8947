//! Milestones: fixed tranches of the target, released by weighted vote.

use dfund_types::{Address, Timestamp, Wei};
use serde::{Deserialize, Serialize};

/// Lifecycle of a single milestone: Pending → Voting → {Approved | Rejected}.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MilestoneStatus {
    /// Not yet submitted by the creator.
    Pending = 0,
    /// Submitted; backers may vote until the voting deadline.
    Voting = 1,
    /// Weighted majority approved; funds released to the creator.
    Approved = 2,
    /// Not approved (ties included); no funds moved.
    Rejected = 3,
}

impl MilestoneStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// A tranche of the campaign target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub description: String,
    /// Fixed at creation.
    pub amount: Wei,
    pub status: MilestoneStatus,
    /// Sum of vote weights in favour.
    pub votes_for: Wei,
    /// Sum of vote weights against.
    pub votes_against: Wei,
    /// Set on submission; `None` while Pending.
    pub voting_deadline: Option<Timestamp>,
    pub funds_released: bool,
}

impl Milestone {
    pub fn new(description: impl Into<String>, amount: Wei) -> Self {
        Self {
            description: description.into(),
            amount,
            status: MilestoneStatus::Pending,
            votes_for: Wei::ZERO,
            votes_against: Wei::ZERO,
            voting_deadline: None,
            funds_released: false,
        }
    }

    /// Quorum-free strict majority: ties reject.
    pub fn is_approved_by_tally(&self) -> bool {
        self.votes_for > self.votes_against
    }
}

/// One backer's ballot on one milestone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: Address,
    pub support: bool,
    /// The voter's total contribution when the vote was cast.
    pub weight: Wei,
    pub cast_at: Timestamp,
}

/// How `finalize_milestone` resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneOutcome {
    Approved { index: usize, released: Wei },
    Rejected { index: usize },
}
