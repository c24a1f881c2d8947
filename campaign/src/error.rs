//! Campaign errors.
//!
//! Every variant is a precondition failure; a call that returns one has left
//! the campaign exactly as it found it.

use dfund_types::TransferError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampaignError {
    // ── Input validation ────────────────────────────────────────────────
    #[error("campaign title is required")]
    EmptyTitle,

    #[error("target amount must be greater than zero")]
    InvalidTarget,

    #[error("milestone mismatch: {0}")]
    MilestoneMismatch(String),

    #[error("amount must be greater than zero")]
    ZeroAmount,

    // ── Authorization ───────────────────────────────────────────────────
    #[error("caller {0} is not the campaign creator")]
    Unauthorized(String),

    #[error("creator cannot contribute to their own campaign")]
    SelfContribution,

    #[error("caller {0} has not backed this campaign")]
    NotBacker(String),

    // ── State preconditions ─────────────────────────────────────────────
    #[error("contributions are paused")]
    Paused,

    #[error("campaign is not active")]
    CampaignNotActive,

    #[error("funding deadline has passed")]
    DeadlinePassed,

    #[error("campaign has not reached its target")]
    CampaignNotSuccessful,

    #[error("all milestones have been submitted")]
    NoMoreMilestones,

    #[error("milestone {0} is not pending")]
    MilestoneNotPending(usize),

    #[error("current milestone is not open for voting")]
    MilestoneNotVoting,

    #[error("voting window for milestone {0} has closed")]
    VotingClosed(usize),

    #[error("voting window for milestone {0} is still open")]
    VotingStillOpen(usize),

    #[error("{voter} has already voted on milestone {index}")]
    AlreadyVoted { index: usize, voter: String },

    #[error("milestones have already started")]
    MilestonesStarted,

    #[error("no contribution to refund")]
    NoContribution,

    #[error("campaign is not refundable")]
    NotRefundable,

    // ── Resource ────────────────────────────────────────────────────────
    #[error("arithmetic overflow in campaign accounting")]
    ArithmeticOverflow,

    #[error("value transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}
