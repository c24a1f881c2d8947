//! The campaign escrow: contribution ledger, status machine and refunds.

use std::collections::HashMap;

use dfund_types::{mul_div, Address, Timestamp, ValueTransfer, Wei};
use serde::{Deserialize, Serialize};

use crate::error::CampaignError;
use crate::events::CampaignEvent;
use crate::milestone::{Milestone, MilestoneStatus, Vote};
use crate::view::{CampaignDetails, CampaignInfo};

/// Funding status. Failed and Cancelled are terminal. Successful is not:
/// milestones keep progressing inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CampaignStatus {
    Active = 0,
    Successful = 1,
    Failed = 2,
    Cancelled = 3,
}

impl CampaignStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }
}

/// Economic terms fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignTerms {
    pub target_amount: Wei,
    pub deadline: Timestamp,
    /// Length of each milestone's voting window.
    pub voting_period_secs: u64,
    /// `(description, amount)` per milestone, in release order.
    pub milestones: Vec<(String, Wei)>,
}

/// Escrow left behind by a rejected milestone, shared pro rata among backers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryPool {
    /// Escrow balance at the moment of rejection.
    pub escrow: Wei,
    /// `current_amount` at the moment of rejection.
    pub basis: Wei,
}

/// One funding round: creator, target, milestones, backers and their votes.
///
/// Invariants:
/// - `sum(milestones.amount) == target_amount`
/// - `current_amount == sum(contributions)`
/// - `escrow_balance == current_amount - released - recovered`
/// - status is Successful only while `current_amount >= target_amount`
#[derive(Clone, Debug)]
pub struct Campaign {
    pub(crate) id: Address,
    pub(crate) creator: Address,
    pub(crate) details: CampaignDetails,
    pub(crate) target_amount: Wei,
    pub(crate) current_amount: Wei,
    pub(crate) escrow_balance: Wei,
    pub(crate) deadline: Timestamp,
    pub(crate) created_at: Timestamp,
    pub(crate) voting_period_secs: u64,
    pub(crate) status: CampaignStatus,
    pub(crate) paused: bool,
    pub(crate) contributions: HashMap<Address, Wei>,
    /// Unique backers in first-contribution order.
    pub(crate) backers: Vec<Address>,
    pub(crate) milestones: Vec<Milestone>,
    pub(crate) current_milestone: usize,
    pub(crate) votes: HashMap<(usize, Address), Vote>,
    pub(crate) recovery: Option<RecoveryPool>,
    pub(crate) events: Vec<CampaignEvent>,
}

impl Campaign {
    /// Create a campaign in the Active state.
    pub fn new(
        id: Address,
        creator: Address,
        details: CampaignDetails,
        terms: CampaignTerms,
        now: Timestamp,
    ) -> Result<Self, CampaignError> {
        if details.title.is_empty() {
            return Err(CampaignError::EmptyTitle);
        }
        if terms.target_amount.is_zero() {
            return Err(CampaignError::InvalidTarget);
        }
        let milestones = validate_milestones(&terms.milestones, terms.target_amount)?;

        Ok(Self {
            id,
            creator,
            details,
            target_amount: terms.target_amount,
            current_amount: Wei::ZERO,
            escrow_balance: Wei::ZERO,
            deadline: terms.deadline,
            created_at: now,
            voting_period_secs: terms.voting_period_secs,
            status: CampaignStatus::Active,
            paused: false,
            contributions: HashMap::new(),
            backers: Vec::new(),
            milestones,
            current_milestone: 0,
            votes: HashMap::new(),
            recovery: None,
            events: Vec::new(),
        })
    }

    // ── Contributions ───────────────────────────────────────────────────

    /// Record `amount` from `backer` and flip to Successful once the target is met.
    pub fn contribute(
        &mut self,
        backer: &Address,
        amount: Wei,
        now: Timestamp,
    ) -> Result<(), CampaignError> {
        if self.paused {
            return Err(CampaignError::Paused);
        }
        if *backer == self.creator {
            return Err(CampaignError::SelfContribution);
        }
        if self.status != CampaignStatus::Active {
            return Err(CampaignError::CampaignNotActive);
        }
        if now.is_after(self.deadline) {
            return Err(CampaignError::DeadlinePassed);
        }
        if amount.is_zero() {
            return Err(CampaignError::ZeroAmount);
        }
        let current = self
            .current_amount
            .checked_add(amount)
            .ok_or(CampaignError::ArithmeticOverflow)?;
        let escrow = self
            .escrow_balance
            .checked_add(amount)
            .ok_or(CampaignError::ArithmeticOverflow)?;
        let previous = self.contribution_of(backer);

        if !self.contributions.contains_key(backer) {
            self.backers.push(*backer);
        }
        // previous <= current_amount, so this cannot overflow once `current` did not.
        self.contributions.insert(*backer, previous + amount);
        self.current_amount = current;
        self.escrow_balance = escrow;
        self.events.push(CampaignEvent::ContributionMade {
            backer: *backer,
            amount,
            timestamp: now,
        });
        tracing::debug!(campaign = %self.id, backer = %backer, %amount, "contribution accepted");

        if self.current_amount >= self.target_amount {
            self.set_status(CampaignStatus::Successful);
        }
        Ok(())
    }

    /// Block new contributions. Idempotent.
    pub fn pause(&mut self, caller: &Address) -> Result<(), CampaignError> {
        self.require_creator(caller)?;
        if !self.paused {
            self.paused = true;
            self.events.push(CampaignEvent::Paused { by: *caller });
        }
        Ok(())
    }

    /// Re-allow contributions. Idempotent.
    pub fn unpause(&mut self, caller: &Address) -> Result<(), CampaignError> {
        self.require_creator(caller)?;
        if self.paused {
            self.paused = false;
            self.events.push(CampaignEvent::Unpaused { by: *caller });
        }
        Ok(())
    }

    /// Cancel before any milestone has been submitted; every backer becomes refundable.
    pub fn cancel(&mut self, caller: &Address) -> Result<(), CampaignError> {
        self.require_creator(caller)?;
        if self.status.is_terminal() {
            return Err(CampaignError::CampaignNotActive);
        }
        if self.current_milestone > 0
            || self
                .milestones
                .iter()
                .any(|m| m.status != MilestoneStatus::Pending)
        {
            return Err(CampaignError::MilestonesStarted);
        }
        self.set_status(CampaignStatus::Cancelled);
        Ok(())
    }

    /// Return the caller's escrowed contribution.
    ///
    /// Refundable when the campaign was cancelled (full amount), when the
    /// current milestone was rejected (pro-rata share of the remaining escrow;
    /// the last backer out receives whatever escrow is left),
    /// or when the deadline passed below target (full amount; the campaign is
    /// marked Failed by this call). The ledger entry is zeroed before the
    /// transfer; a failed transfer restores everything.
    pub fn request_refund(
        &mut self,
        caller: &Address,
        now: Timestamp,
        payout: &mut dyn ValueTransfer,
    ) -> Result<Wei, CampaignError> {
        let contributed = self.contribution_of(caller);
        if contributed.is_zero() {
            return Err(CampaignError::NoContribution);
        }

        let amount = if self.status == CampaignStatus::Cancelled {
            contributed
        } else if let Some(pool) = self.recovery {
            if contributed == self.current_amount {
                // Last backer out takes the rounding remainder too.
                self.escrow_balance
            } else {
                let share = mul_div(contributed.raw(), pool.escrow.raw(), pool.basis.raw())
                    .ok_or(CampaignError::ArithmeticOverflow)?;
                Wei::new(share)
            }
        } else if self.is_underfunded_after_deadline(now) {
            contributed
        } else {
            return Err(CampaignError::NotRefundable);
        };

        let current = self
            .current_amount
            .checked_sub(contributed)
            .ok_or(CampaignError::ArithmeticOverflow)?;
        let escrow = self
            .escrow_balance
            .checked_sub(amount)
            .ok_or(CampaignError::ArithmeticOverflow)?;
        let fails_now = !self.status.is_terminal() && current < self.target_amount;

        // Effects.
        let prior_status = self.status;
        self.contributions.insert(*caller, Wei::ZERO);
        self.current_amount = current;
        self.escrow_balance = escrow;
        if fails_now {
            self.status = CampaignStatus::Failed;
        }

        // Interaction.
        if let Err(err) = payout.transfer(caller, amount) {
            self.contributions.insert(*caller, contributed);
            self.current_amount = current + contributed;
            self.escrow_balance = escrow + amount;
            self.status = prior_status;
            tracing::warn!(campaign = %self.id, backer = %caller, error = %err, "refund transfer failed, rolled back");
            return Err(err.into());
        }

        if fails_now {
            tracing::info!(campaign = %self.id, "campaign marked failed");
            self.events.push(CampaignEvent::CampaignStatusChanged {
                new_status: CampaignStatus::Failed,
            });
        }
        self.events.push(CampaignEvent::RefundIssued {
            backer: *caller,
            amount,
        });
        tracing::info!(campaign = %self.id, backer = %caller, %amount, "refund issued");
        Ok(amount)
    }

    // ── Read model ──────────────────────────────────────────────────────

    pub fn id(&self) -> &Address {
        &self.id
    }

    pub fn creator(&self) -> &Address {
        &self.creator
    }

    pub fn details(&self) -> &CampaignDetails {
        &self.details
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    /// Status as it would read after lazy deadline evaluation at `now`.
    pub fn effective_status(&self, now: Timestamp) -> CampaignStatus {
        if self.status == CampaignStatus::Active && self.is_underfunded_after_deadline(now) {
            CampaignStatus::Failed
        } else {
            self.status
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn target_amount(&self) -> Wei {
        self.target_amount
    }

    pub fn current_amount(&self) -> Wei {
        self.current_amount
    }

    /// Value currently held by the escrow.
    pub fn escrow_balance(&self) -> Wei {
        self.escrow_balance
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn voting_period_secs(&self) -> u64 {
        self.voting_period_secs
    }

    /// The backer's cumulative, non-refunded contribution (their vote weight).
    pub fn contribution_of(&self, backer: &Address) -> Wei {
        self.contributions.get(backer).copied().unwrap_or(Wei::ZERO)
    }

    pub fn backers(&self) -> &[Address] {
        &self.backers
    }

    pub fn total_backers(&self) -> u64 {
        self.backers.len() as u64
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn milestone(&self, index: usize) -> Option<&Milestone> {
        self.milestones.get(index)
    }

    pub fn current_milestone_index(&self) -> usize {
        self.current_milestone
    }

    pub fn recovery_pool(&self) -> Option<&RecoveryPool> {
        self.recovery.as_ref()
    }

    /// Summary with the stored status; see [`Campaign::effective_status`].
    pub fn info(&self) -> CampaignInfo {
        CampaignInfo {
            id: self.id,
            creator: self.creator,
            title: self.details.title.clone(),
            description: self.details.description.clone(),
            image_hash: self.details.image_hash.clone(),
            category: self.details.category.clone(),
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            deadline: self.deadline,
            created_at: self.created_at,
            status: self.status,
            total_milestones: self.milestones.len(),
            current_milestone: self.current_milestone,
            total_backers: self.total_backers(),
        }
    }

    /// Drain events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<CampaignEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Internals ───────────────────────────────────────────────────────

    pub(crate) fn require_creator(&self, caller: &Address) -> Result<(), CampaignError> {
        if *caller != self.creator {
            return Err(CampaignError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    fn is_underfunded_after_deadline(&self, now: Timestamp) -> bool {
        matches!(self.status, CampaignStatus::Active | CampaignStatus::Failed)
            && now.is_after(self.deadline)
            && self.current_amount < self.target_amount
    }

    fn set_status(&mut self, status: CampaignStatus) {
        if self.status == status {
            return;
        }
        tracing::info!(campaign = %self.id, from = ?self.status, to = ?status, "campaign status changed");
        self.status = status;
        self.events
            .push(CampaignEvent::CampaignStatusChanged { new_status: status });
    }
}

fn validate_milestones(
    milestones: &[(String, Wei)],
    target: Wei,
) -> Result<Vec<Milestone>, CampaignError> {
    if milestones.is_empty() {
        return Err(CampaignError::MilestoneMismatch(
            "at least one milestone is required".into(),
        ));
    }
    if milestones.iter().any(|(_, amount)| amount.is_zero()) {
        return Err(CampaignError::MilestoneMismatch(
            "milestone amounts must be non-zero".into(),
        ));
    }
    let total = milestones
        .iter()
        .try_fold(Wei::ZERO, |acc, (_, amount)| acc.checked_add(*amount))
        .ok_or_else(|| CampaignError::MilestoneMismatch("milestone sum overflows".into()))?;
    if total != target {
        return Err(CampaignError::MilestoneMismatch(format!(
            "milestones sum to {total}, target is {target}"
        )));
    }
    Ok(milestones
        .iter()
        .map(|(description, amount)| Milestone::new(description.clone(), *amount))
        .collect())
}
