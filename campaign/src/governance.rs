//! Milestone governance: submit → weighted vote → permissionless finalize.
//!
//! Milestones resolve strictly in index order and at most one is in Voting.
//! Vote weight is the voter's total contribution; approval needs
//! `votes_for > votes_against` among votes cast, so ties and empty ballots reject.

use dfund_types::{Address, Timestamp, ValueTransfer, Wei};

use crate::campaign::{Campaign, CampaignStatus, RecoveryPool};
use crate::error::CampaignError;
use crate::events::CampaignEvent;
use crate::milestone::{MilestoneOutcome, MilestoneStatus, Vote};

impl Campaign {
    /// Open voting on the current milestone. Creator only.
    pub fn submit_milestone(
        &mut self,
        caller: &Address,
        now: Timestamp,
    ) -> Result<usize, CampaignError> {
        self.require_creator(caller)?;
        if self.status != CampaignStatus::Successful {
            return Err(CampaignError::CampaignNotSuccessful);
        }
        let index = self.current_milestone;
        let voting_period = self.voting_period_secs;
        let milestone = self
            .milestones
            .get_mut(index)
            .ok_or(CampaignError::NoMoreMilestones)?;
        if milestone.status != MilestoneStatus::Pending {
            return Err(CampaignError::MilestoneNotPending(index));
        }

        let deadline = now.saturating_add_secs(voting_period);
        milestone.status = MilestoneStatus::Voting;
        milestone.voting_deadline = Some(deadline);
        let description = milestone.description.clone();

        tracing::info!(campaign = %self.id, milestone = index, voting_deadline = %deadline, "milestone submitted");
        self.events.push(CampaignEvent::MilestoneSubmitted {
            milestone_index: index,
            description,
        });
        Ok(index)
    }

    /// Cast a weighted vote on the milestone currently in Voting.
    pub fn vote_milestone(
        &mut self,
        voter: &Address,
        support: bool,
        now: Timestamp,
    ) -> Result<Wei, CampaignError> {
        let weight = self.contribution_of(voter);
        if weight.is_zero() {
            return Err(CampaignError::NotBacker(voter.to_string()));
        }
        let index = self.current_milestone;
        let milestone = self
            .milestones
            .get(index)
            .filter(|m| m.status == MilestoneStatus::Voting)
            .ok_or(CampaignError::MilestoneNotVoting)?;
        if milestone
            .voting_deadline
            .map_or(true, |deadline| now.is_after(deadline))
        {
            return Err(CampaignError::VotingClosed(index));
        }
        if self.votes.contains_key(&(index, *voter)) {
            return Err(CampaignError::AlreadyVoted {
                index,
                voter: voter.to_string(),
            });
        }
        let (votes_for, votes_against) = if support {
            let tally = milestone
                .votes_for
                .checked_add(weight)
                .ok_or(CampaignError::ArithmeticOverflow)?;
            (tally, milestone.votes_against)
        } else {
            let tally = milestone
                .votes_against
                .checked_add(weight)
                .ok_or(CampaignError::ArithmeticOverflow)?;
            (milestone.votes_for, tally)
        };

        let milestone = &mut self.milestones[index];
        milestone.votes_for = votes_for;
        milestone.votes_against = votes_against;
        self.votes.insert(
            (index, *voter),
            Vote {
                voter: *voter,
                support,
                weight,
                cast_at: now,
            },
        );
        tracing::debug!(campaign = %self.id, milestone = index, voter = %voter, support, %weight, "vote recorded");
        self.events.push(CampaignEvent::MilestoneVoted {
            milestone_index: index,
            voter: *voter,
            support,
            weight,
        });
        Ok(weight)
    }

    /// Resolve the current milestone once its voting window has closed.
    ///
    /// Callable by anyone. On approval the tranche is released to the creator
    /// (the final tranche also sweeps any over-funding surplus) and the
    /// milestone pointer advances. On rejection nothing moves; the remaining
    /// escrow becomes claimable pro rata through [`Campaign::request_refund`].
    pub fn finalize_milestone(
        &mut self,
        now: Timestamp,
        payout: &mut dyn ValueTransfer,
    ) -> Result<MilestoneOutcome, CampaignError> {
        let index = self.current_milestone;
        let milestone = self
            .milestones
            .get(index)
            .filter(|m| m.status == MilestoneStatus::Voting)
            .ok_or(CampaignError::MilestoneNotVoting)?;
        let closed = milestone
            .voting_deadline
            .map_or(true, |deadline| now.is_after(deadline));
        if !closed {
            return Err(CampaignError::VotingStillOpen(index));
        }

        if !milestone.is_approved_by_tally() {
            let (votes_for, votes_against) = (milestone.votes_for, milestone.votes_against);
            self.milestones[index].status = MilestoneStatus::Rejected;
            self.recovery = Some(RecoveryPool {
                escrow: self.escrow_balance,
                basis: self.current_amount,
            });
            tracing::info!(campaign = %self.id, milestone = index, %votes_for, %votes_against, "milestone rejected");
            self.events.push(CampaignEvent::MilestoneRejected {
                milestone_index: index,
            });
            return Ok(MilestoneOutcome::Rejected { index });
        }

        // The final tranche also carries any surplus raised past the target.
        let tranche = milestone.amount;
        let released = if index + 1 == self.milestones.len() {
            self.escrow_balance
        } else {
            tranche
        };
        if released < tranche {
            return Err(CampaignError::ArithmeticOverflow);
        }
        let escrow = self
            .escrow_balance
            .checked_sub(released)
            .ok_or(CampaignError::ArithmeticOverflow)?;

        // Effects.
        let milestone = &mut self.milestones[index];
        milestone.status = MilestoneStatus::Approved;
        milestone.funds_released = true;
        self.escrow_balance = escrow;
        self.current_milestone = index + 1;

        // Interaction.
        let creator = self.creator;
        if let Err(err) = payout.transfer(&creator, released) {
            let milestone = &mut self.milestones[index];
            milestone.status = MilestoneStatus::Voting;
            milestone.funds_released = false;
            self.escrow_balance = escrow + released;
            self.current_milestone = index;
            tracing::warn!(campaign = %self.id, milestone = index, error = %err, "release transfer failed, rolled back");
            return Err(err.into());
        }

        tracing::info!(campaign = %self.id, milestone = index, %released, "milestone approved, funds released");
        self.events.push(CampaignEvent::MilestoneApproved {
            milestone_index: index,
            amount: tranche,
        });
        self.events.push(CampaignEvent::FundsWithdrawn {
            creator,
            amount: released,
        });
        Ok(MilestoneOutcome::Approved { index, released })
    }

    /// Whether `voter` has a recorded ballot on milestone `index`.
    pub fn has_voted(&self, index: usize, voter: &Address) -> bool {
        self.votes.contains_key(&(index, *voter))
    }

    pub fn vote_of(&self, index: usize, voter: &Address) -> Option<&Vote> {
        self.votes.get(&(index, *voter))
    }
}
