//! The platform: one factory, its campaigns, the incentive token and native balances.

use std::sync::{Arc, Mutex, MutexGuard};

use dfund_campaign::{Campaign, CampaignInfo, CampaignStatus, Milestone, MilestoneOutcome};
use dfund_factory::{CampaignFactory, CampaignRequest, FactoryError};
use dfund_token::IncentiveToken;
use dfund_types::{Address, Clock, Timestamp, Wei};
use serde::{Deserialize, Serialize};

use crate::bank::Bank;
use crate::config::PlatformConfig;
use crate::events::{EventBus, PlatformEvent};
use crate::NodeError;

/// Result of a successful contribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionReceipt {
    pub campaign: Address,
    pub backer: Address,
    pub amount: Wei,
    /// Incentive tokens minted for this contribution; `None` when minting was skipped.
    pub reward: Option<u128>,
}

/// Entry point for every campaign, token and balance operation.
///
/// Time comes from the injected clock. Each campaign is serialised by its own
/// mutex; lock order is campaign, then bank, then token. Events are published
/// to the bus after the operation that produced them has committed.
pub struct Platform {
    clock: Arc<dyn Clock>,
    operator: Address,
    factory: CampaignFactory,
    token: Mutex<IncentiveToken>,
    bank: Mutex<Bank>,
    bus: EventBus,
}

impl Platform {
    pub fn new(
        config: &PlatformConfig,
        operator: Address,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NodeError> {
        Self::with_bus(config, operator, clock, EventBus::new())
    }

    /// Build a platform whose deployment events reach `bus` subscribers.
    ///
    /// The factory address is derived from `operator`; it is the token's only
    /// authorised minter.
    pub fn with_bus(
        config: &PlatformConfig,
        operator: Address,
        clock: Arc<dyn Clock>,
        bus: EventBus,
    ) -> Result<Self, NodeError> {
        let factory_address = Address::derive(&operator, 0);
        let factory = CampaignFactory::new(factory_address, config.campaign_params());
        let mut token = IncentiveToken::new(operator, config.token_config()?)?;
        token.authorize_minter(&operator, factory_address)?;
        let deploy_events = token.take_events();

        let platform = Self {
            clock,
            operator,
            factory,
            token: Mutex::new(token),
            bank: Mutex::new(Bank::new()),
            bus,
        };
        platform.publish(deploy_events.into_iter().map(PlatformEvent::Token));
        tracing::info!(operator = %operator, factory = %factory_address, "platform started");
        Ok(platform)
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&PlatformEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn operator(&self) -> &Address {
        &self.operator
    }

    pub fn factory(&self) -> &CampaignFactory {
        &self.factory
    }

    // ── Native balances ─────────────────────────────────────────────────

    /// Credit native value to `holder`, returning the new balance.
    pub fn deposit(&self, holder: &Address, amount: Wei) -> Result<Wei, NodeError> {
        let balance = lock(&self.bank, "bank")?.deposit(holder, amount)?;
        tracing::debug!(holder = %holder, %amount, %balance, "deposit");
        Ok(balance)
    }

    pub fn balance_of(&self, holder: &Address) -> Result<Wei, NodeError> {
        Ok(lock(&self.bank, "bank")?.balance_of(holder))
    }

    /// Native value outside every escrow.
    pub fn total_bank_balance(&self) -> Result<Wei, NodeError> {
        Ok(lock(&self.bank, "bank")?.total())
    }

    // ── Token ───────────────────────────────────────────────────────────

    pub fn token_balance_of(&self, holder: &Address) -> Result<u128, NodeError> {
        Ok(lock(&self.token, "token")?.balance_of(holder))
    }

    pub fn token_total_supply(&self) -> Result<u128, NodeError> {
        Ok(lock(&self.token, "token")?.total_supply())
    }

    /// Remove the factory from the minter allowlist. Operator only.
    pub fn revoke_factory_minter(&self, caller: &Address) -> Result<(), NodeError> {
        let mut token = lock(&self.token, "token")?;
        token.revoke_minter(caller, self.factory.address())?;
        let events = token.take_events();
        drop(token);
        self.publish(events.into_iter().map(PlatformEvent::Token));
        Ok(())
    }

    // ── Factory ─────────────────────────────────────────────────────────

    pub fn create_campaign(
        &self,
        creator: &Address,
        request: CampaignRequest,
    ) -> Result<Address, NodeError> {
        let id = self
            .factory
            .create_campaign(*creator, request, self.clock.now())?;
        let events = self.factory.take_events()?;
        self.publish(events.into_iter().map(PlatformEvent::Factory));
        Ok(id)
    }

    pub fn campaigns_by_creator(&self, creator: &Address) -> Result<Vec<Address>, NodeError> {
        Ok(self.factory.get_campaigns_by_creator(creator)?)
    }

    pub fn campaign_count(&self) -> Result<usize, NodeError> {
        Ok(self.factory.get_campaign_count()?)
    }

    pub fn deployed_campaigns(&self) -> Result<Vec<Address>, NodeError> {
        Ok(self.factory.get_deployed_campaigns()?)
    }

    // ── Campaign operations ─────────────────────────────────────────────

    /// Move `amount` from the backer's balance into the campaign escrow and
    /// mint the incentive reward.
    ///
    /// Minting is best effort: a refused mint is logged and reported as
    /// `reward: None`, and the contribution stands.
    pub fn contribute(
        &self,
        campaign: &Address,
        backer: &Address,
        amount: Wei,
    ) -> Result<ContributionReceipt, NodeError> {
        self.with_campaign(campaign, |c, now| {
            let mut bank = lock(&self.bank, "bank")?;
            bank.ensure_available(backer, amount)?;
            c.contribute(backer, amount, now)?;
            bank.withdraw(backer, amount)?;
            Ok(())
        })?;

        let mut token = lock(&self.token, "token")?;
        let reward = match token.mint_for_contribution(self.factory.address(), backer, amount) {
            Ok(minted) => Some(minted),
            Err(err) => {
                tracing::warn!(campaign = %campaign, backer = %backer, %amount, error = %err, "incentive mint skipped");
                None
            }
        };
        let events = token.take_events();
        drop(token);
        self.publish(events.into_iter().map(PlatformEvent::Token));

        Ok(ContributionReceipt {
            campaign: *campaign,
            backer: *backer,
            amount,
            reward,
        })
    }

    pub fn pause(&self, campaign: &Address, caller: &Address) -> Result<(), NodeError> {
        self.with_campaign(campaign, |c, _| Ok(c.pause(caller)?))
    }

    pub fn unpause(&self, campaign: &Address, caller: &Address) -> Result<(), NodeError> {
        self.with_campaign(campaign, |c, _| Ok(c.unpause(caller)?))
    }

    pub fn cancel(&self, campaign: &Address, caller: &Address) -> Result<(), NodeError> {
        self.with_campaign(campaign, |c, _| Ok(c.cancel(caller)?))
    }

    /// Refund the caller's escrowed contribution into their bank balance.
    pub fn request_refund(&self, campaign: &Address, caller: &Address) -> Result<Wei, NodeError> {
        self.with_campaign(campaign, |c, now| {
            let mut bank = lock(&self.bank, "bank")?;
            Ok(c.request_refund(caller, now, &mut *bank)?)
        })
    }

    pub fn submit_milestone(&self, campaign: &Address, caller: &Address) -> Result<usize, NodeError> {
        self.with_campaign(campaign, |c, now| Ok(c.submit_milestone(caller, now)?))
    }

    pub fn vote_milestone(
        &self,
        campaign: &Address,
        voter: &Address,
        support: bool,
    ) -> Result<Wei, NodeError> {
        self.with_campaign(campaign, |c, now| Ok(c.vote_milestone(voter, support, now)?))
    }

    /// Resolve the current milestone; approved tranches land in the creator's bank balance.
    pub fn finalize_milestone(&self, campaign: &Address) -> Result<MilestoneOutcome, NodeError> {
        self.with_campaign(campaign, |c, now| {
            let mut bank = lock(&self.bank, "bank")?;
            Ok(c.finalize_milestone(now, &mut *bank)?)
        })
    }

    // ── Read model ──────────────────────────────────────────────────────

    /// Campaign summary; `status` has deadline expiry applied like [`Self::campaign_status`].
    pub fn campaign_info(&self, campaign: &Address) -> Result<CampaignInfo, NodeError> {
        let now = self.clock.now();
        self.read_campaign(campaign, |c| CampaignInfo {
            status: c.effective_status(now),
            ..c.info()
        })
    }

    /// Status with deadline expiry applied at the current clock time.
    pub fn campaign_status(&self, campaign: &Address) -> Result<CampaignStatus, NodeError> {
        let now = self.clock.now();
        self.read_campaign(campaign, |c| c.effective_status(now))
    }

    pub fn milestones(&self, campaign: &Address) -> Result<Vec<Milestone>, NodeError> {
        self.read_campaign(campaign, |c| c.milestones().to_vec())
    }

    pub fn backers(&self, campaign: &Address) -> Result<Vec<Address>, NodeError> {
        self.read_campaign(campaign, |c| c.backers().to_vec())
    }

    pub fn contribution_of(&self, campaign: &Address, backer: &Address) -> Result<Wei, NodeError> {
        self.read_campaign(campaign, |c| c.contribution_of(backer))
    }

    pub fn has_voted(
        &self,
        campaign: &Address,
        index: usize,
        voter: &Address,
    ) -> Result<bool, NodeError> {
        self.read_campaign(campaign, |c| c.has_voted(index, voter))
    }

    pub fn escrow_balance(&self, campaign: &Address) -> Result<Wei, NodeError> {
        self.read_campaign(campaign, |c| c.escrow_balance())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn handle(&self, id: &Address) -> Result<Arc<Mutex<Campaign>>, NodeError> {
        self.factory.campaign(id).map_err(|err| match err {
            FactoryError::UnknownCampaign(id) => NodeError::UnknownCampaign(id),
            other => other.into(),
        })
    }

    fn with_campaign<R>(
        &self,
        id: &Address,
        op: impl FnOnce(&mut Campaign, Timestamp) -> Result<R, NodeError>,
    ) -> Result<R, NodeError> {
        let handle = self.handle(id)?;
        let mut campaign = lock(&handle, "campaign")?;
        let result = op(&mut campaign, self.clock.now());
        let events = campaign.take_events();
        drop(campaign);
        self.publish(events.into_iter().map(|event| PlatformEvent::Campaign {
            campaign: *id,
            event,
        }));
        result
    }

    fn read_campaign<R>(&self, id: &Address, read: impl FnOnce(&Campaign) -> R) -> Result<R, NodeError> {
        let handle = self.handle(id)?;
        let campaign = lock(&handle, "campaign")?;
        Ok(read(&campaign))
    }

    fn publish(&self, events: impl IntoIterator<Item = PlatformEvent>) {
        for event in events {
            self.bus.emit(&event);
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> Result<MutexGuard<'a, T>, NodeError> {
    mutex.lock().map_err(|_| NodeError::Poisoned(what))
}
