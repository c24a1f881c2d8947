//! The factory and its registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dfund_campaign::{Campaign, CampaignDetails, CampaignError, CampaignTerms};
use dfund_types::{Address, Timestamp, Wei, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

use crate::error::FactoryError;

/// Default milestone voting window: three days.
pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 3 * SECONDS_PER_DAY;

/// Parameters baked into every campaign this factory creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignParams {
    pub voting_period_secs: u64,
}

impl Default for CampaignParams {
    fn default() -> Self {
        Self {
            voting_period_secs: DEFAULT_VOTING_PERIOD_SECS,
        }
    }
}

/// Everything a creator supplies to launch a campaign.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRequest {
    pub details: CampaignDetails,
    pub target_amount: Wei,
    pub duration_days: u64,
    pub milestone_descriptions: Vec<String>,
    pub milestone_amounts: Vec<Wei>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactoryEvent {
    CampaignCreated {
        campaign: Address,
        creator: Address,
        title: String,
        target_amount: Wei,
        deadline: Timestamp,
        category: String,
        timestamp: Timestamp,
    },
}

#[derive(Default)]
struct Registry {
    deployed: Vec<Address>,
    by_creator: HashMap<Address, Vec<Address>>,
    campaigns: HashMap<Address, Arc<Mutex<Campaign>>>,
    nonce: u64,
    events: Vec<FactoryEvent>,
}

/// Creates campaigns and records them in an append-only registry.
///
/// The registry sits behind an `RwLock`, so `create_campaign` can be called
/// from several threads; each deployed campaign is handed out as its own
/// `Arc<Mutex<Campaign>>` and mutated independently of the others.
pub struct CampaignFactory {
    address: Address,
    params: CampaignParams,
    registry: RwLock<Registry>,
}

impl CampaignFactory {
    pub fn new(address: Address, params: CampaignParams) -> Self {
        Self {
            address,
            params,
            registry: RwLock::new(Registry::default()),
        }
    }

    /// The factory's own identity. Campaign ids derive from it.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn params(&self) -> &CampaignParams {
        &self.params
    }

    /// Validate `request`, deploy a campaign owned by `creator` and register it.
    ///
    /// Nothing is registered and the nonce does not advance when validation fails.
    pub fn create_campaign(
        &self,
        creator: Address,
        request: CampaignRequest,
        now: Timestamp,
    ) -> Result<Address, FactoryError> {
        let CampaignRequest {
            details,
            target_amount,
            duration_days,
            milestone_descriptions,
            milestone_amounts,
        } = request;

        if details.title.is_empty() {
            return Err(CampaignError::EmptyTitle.into());
        }
        if target_amount.is_zero() {
            return Err(CampaignError::InvalidTarget.into());
        }
        if milestone_descriptions.len() != milestone_amounts.len() {
            return Err(CampaignError::MilestoneMismatch(format!(
                "{} descriptions for {} amounts",
                milestone_descriptions.len(),
                milestone_amounts.len()
            ))
            .into());
        }
        let deadline = now.saturating_add_secs(duration_days.saturating_mul(SECONDS_PER_DAY));
        let terms = CampaignTerms {
            target_amount,
            deadline,
            voting_period_secs: self.params.voting_period_secs,
            milestones: milestone_descriptions
                .into_iter()
                .zip(milestone_amounts)
                .collect(),
        };
        let title = details.title.clone();
        let category = details.category.clone();

        let mut registry = self.write()?;
        let id = Address::derive(&self.address, registry.nonce);
        let campaign = Campaign::new(id, creator, details, terms, now)?;
        if duration_days == 0 {
            return Err(FactoryError::InvalidDuration);
        }

        registry.nonce += 1;
        registry.deployed.push(id);
        registry.by_creator.entry(creator).or_default().push(id);
        registry
            .campaigns
            .insert(id, Arc::new(Mutex::new(campaign)));
        registry.events.push(FactoryEvent::CampaignCreated {
            campaign: id,
            creator,
            title,
            target_amount,
            deadline,
            category,
            timestamp: now,
        });

        tracing::info!(campaign = %id, creator = %creator, target = %target_amount, deadline = %deadline, "campaign created");
        Ok(id)
    }

    /// Shared handle to a deployed campaign.
    pub fn campaign(&self, id: &Address) -> Result<Arc<Mutex<Campaign>>, FactoryError> {
        self.read()?
            .campaigns
            .get(id)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownCampaign(id.to_string()))
    }

    /// Campaigns created by `creator`, in creation order.
    pub fn get_campaigns_by_creator(&self, creator: &Address) -> Result<Vec<Address>, FactoryError> {
        Ok(self
            .read()?
            .by_creator
            .get(creator)
            .cloned()
            .unwrap_or_default())
    }

    pub fn get_campaign_count(&self) -> Result<usize, FactoryError> {
        Ok(self.read()?.deployed.len())
    }

    /// Every deployed campaign, in creation order.
    pub fn get_deployed_campaigns(&self) -> Result<Vec<Address>, FactoryError> {
        Ok(self.read()?.deployed.clone())
    }

    /// Drain creation events recorded since the last call.
    pub fn take_events(&self) -> Result<Vec<FactoryEvent>, FactoryError> {
        Ok(std::mem::take(&mut self.write()?.events))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Registry>, FactoryError> {
        self.registry.read().map_err(|_| FactoryError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Registry>, FactoryError> {
        self.registry.write().map_err(|_| FactoryError::Poisoned)
    }
}
