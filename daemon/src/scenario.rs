//! Scripted scenarios: a TOML list of steps replayed against a [`Platform`].
//!
//! ```toml
//! [accounts]
//! creator = "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0"
//! alice = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
//!
//! [[steps]]
//! action = "deposit"
//! account = "alice"
//! amount = "6 ether"
//!
//! [[steps]]
//! action = "create"
//! label = "wells"
//! creator = "creator"
//! title = "Water wells"
//! target = "6 ether"
//! duration_days = 30
//! milestones = [{ description = "drill", amount = "6 ether" }]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

use dfund_campaign::{CampaignDetails, MilestoneOutcome};
use dfund_factory::CampaignRequest;
use dfund_node::{ContributionReceipt, Platform};
use dfund_nullables::NullClock;
use dfund_types::{Address, Timestamp, Wei, SECONDS_PER_DAY, WEI_PER_ETHER};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Unix time the scenario clock starts at; defaults to the wall clock.
    #[serde(default)]
    pub start: Option<u64>,
    /// Operator account (token owner). Defaults to the zero address.
    #[serde(default)]
    pub operator: Option<String>,
    /// Named accounts usable anywhere an address is expected.
    #[serde(default)]
    pub accounts: BTreeMap<String, String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct MilestoneEntry {
    pub description: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Deposit {
        account: String,
        amount: String,
    },
    Create {
        label: String,
        creator: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        image_hash: String,
        #[serde(default)]
        category: String,
        target: String,
        duration_days: u64,
        milestones: Vec<MilestoneEntry>,
    },
    Contribute {
        campaign: String,
        backer: String,
        amount: String,
    },
    Advance {
        #[serde(default)]
        days: u64,
        #[serde(default)]
        secs: u64,
    },
    Pause {
        campaign: String,
        caller: String,
    },
    Unpause {
        campaign: String,
        caller: String,
    },
    Cancel {
        campaign: String,
        caller: String,
    },
    Submit {
        campaign: String,
        caller: String,
    },
    Vote {
        campaign: String,
        voter: String,
        support: bool,
    },
    Finalize {
        campaign: String,
    },
    Refund {
        campaign: String,
        backer: String,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Deposit { .. } => "deposit",
            Step::Create { .. } => "create",
            Step::Contribute { .. } => "contribute",
            Step::Advance { .. } => "advance",
            Step::Pause { .. } => "pause",
            Step::Unpause { .. } => "unpause",
            Step::Cancel { .. } => "cancel",
            Step::Submit { .. } => "submit",
            Step::Vote { .. } => "vote",
            Step::Finalize { .. } => "finalize",
            Step::Refund { .. } => "refund",
        }
    }
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid scenario")
    }

    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn operator_address(&self) -> anyhow::Result<Address> {
        match &self.operator {
            Some(name) => resolve(&self.accounts, name),
            None => Ok(Address::ZERO),
        }
    }
}

/// Parse `"<n> ether"`, `"<n> wei"` or a bare wei count.
pub fn parse_amount(s: &str) -> anyhow::Result<Wei> {
    let s = s.trim();
    let (digits, unit) = match s.split_once(char::is_whitespace) {
        Some((digits, unit)) => (digits, unit.trim()),
        None => (s, "wei"),
    };
    let n: u128 = digits
        .replace('_', "")
        .parse()
        .with_context(|| format!("invalid amount: {s}"))?;
    let raw = match unit {
        "wei" => n,
        "ether" | "eth" => n
            .checked_mul(WEI_PER_ETHER)
            .ok_or_else(|| anyhow!("amount overflows: {s}"))?,
        other => bail!("unknown unit {other:?} in amount {s}"),
    };
    Ok(Wei::new(raw))
}

fn resolve(accounts: &BTreeMap<String, String>, name: &str) -> anyhow::Result<Address> {
    let text = accounts.get(name).map(String::as_str).unwrap_or(name);
    text.parse()
        .map_err(|e| anyhow!("unknown account {name:?}: {e}"))
}

/// What a successful step produced.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutput {
    Balance(Wei),
    Campaign(Address),
    Receipt(ContributionReceipt),
    Now(Timestamp),
    Milestone(usize),
    Weight(Wei),
    Outcome(MilestoneOutcome),
    Refunded(Wei),
    Done,
}

/// Replays steps against a platform, tracking account and campaign labels.
pub struct Runner {
    platform: Platform,
    clock: Arc<NullClock>,
    accounts: BTreeMap<String, String>,
    campaigns: HashMap<String, Address>,
}

impl Runner {
    pub fn new(platform: Platform, clock: Arc<NullClock>, accounts: BTreeMap<String, String>) -> Self {
        Self {
            platform,
            clock,
            accounts,
            campaigns: HashMap::new(),
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn campaign(&self, label: &str) -> anyhow::Result<Address> {
        self.campaigns
            .get(label)
            .copied()
            .ok_or_else(|| anyhow!("unknown campaign label {label:?}"))
    }

    fn account(&self, name: &str) -> anyhow::Result<Address> {
        resolve(&self.accounts, name)
    }

    /// Execute one step.
    pub fn run_step(&mut self, step: &Step) -> anyhow::Result<StepOutput> {
        let p = &self.platform;
        let result = match step {
            Step::Deposit { account, amount } => {
                let balance = p.deposit(&self.account(account)?, parse_amount(amount)?)?;
                StepOutput::Balance(balance)
            }
            Step::Create {
                label,
                creator,
                title,
                description,
                image_hash,
                category,
                target,
                duration_days,
                milestones,
            } => {
                let request = CampaignRequest {
                    details: CampaignDetails {
                        title: title.clone(),
                        description: description.clone(),
                        image_hash: image_hash.clone(),
                        category: category.clone(),
                    },
                    target_amount: parse_amount(target)?,
                    duration_days: *duration_days,
                    milestone_descriptions: milestones.iter().map(|m| m.description.clone()).collect(),
                    milestone_amounts: milestones
                        .iter()
                        .map(|m| parse_amount(&m.amount))
                        .collect::<anyhow::Result<_>>()?,
                };
                let id = p.create_campaign(&self.account(creator)?, request)?;
                self.campaigns.insert(label.clone(), id);
                StepOutput::Campaign(id)
            }
            Step::Contribute {
                campaign,
                backer,
                amount,
            } => {
                let receipt = p.contribute(
                    &self.campaign(campaign)?,
                    &self.account(backer)?,
                    parse_amount(amount)?,
                )?;
                StepOutput::Receipt(receipt)
            }
            Step::Advance { days, secs } => {
                let total = days.saturating_mul(SECONDS_PER_DAY).saturating_add(*secs);
                self.clock.advance(total);
                StepOutput::Now(p.now())
            }
            Step::Pause { campaign, caller } => {
                p.pause(&self.campaign(campaign)?, &self.account(caller)?)?;
                StepOutput::Done
            }
            Step::Unpause { campaign, caller } => {
                p.unpause(&self.campaign(campaign)?, &self.account(caller)?)?;
                StepOutput::Done
            }
            Step::Cancel { campaign, caller } => {
                p.cancel(&self.campaign(campaign)?, &self.account(caller)?)?;
                StepOutput::Done
            }
            Step::Submit { campaign, caller } => {
                let index = p.submit_milestone(&self.campaign(campaign)?, &self.account(caller)?)?;
                StepOutput::Milestone(index)
            }
            Step::Vote {
                campaign,
                voter,
                support,
            } => {
                let weight =
                    p.vote_milestone(&self.campaign(campaign)?, &self.account(voter)?, *support)?;
                StepOutput::Weight(weight)
            }
            Step::Finalize { campaign } => {
                let outcome = p.finalize_milestone(&self.campaign(campaign)?)?;
                StepOutput::Outcome(outcome)
            }
            Step::Refund { campaign, backer } => {
                let amount = p.request_refund(&self.campaign(campaign)?, &self.account(backer)?)?;
                StepOutput::Refunded(amount)
            }
        };
        Ok(result)
    }
}
