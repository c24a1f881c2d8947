use dfund_campaign::CampaignError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FactoryError {
    #[error("invalid campaign: {0}")]
    Campaign(#[from] CampaignError),

    #[error("campaign duration must be at least one day")]
    InvalidDuration,

    #[error("campaign {0} is not registered")]
    UnknownCampaign(String),

    #[error("campaign registry lock poisoned")]
    Poisoned,
}
