use dfund_campaign::CampaignError;
use dfund_factory::FactoryError;
use dfund_token::TokenError;
use dfund_types::{TransferError, Wei};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("campaign error: {0}")]
    Campaign(#[from] CampaignError),

    #[error("factory error: {0}")]
    Factory(#[from] FactoryError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("campaign {0} is not registered")]
    UnknownCampaign(String),

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Wei, available: Wei },

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
