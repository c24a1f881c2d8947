//! Incentive-token errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("caller {0} is not an authorized minter")]
    Unauthorized(String),

    #[error("caller {0} is not the token owner")]
    NotOwner(String),

    #[error("mint of {requested} would exceed max supply ({minted} of {max_supply} minted)")]
    SupplyExceeded {
        requested: u128,
        minted: u128,
        max_supply: u128,
    },

    #[error("insufficient token balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("invalid token configuration: {0}")]
    InvalidConfig(String),
}
