//! DFUND, the incentive token.
//!
//! A capped fungible ledger whose issuance is tied to funding activity:
//! every contribution mints `contribution × MINT_RATE` to the backer, issued by
//! an allowlisted minter (the campaign factory). The deployer receives 10 % of
//! `MAX_SUPPLY` up front; everything else flows through `mint_for_contribution`.

pub mod error;
pub mod token;

pub use error::TokenError;
pub use token::{
    IncentiveToken, TokenConfig, TokenEvent, MAX_SUPPLY, MINT_RATE, OWNER_SHARE_BPS, TOKEN_UNIT,
};
