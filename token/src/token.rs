//! The incentive token ledger.

use std::collections::{BTreeSet, HashMap};

use dfund_types::{Address, Wei};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Token raw units per whole token.
pub const TOKEN_UNIT: u128 = 1_000_000_000_000_000_000;

/// Hard cap on token issuance: 100 million whole tokens.
pub const MAX_SUPPLY: u128 = 100_000_000 * TOKEN_UNIT;

/// Token raw units minted per wei contributed.
pub const MINT_RATE: u128 = 1_000;

/// Share of `MAX_SUPPLY` minted to the owner at deployment, in basis points.
pub const OWNER_SHARE_BPS: u32 = 1_000;

const BPS_DENOMINATOR: u128 = 10_000;

/// Deployment parameters for an [`IncentiveToken`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub max_supply: u128,
    pub mint_rate: u128,
    pub owner_share_bps: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "DecentraFund Token".to_string(),
            symbol: "DFUND".to_string(),
            max_supply: MAX_SUPPLY,
            mint_rate: MINT_RATE,
            owner_share_bps: OWNER_SHARE_BPS,
        }
    }
}

/// State changes observable by indexers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    Minted { to: Address, amount: u128 },
    Transferred { from: Address, to: Address, amount: u128 },
    MinterAuthorized { minter: Address },
    MinterRevoked { minter: Address },
    OwnershipTransferred { previous: Address, new_owner: Address },
}

/// Fixed-max-supply fungible balance ledger with an owner-managed minter allowlist.
///
/// `total_minted` never exceeds `max_supply`; only allowlisted minters can issue.
#[derive(Clone, Debug)]
pub struct IncentiveToken {
    name: String,
    symbol: String,
    owner: Address,
    max_supply: u128,
    mint_rate: u128,
    total_minted: u128,
    balances: HashMap<Address, u128>,
    minters: BTreeSet<Address>,
    events: Vec<TokenEvent>,
}

impl IncentiveToken {
    /// Deploy a token; the owner immediately receives `owner_share_bps` of the cap.
    pub fn new(owner: Address, config: TokenConfig) -> Result<Self, TokenError> {
        if config.owner_share_bps as u128 > BPS_DENOMINATOR {
            return Err(TokenError::InvalidConfig(format!(
                "owner share {} bps exceeds 10000",
                config.owner_share_bps
            )));
        }
        if config.max_supply == 0 {
            return Err(TokenError::InvalidConfig("max supply must be non-zero".into()));
        }
        let initial = config.max_supply / BPS_DENOMINATOR * config.owner_share_bps as u128
            + config.max_supply % BPS_DENOMINATOR * config.owner_share_bps as u128
                / BPS_DENOMINATOR;

        let mut token = Self {
            name: config.name,
            symbol: config.symbol,
            owner,
            max_supply: config.max_supply,
            mint_rate: config.mint_rate,
            total_minted: 0,
            balances: HashMap::new(),
            minters: BTreeSet::new(),
            events: Vec::new(),
        };
        if initial > 0 {
            token.credit(owner, initial);
            token.total_minted = initial;
            token.events.push(TokenEvent::Minted {
                to: owner,
                amount: initial,
            });
        }
        tracing::info!(owner = %owner, initial, max_supply = token.max_supply, "incentive token deployed");
        Ok(token)
    }

    /// Add `minter` to the allowlist. Re-authorizing is a no-op.
    pub fn authorize_minter(&mut self, caller: &Address, minter: Address) -> Result<(), TokenError> {
        self.require_owner(caller)?;
        if self.minters.insert(minter) {
            tracing::info!(minter = %minter, "minter authorized");
            self.events.push(TokenEvent::MinterAuthorized { minter });
        }
        Ok(())
    }

    /// Remove `minter` from the allowlist. Revoking an unknown address is a no-op.
    pub fn revoke_minter(&mut self, caller: &Address, minter: &Address) -> Result<(), TokenError> {
        self.require_owner(caller)?;
        if self.minters.remove(minter) {
            tracing::info!(minter = %minter, "minter revoked");
            self.events.push(TokenEvent::MinterRevoked { minter: *minter });
        }
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), TokenError> {
        self.require_owner(caller)?;
        let previous = self.owner;
        self.owner = new_owner;
        self.events.push(TokenEvent::OwnershipTransferred {
            previous,
            new_owner,
        });
        Ok(())
    }

    /// Mint `contribution * mint_rate` to `recipient`.
    ///
    /// Fails without minting anything if the caller is not allowlisted or the
    /// mint would push `total_minted` past `max_supply`.
    pub fn mint_for_contribution(
        &mut self,
        caller: &Address,
        recipient: &Address,
        contribution: Wei,
    ) -> Result<u128, TokenError> {
        if !self.minters.contains(caller) {
            return Err(TokenError::Unauthorized(caller.to_string()));
        }
        if contribution.is_zero() {
            return Err(TokenError::ZeroAmount);
        }
        let exceeded = |requested| TokenError::SupplyExceeded {
            requested,
            minted: self.total_minted,
            max_supply: self.max_supply,
        };
        let amount = contribution
            .raw()
            .checked_mul(self.mint_rate)
            .ok_or_else(|| exceeded(u128::MAX))?;
        let new_total = self
            .total_minted
            .checked_add(amount)
            .filter(|total| *total <= self.max_supply)
            .ok_or_else(|| exceeded(amount))?;

        self.total_minted = new_total;
        self.credit(*recipient, amount);
        self.events.push(TokenEvent::Minted {
            to: *recipient,
            amount,
        });
        tracing::debug!(recipient = %recipient, amount, total_minted = new_total, "minted for contribution");
        Ok(amount)
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert(*from, available - amount);
        self.credit(*to, amount);
        self.events.push(TokenEvent::Transferred {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn max_supply(&self) -> u128 {
        self.max_supply
    }

    pub fn mint_rate(&self) -> u128 {
        self.mint_rate
    }

    pub fn total_supply(&self) -> u128 {
        self.total_minted
    }

    pub fn remaining_supply(&self) -> u128 {
        self.max_supply - self.total_minted
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn is_minter(&self, address: &Address) -> bool {
        self.minters.contains(address)
    }

    pub fn minters(&self) -> impl Iterator<Item = &Address> {
        self.minters.iter()
    }

    /// Drain events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_owner(&self, caller: &Address) -> Result<(), TokenError> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner(caller.to_string()));
        }
        Ok(())
    }

    // Balances are bounded by total_minted <= max_supply, so this cannot overflow.
    fn credit(&mut self, holder: Address, amount: u128) {
        *self.balances.entry(holder).or_insert(0) += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        Address::repeat(0x01)
    }

    fn minter() -> Address {
        Address::repeat(0x02)
    }

    fn backer() -> Address {
        Address::repeat(0x03)
    }

    fn deploy() -> IncentiveToken {
        IncentiveToken::new(owner(), TokenConfig::default()).unwrap()
    }

    #[test]
    fn test_name_and_symbol() {
        let token = deploy();
        assert_eq!(token.name(), "DecentraFund Token");
        assert_eq!(token.symbol(), "DFUND");
    }

    #[test]
    fn test_owner_receives_initial_share() {
        let token = deploy();
        let expected = MAX_SUPPLY * 10 / 100;
        assert_eq!(token.balance_of(&owner()), expected);
        assert_eq!(token.total_supply(), expected);
    }

    #[test]
    fn test_authorized_minter_mints_at_rate() {
        let mut token = deploy();
        token.authorize_minter(&owner(), minter()).unwrap();
        let minted = token
            .mint_for_contribution(&minter(), &backer(), Wei::ether(1))
            .unwrap();
        assert_eq!(minted, Wei::ether(1).raw() * 1000);
        assert_eq!(token.balance_of(&backer()), minted);
    }

    #[test]
    fn test_unauthorized_mint_rejected() {
        let mut token = deploy();
        let err = token
            .mint_for_contribution(&backer(), &backer(), Wei::ether(1))
            .unwrap_err();
        assert!(matches!(err, TokenError::Unauthorized(_)));
        assert_eq!(token.balance_of(&backer()), 0);
    }

    #[test]
    fn test_only_owner_manages_allowlist() {
        let mut token = deploy();
        assert!(matches!(
            token.authorize_minter(&backer(), minter()),
            Err(TokenError::NotOwner(_))
        ));
        token.authorize_minter(&owner(), minter()).unwrap();
        assert!(matches!(
            token.revoke_minter(&backer(), &minter()),
            Err(TokenError::NotOwner(_))
        ));
        token.revoke_minter(&owner(), &minter()).unwrap();
        assert!(!token.is_minter(&minter()));
        assert!(token
            .mint_for_contribution(&minter(), &backer(), Wei::new(1))
            .is_err());
    }

    #[test]
    fn test_supply_cap_enforced_on_crossing_call() {
        let config = TokenConfig {
            max_supply: 10_000,
            mint_rate: 1_000,
            owner_share_bps: 0,
            ..TokenConfig::default()
        };
        let mut token = IncentiveToken::new(owner(), config).unwrap();
        token.authorize_minter(&owner(), minter()).unwrap();

        for _ in 0..9 {
            token
                .mint_for_contribution(&minter(), &backer(), Wei::new(1))
                .unwrap();
        }
        let err = token
            .mint_for_contribution(&minter(), &backer(), Wei::new(2))
            .unwrap_err();
        assert!(matches!(err, TokenError::SupplyExceeded { .. }));
        assert_eq!(token.total_supply(), 9_000);

        // Exactly reaching the cap is allowed.
        token
            .mint_for_contribution(&minter(), &backer(), Wei::new(1))
            .unwrap();
        assert_eq!(token.remaining_supply(), 0);
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut token = deploy();
        let initial = token.balance_of(&owner());
        token.transfer(&owner(), &backer(), 500).unwrap();
        assert_eq!(token.balance_of(&backer()), 500);
        assert_eq!(token.balance_of(&owner()), initial - 500);
        assert!(matches!(
            token.transfer(&backer(), &owner(), 501),
            Err(TokenError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_ownership_transfer_moves_allowlist_control() {
        let mut token = deploy();
        assert!(matches!(
            token.transfer_ownership(&backer(), backer()),
            Err(TokenError::NotOwner(_))
        ));
        token.transfer_ownership(&owner(), backer()).unwrap();
        assert_eq!(token.owner(), &backer());
        assert!(matches!(
            token.authorize_minter(&owner(), minter()),
            Err(TokenError::NotOwner(_))
        ));
        token.authorize_minter(&backer(), minter()).unwrap();
        assert!(token.is_minter(&minter()));
    }

    #[test]
    fn test_invalid_owner_share_rejected() {
        let config = TokenConfig {
            owner_share_bps: 10_001,
            ..TokenConfig::default()
        };
        assert!(IncentiveToken::new(owner(), config).is_err());
    }

    #[test]
    fn test_events_drained() {
        let mut token = deploy();
        token.authorize_minter(&owner(), minter()).unwrap();
        token.authorize_minter(&owner(), minter()).unwrap();
        let events = token.take_events();
        assert_eq!(events.len(), 2); // initial mint + one authorization
        assert!(token.take_events().is_empty());
    }
}
