//! Native-value balances held outside any campaign escrow.

use std::collections::HashMap;

use dfund_types::{Address, TransferError, ValueTransfer, Wei};

use crate::NodeError;

/// Account balances for the native currency.
///
/// Contributions debit a backer's balance into a campaign escrow; refunds and
/// milestone releases come back in through [`ValueTransfer`].
#[derive(Debug, Default)]
pub struct Bank {
    balances: HashMap<Address, Wei>,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: &Address) -> Wei {
        self.balances.get(holder).copied().unwrap_or(Wei::ZERO)
    }

    /// Credit `amount` to `holder`, returning the new balance.
    pub fn deposit(&mut self, holder: &Address, amount: Wei) -> Result<Wei, TransferError> {
        let balance = self
            .balance_of(holder)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(holder.to_string()))?;
        self.balances.insert(*holder, balance);
        Ok(balance)
    }

    pub fn ensure_available(&self, holder: &Address, needed: Wei) -> Result<(), NodeError> {
        let available = self.balance_of(holder);
        if available < needed {
            return Err(NodeError::InsufficientFunds { needed, available });
        }
        Ok(())
    }

    pub fn withdraw(&mut self, holder: &Address, amount: Wei) -> Result<Wei, NodeError> {
        self.ensure_available(holder, amount)?;
        let balance = self.balance_of(holder) - amount;
        self.balances.insert(*holder, balance);
        Ok(balance)
    }

    /// Sum of every balance.
    pub fn total(&self) -> Wei {
        self.balances.values().copied().sum()
    }
}

impl ValueTransfer for Bank {
    fn transfer(&mut self, to: &Address, amount: Wei) -> Result<(), TransferError> {
        self.deposit(to, amount).map(|_| ())
    }
}
