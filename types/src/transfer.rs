//! The outward value-transfer seam.
//!
//! Escrow holders (campaigns) never move value themselves; they finish every
//! ledger mutation first and then hand the payout to a `ValueTransfer`.

use crate::{Address, TransferError, Wei};

/// Destination for value leaving an escrow.
pub trait ValueTransfer {
    fn transfer(&mut self, to: &Address, amount: Wei) -> Result<(), TransferError>;
}

impl<T: ValueTransfer + ?Sized> ValueTransfer for &mut T {
    fn transfer(&mut self, to: &Address, amount: Wei) -> Result<(), TransferError> {
        (**self).transfer(to, amount)
    }
}
