//! Nullable value transfer: records payouts without moving anything.

use dfund_types::{Address, TransferError, ValueTransfer, Wei};

/// A transfer sink that records every payout, optionally refusing them.
#[derive(Debug, Default)]
pub struct NullTransfer {
    sent: Vec<(Address, Wei)>,
    reject_all: bool,
}

impl NullTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose recipients refuse every transfer.
    pub fn rejecting() -> Self {
        Self {
            sent: Vec::new(),
            reject_all: true,
        }
    }

    /// All payouts recorded so far, in order.
    pub fn sent(&self) -> &[(Address, Wei)] {
        &self.sent
    }

    /// Total value recorded as sent to `to`.
    pub fn total_to(&self, to: &Address) -> Wei {
        self.sent
            .iter()
            .filter(|(addr, _)| addr == to)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

impl ValueTransfer for NullTransfer {
    fn transfer(&mut self, to: &Address, amount: Wei) -> Result<(), TransferError> {
        if self.reject_all {
            return Err(TransferError::Rejected(to.to_string()));
        }
        self.sent.push((*to, amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut sink = NullTransfer::new();
        let a = Address::repeat(1);
        let b = Address::repeat(2);
        sink.transfer(&a, Wei::new(3)).unwrap();
        sink.transfer(&b, Wei::new(4)).unwrap();
        sink.transfer(&a, Wei::new(5)).unwrap();
        assert_eq!(sink.sent().len(), 3);
        assert_eq!(sink.total_to(&a), Wei::new(8));
    }

    #[test]
    fn rejecting_sink_records_nothing() {
        let mut sink = NullTransfer::rejecting();
        assert!(sink.transfer(&Address::repeat(1), Wei::new(1)).is_err());
        assert!(sink.sent().is_empty());
    }
}
