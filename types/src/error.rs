//! Errors shared by the primitive types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Failure of an outward value transfer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("recipient {0} rejected the transfer")]
    Rejected(String),

    #[error("balance overflow crediting {0}")]
    Overflow(String),
}
