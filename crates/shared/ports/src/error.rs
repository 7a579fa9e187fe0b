use thiserror::Error;

/// Failures surfaced by the asset registry collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Transfer rejected: {0}")]
    TransferRejected(String),

    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Failures surfaced by the funds-movement collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Insufficient funds: account {account} short {shortfall}")]
    InsufficientFunds { account: String, shortfall: String },

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Payment rejected: {0}")]
    Rejected(String),
}

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;
