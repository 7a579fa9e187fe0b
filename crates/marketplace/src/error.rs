//! Marketplace errors
//!
//! Four families, matching how callers should react:
//! - validation and authorization errors: rejected synchronously, no state
//!   change, fix the request
//! - state errors: guard against stale-state races, re-read and retry
//! - collaborator errors: the in-progress operation was rolled back in
//!   full; safe to retry
//! - internal errors: invariant violations, logged and aborted with no
//!   partial effects

use rust_decimal::Decimal;
use thiserror::Error;

use agora_core::{AssetId, ListingId, Timestamp};
use agora_ports::{PaymentError, RegistryError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    // === Validation ===
    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Invalid auction duration: {hours}h outside [{min_hours}h, {max_hours}h]")]
    InvalidDuration {
        hours: i64,
        min_hours: i64,
        max_hours: i64,
    },

    #[error("Invalid fee rate: {0}")]
    InvalidFeeRate(Decimal),

    #[error("Buyer and seller are the same account")]
    SelfPurchase,

    #[error("Bidder is the seller")]
    SelfBid,

    #[error("Insufficient payment: required {required}, offered {offered}")]
    InsufficientPayment { required: Decimal, offered: Decimal },

    #[error("Bid too low: minimum {minimum}, offered {offered}")]
    BidTooLow { minimum: Decimal, offered: Decimal },

    // === Authorization ===
    #[error("Seller does not own asset {0}")]
    NotOwner(AssetId),

    #[error("Caller is not the seller")]
    NotSeller,

    #[error("Caller is neither the seller nor the platform operator")]
    Unauthorized,

    // === State ===
    #[error("Listing not found: {0}")]
    NotFound(ListingId),

    #[error("Listing is not active: {0}")]
    NotActive(ListingId),

    #[error("Asset already has an active listing: {0}")]
    AlreadyListed(AssetId),

    #[error("Listing has no auction: {0}")]
    NoAuction(ListingId),

    #[error("Listing is auction-backed; settle it via end_auction: {0}")]
    HasAuction(ListingId),

    #[error("Auction has ended")]
    AuctionEnded,

    #[error("Auction still running until {ends_at}; only the operator may force-end")]
    TooEarly { ends_at: Timestamp },

    // === Collaborator (retryable, fully rolled back) ===
    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    // === Internal ===
    #[error("Internal invariant violation: {0}")]
    Internal(String),
}

impl MarketError {
    /// True for collaborator failures where the operation was rolled back
    /// and can be retried as-is
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MarketError::RegistryUnavailable(_) | MarketError::PaymentFailed(_)
        )
    }
}

impl From<RegistryError> for MarketError {
    fn from(err: RegistryError) -> Self {
        MarketError::RegistryUnavailable(err.to_string())
    }
}

impl From<PaymentError> for MarketError {
    fn from(err: PaymentError) -> Self {
        MarketError::PaymentFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
