use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::spaces::StyleCategory;
use crate::values::{AccountId, ListingId, Timestamp, TransactionId};

/// Immutable record of a completed sale or auction settlement
///
/// Appended once per settlement, never mutated or deleted. The full sequence
/// forms the marketplace audit trail and feeds market statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub listing_id: ListingId,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub price: Decimal,
    pub timestamp: Timestamp,
}

impl TransactionRecord {
    pub fn new(
        listing_id: ListingId,
        seller: AccountId,
        buyer: AccountId,
        price: Decimal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            seller,
            buyer,
            price,
            timestamp,
        }
    }
}

/// Market feedback emitted exactly once per completed sale
///
/// The only input the market statistics store consumes from the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementEvent {
    pub category: StyleCategory,
    pub price: Decimal,
    pub timestamp: Timestamp,
}
