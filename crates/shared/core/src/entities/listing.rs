use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::values::{AccountId, AssetId, ListingId, Timestamp};

/// Listing lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Open for purchase or bidding
    Active,
    /// Settled as a sale; retained for history
    Sold,
    /// Withdrawn by the seller or operator, or an auction that missed reserve
    Cancelled,
}

impl ListingStatus {
    /// Returns true if the listing can still transition
    pub fn is_active(&self) -> bool {
        matches!(self, ListingStatus::Active)
    }

    /// Returns true if the listing is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ListingStatus::Sold | ListingStatus::Cancelled)
    }
}

/// An offer to sell a space token, fixed-price or auction-backed
///
/// A sold or cancelled listing is never reactivated; the marketplace keeps it
/// for the audit trail. An asset has at most one Active listing at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    /// The space token being offered
    pub asset_id: AssetId,
    pub seller: AccountId,
    /// Asking price; for auction-backed listings this is the start price
    pub price: Decimal,
    /// Valuation snapshot taken when the listing was created
    pub appraised_value: Decimal,
    pub status: ListingStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    /// Create a new active listing with clock-provided time
    pub fn new_with_time(
        asset_id: impl Into<AssetId>,
        seller: AccountId,
        price: Decimal,
        appraised_value: Decimal,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id: asset_id.into(),
            seller,
            price,
            appraised_value,
            status: ListingStatus::Active,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Update the asking price, stamping the modification time
    pub fn reprice(&mut self, new_price: Decimal, timestamp: Timestamp) {
        self.price = new_price;
        self.updated_at = timestamp;
    }

    /// Transition to a terminal status, stamping the modification time
    pub fn close(&mut self, status: ListingStatus, timestamp: Timestamp) {
        self.status = status;
        self.updated_at = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn new_listing_is_active() {
        let listing = Listing::new_with_time("space-1", Uuid::new_v4(), dec!(100), dec!(110), Utc::now());
        assert!(listing.status.is_active());
        assert_eq!(listing.created_at, listing.updated_at);
    }

    #[test]
    fn close_is_terminal() {
        let mut listing =
            Listing::new_with_time("space-1", Uuid::new_v4(), dec!(100), dec!(110), Utc::now());
        listing.close(ListingStatus::Sold, Utc::now());
        assert!(listing.status.is_terminal());
        assert!(!listing.status.is_active());
    }
}
