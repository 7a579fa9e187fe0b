use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{AccountId, ListingId, Timestamp};

/// Auction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionStatus {
    /// Accepting bids until the end time
    Active,
    /// Concluded, whether or not the reserve was met
    Settled,
}

/// A time-boxed bidding process attached to a listing
///
/// Invariants maintained by the marketplace engine:
/// - `reserve_price >= start_price`
/// - `highest_bid` is monotonically non-decreasing while Active
/// - `highest_bidder` is set iff `highest_bid > 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub listing_id: ListingId,
    pub start_price: Decimal,
    /// Minimum acceptable winning bid for the auction to settle as a sale
    pub reserve_price: Decimal,
    pub highest_bid: Decimal,
    pub highest_bidder: Option<AccountId>,
    pub end_time: Timestamp,
    pub status: AuctionStatus,
}

impl Auction {
    /// Create a new active auction ending at `end_time`
    pub fn new(
        listing_id: ListingId,
        start_price: Decimal,
        reserve_price: Decimal,
        end_time: Timestamp,
    ) -> Self {
        Self {
            listing_id,
            start_price,
            reserve_price,
            highest_bid: Decimal::ZERO,
            highest_bidder: None,
            end_time,
            status: AuctionStatus::Active,
        }
    }

    /// True once the bidding window has passed
    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.end_time
    }

    /// True if there is a standing bid
    pub fn has_bid(&self) -> bool {
        self.highest_bidder.is_some()
    }

    /// True if the standing bid would settle as a sale
    pub fn reserve_met(&self) -> bool {
        self.has_bid() && self.highest_bid >= self.reserve_price
    }

    /// The smallest amount the next bid must reach
    pub fn minimum_next_bid(&self, min_increment: Decimal) -> Decimal {
        if self.has_bid() {
            self.highest_bid * (Decimal::ONE + min_increment)
        } else {
            self.start_price
        }
    }

    /// Record a new highest bid; caller has already validated the amount
    pub fn record_bid(&mut self, bidder: AccountId, amount: Decimal) {
        debug_assert!(amount >= self.highest_bid);
        self.highest_bid = amount;
        self.highest_bidder = Some(bidder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn first_bid_minimum_is_start_price() {
        let auction = Auction::new(Uuid::new_v4(), dec!(100), dec!(150), Utc::now());
        assert_eq!(auction.minimum_next_bid(dec!(0.05)), dec!(100));
        assert!(!auction.has_bid());
        assert!(!auction.reserve_met());
    }

    #[test]
    fn subsequent_bid_minimum_applies_increment() {
        let mut auction = Auction::new(Uuid::new_v4(), dec!(100), dec!(150), Utc::now());
        auction.record_bid(Uuid::new_v4(), dec!(120));
        assert_eq!(auction.minimum_next_bid(dec!(0.05)), dec!(126));
    }

    #[test]
    fn reserve_met_requires_bid_at_reserve() {
        let mut auction = Auction::new(Uuid::new_v4(), dec!(100), dec!(150), Utc::now());
        auction.record_bid(Uuid::new_v4(), dec!(120));
        assert!(!auction.reserve_met());
        auction.record_bid(Uuid::new_v4(), dec!(150));
        assert!(auction.reserve_met());
    }
}
