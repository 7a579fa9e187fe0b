//! Marketplace notifications
//!
//! Best-effort fan-out to an optional sink; dropped events never affect an
//! operation's outcome.

use rust_decimal::Decimal;

use agora_core::{AccountId, AssetId, ListingId, Timestamp};

/// Notifications emitted as listings and auctions move through the state
/// machine
#[derive(Debug, Clone)]
pub enum MarketEvent {
    ListingCreated {
        listing_id: ListingId,
        asset_id: AssetId,
        price: Decimal,
    },
    PriceUpdated {
        listing_id: ListingId,
        price: Decimal,
    },
    ListingCancelled {
        listing_id: ListingId,
    },
    ListingSold {
        listing_id: ListingId,
        buyer: AccountId,
        price: Decimal,
    },
    AuctionCreated {
        listing_id: ListingId,
        end_time: Timestamp,
    },
    BidPlaced {
        listing_id: ListingId,
        bidder: AccountId,
        amount: Decimal,
    },
    AuctionSettled {
        listing_id: ListingId,
        sold: bool,
    },
}
