//! Agora Core Domain
//!
//! Pure domain types for the Agora space marketplace.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod spaces;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Auction,
    AuctionStatus,
    // Fee types
    FeePolicy,
    FeeSplit,
    // Marketplace entities
    Listing,
    ListingStatus,
    MAX_FEE_RATE,
    SettlementEvent,
    TransactionRecord,
};
pub use spaces::{
    AccessTier, Dimensions, LocationProfile, SpaceAttributes, StyleCategory, TrafficHistory,
    VerificationStatus, ZoneTraffic,
};
pub use values::{AccountId, AssetId, ListingId, Price, Timestamp, TransactionId};
