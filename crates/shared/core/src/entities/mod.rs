mod auction;
mod fee;
mod listing;
mod transaction;

pub use auction::{Auction, AuctionStatus};
pub use fee::{FeePolicy, FeeSplit, MAX_FEE_RATE};
pub use listing::{Listing, ListingStatus};
pub use transaction::{SettlementEvent, TransactionRecord};
