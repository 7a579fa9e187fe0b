//! Marketplace configuration

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use agora_core::AccountId;

/// Platform parameters for the marketplace engine
///
/// The fee rate set here is only the initial value; it can be changed at
/// runtime through [`crate::MarketplaceEngine::set_fee_rate`], within
/// `[0, MAX_FEE_RATE]`. Fees are computed at settlement time from the rate
/// then in force, never snapshotted per listing.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Platform operator: receives fees, may cancel listings and force-end
    /// auctions
    pub operator: AccountId,
    /// Initial platform fee rate
    pub fee_rate: Decimal,
    /// Fractional step each new bid must clear over the standing bid
    pub min_bid_increment: Decimal,
    /// Shortest allowed auction
    pub min_auction_duration: Duration,
    /// Longest allowed auction
    pub max_auction_duration: Duration,
    /// Budget for each registry/funds call before it counts as unavailable
    pub collaborator_timeout: std::time::Duration,
    /// Fixed appraisal premium over the listing price for verified spaces
    pub verified_premium: Decimal,
}

impl MarketplaceConfig {
    /// Defaults with the given platform operator
    pub fn new(operator: AccountId) -> Self {
        Self {
            operator,
            fee_rate: dec!(0.025),
            min_bid_increment: dec!(0.05),
            min_auction_duration: Duration::hours(1),
            max_auction_duration: Duration::days(7),
            collaborator_timeout: std::time::Duration::from_secs(2),
            verified_premium: dec!(0.10),
        }
    }

    /// True if `duration` fits the allowed auction window
    pub fn duration_allowed(&self, duration: Duration) -> bool {
        duration >= self.min_auction_duration && duration <= self.max_auction_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn default_rates_within_bounds() {
        let config = MarketplaceConfig::new(Uuid::new_v4());
        assert!(config.fee_rate <= agora_core::MAX_FEE_RATE);
        assert!(config.min_bid_increment > Decimal::ZERO);
    }

    #[test]
    fn duration_window_is_inclusive() {
        let config = MarketplaceConfig::new(Uuid::new_v4());
        assert!(config.duration_allowed(Duration::hours(1)));
        assert!(config.duration_allowed(Duration::days(7)));
        assert!(!config.duration_allowed(Duration::minutes(59)));
        assert!(!config.duration_allowed(Duration::days(7) + Duration::seconds(1)));
    }
}
