use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Upper bound on the platform fee rate (5%)
pub const MAX_FEE_RATE: Decimal = dec!(0.05);

/// How settlement proceeds divide between seller and platform
///
/// `seller_proceeds + platform_fee` always equals the settlement price
/// exactly; the fee is taken from the price, never added on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub seller_proceeds: Decimal,
    pub platform_fee: Decimal,
}

impl FeeSplit {
    /// Total funds moved by this split
    pub fn total(&self) -> Decimal {
        self.seller_proceeds + self.platform_fee
    }
}

/// Platform fee policy
///
/// The rate is a platform parameter, not a per-listing snapshot: changing it
/// applies to every settlement from that point on, including listings created
/// under the old rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    rate: Decimal,
}

impl FeePolicy {
    /// Create a policy; returns None for rates outside [0, MAX_FEE_RATE]
    pub fn new(rate: Decimal) -> Option<Self> {
        if rate >= Decimal::ZERO && rate <= MAX_FEE_RATE {
            Some(Self { rate })
        } else {
            None
        }
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Split a settlement price into seller proceeds and platform fee
    pub fn split(&self, price: Decimal) -> FeeSplit {
        let platform_fee = price * self.rate;
        FeeSplit {
            seller_proceeds: price - platform_fee,
            platform_fee,
        }
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self { rate: dec!(0.025) }
    }
}
