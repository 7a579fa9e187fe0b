use serde::{Deserialize, Serialize};

/// Foot-traffic tier of the zone a space sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneTraffic {
    Low,
    Medium,
    High,
}

/// How easily visitors can reach the space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessTier {
    Basic,
    Standard,
    Premium,
}

/// Declared location attributes of a space
///
/// Absent entirely for spaces without a fixed position; valuation then
/// applies a neutral location factor of 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationProfile {
    pub zone_traffic: ZoneTraffic,
    pub has_view: bool,
    pub accessibility: AccessTier,
}

impl LocationProfile {
    /// Multiplicative premium or discount applied to a valuation
    pub fn factor(&self) -> f64 {
        let zone = match self.zone_traffic {
            ZoneTraffic::Low => 0.9,
            ZoneTraffic::Medium => 1.0,
            ZoneTraffic::High => 1.25,
        };
        let view = if self.has_view { 0.1 } else { 0.0 };
        let access = match self.accessibility {
            AccessTier::Basic => 0.95,
            AccessTier::Standard => 1.0,
            AccessTier::Premium => 1.1,
        };
        (zone + view) * access
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_profile_factors_to_one() {
        let profile = LocationProfile {
            zone_traffic: ZoneTraffic::Medium,
            has_view: false,
            accessibility: AccessTier::Standard,
        };
        assert_eq!(profile.factor(), 1.0);
    }

    #[test]
    fn premium_location_beats_basic() {
        let premium = LocationProfile {
            zone_traffic: ZoneTraffic::High,
            has_view: true,
            accessibility: AccessTier::Premium,
        };
        let basic = LocationProfile {
            zone_traffic: ZoneTraffic::Low,
            has_view: false,
            accessibility: AccessTier::Basic,
        };
        assert!(premium.factor() > 1.0);
        assert!(basic.factor() < 1.0);
    }
}
