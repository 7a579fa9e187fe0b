use serde::{Deserialize, Serialize};

use super::{LocationProfile, StyleCategory};

/// Default footprint for spaces minted without explicit dimensions (meters)
pub const DEFAULT_DIMENSIONS: Dimensions = Dimensions {
    width: 100.0,
    height: 50.0,
    depth: 100.0,
};
/// Default room count for spaces minted without one
pub const DEFAULT_ROOM_COUNT: u32 = 3;
/// Default object count for spaces minted without one
pub const DEFAULT_OBJECT_COUNT: u32 = 20;

/// Physical extent of a space in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Enclosed volume in cubic meters
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        DEFAULT_DIMENSIONS
    }
}

/// Recorded visit counts, one sample per day, most recent last
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficHistory {
    pub daily_visits: Vec<u32>,
}

impl TrafficHistory {
    pub fn new(daily_visits: Vec<u32>) -> Self {
        Self { daily_visits }
    }

    pub fn sample_count(&self) -> usize {
        self.daily_visits.len()
    }

    /// Mean daily visits; None when no history exists
    pub fn mean_daily_visits(&self) -> Option<f64> {
        if self.daily_visits.is_empty() {
            return None;
        }
        let sum: u64 = self.daily_visits.iter().map(|&v| v as u64).sum();
        Some(sum as f64 / self.daily_visits.len() as f64)
    }
}

/// Outcome of the registry's verification review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    Unverified,
}

/// Everything the valuation engine knows about a space
///
/// Every field has a documented neutral default so valuation can always
/// produce an estimate, even for sparsely-described spaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceAttributes {
    pub dimensions: Dimensions,
    pub room_count: u32,
    pub object_count: u32,
    pub style: StyleCategory,
    pub feature_tags: Vec<String>,
    pub traffic: TrafficHistory,
    pub location: Option<LocationProfile>,
    pub verification: Option<VerificationStatus>,
}

impl SpaceAttributes {
    /// Minimal attributes: a styled shell with every other field defaulted
    pub fn with_style(style: StyleCategory) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// True only when the registry has positively verified the space
    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Some(VerificationStatus::Verified))
    }
}

impl Default for SpaceAttributes {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            room_count: DEFAULT_ROOM_COUNT,
            object_count: DEFAULT_OBJECT_COUNT,
            style: StyleCategory::default(),
            feature_tags: Vec::new(),
            traffic: TrafficHistory::default(),
            location: None,
            verification: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_neutrals() {
        let attrs = SpaceAttributes::default();
        assert_eq!(attrs.dimensions.volume(), 100.0 * 50.0 * 100.0);
        assert_eq!(attrs.room_count, 3);
        assert_eq!(attrs.object_count, 20);
        assert_eq!(attrs.style, StyleCategory::Modern);
        assert!(attrs.location.is_none());
        assert!(!attrs.is_verified());
    }

    #[test]
    fn empty_traffic_has_no_mean() {
        assert_eq!(TrafficHistory::default().mean_daily_visits(), None);
        let traffic = TrafficHistory::new(vec![10, 20, 30]);
        assert_eq!(traffic.mean_daily_visits(), Some(20.0));
    }
}
