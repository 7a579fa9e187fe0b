mod attributes;
mod location;
mod style;

pub use attributes::{Dimensions, SpaceAttributes, TrafficHistory, VerificationStatus};
pub use location::{AccessTier, LocationProfile, ZoneTraffic};
pub use style::StyleCategory;
