//! Geographic points normalized to a fixed resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point scale for coordinates: one unit is 1e-6 degrees.
pub const COORD_SCALE: f64 = 1e6;

/// A geographic point, rounded to 1e-6 degrees at construction.
///
/// Coordinates are stored as integer micro-degrees, so two measurements
/// "at the same place" compare and hash equal regardless of the
/// floating-point noise in the values they were parsed from.
///
/// Serialized as `{"latitude": f64, "longitude": f64}`.
///
/// # Examples
///
/// ```
/// use survey_core::Location;
///
/// let a = Location::new(42.360_081_2, -71.058_880_4);
/// let b = Location::new(42.360_080_9, -71.058_880_1);
/// assert_eq!(a, b);
/// assert_eq!(a.latitude(), 42.360081);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawLocation", into = "RawLocation")]
pub struct Location {
    lat_e6: i64,
    lon_e6: i64,
}

impl Location {
    /// Build a location from degrees, rounding each axis to 1e-6.
    ///
    /// Non-finite inputs saturate (NaN maps to zero) rather than panic;
    /// loaders reject them before they reach this point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_e6: to_fixed(latitude),
            lon_e6: to_fixed(longitude),
        }
    }

    /// Build a location directly from micro-degree coordinates.
    pub const fn from_micro_degrees(lat_e6: i64, lon_e6: i64) -> Self {
        Self { lat_e6, lon_e6 }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.lat_e6 as f64 / COORD_SCALE
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.lon_e6 as f64 / COORD_SCALE
    }

    /// Latitude and longitude in micro-degrees.
    pub fn micro_degrees(&self) -> (i64, i64) {
        (self.lat_e6, self.lon_e6)
    }
}

fn to_fixed(degrees: f64) -> i64 {
    (degrees * COORD_SCALE).round() as i64
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({:.6}, {:.6})", self.latitude(), self.longitude())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude(), self.longitude())
    }
}

/// Wire form of [`Location`].
#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

impl From<RawLocation> for Location {
    fn from(raw: RawLocation) -> Self {
        Location::new(raw.latitude, raw.longitude)
    }
}

impl From<Location> for RawLocation {
    fn from(loc: Location) -> Self {
        RawLocation {
            latitude: loc.latitude(),
            longitude: loc.longitude(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn rounds_to_micro_degrees() {
        let loc = Location::new(1.000_000_4, -2.000_000_6);
        assert_eq!(loc.micro_degrees(), (1_000_000, -2_000_001));
    }

    #[test]
    fn noise_below_resolution_hashes_equal() {
        let mut set = HashSet::new();
        set.insert(Location::new(37.774_929_1, -122.419_415_9));
        set.insert(Location::new(37.774_929_0, -122.419_416_0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn deserialize_normalizes() {
        let loc: Location =
            serde_json::from_str(r#"{"latitude": 10.123456789, "longitude": 20.5}"#).unwrap();
        assert_eq!(loc, Location::new(10.123457, 20.5));
    }

    #[test]
    fn serialize_uses_degrees() {
        let json = serde_json::to_string(&Location::new(1.5, -0.25)).unwrap();
        assert_eq!(json, r#"{"latitude":1.5,"longitude":-0.25}"#);
    }

    #[test]
    fn nan_saturates_to_zero() {
        let loc = Location::new(f64::NAN, 0.0);
        assert_eq!(loc.micro_degrees(), (0, 0));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            let once = Location::new(lat, lon);
            let twice = Location::new(once.latitude(), once.longitude());
            prop_assert_eq!(once, twice);
        }
    }
}
