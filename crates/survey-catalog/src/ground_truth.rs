//! Reference values for resolving completed tasks.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use survey_core::{GroundTruthSource, Location, MeasurementKey};
use tracing::debug;

use crate::error::CatalogError;

/// Ground-truth table keyed by location and time.
///
/// Loaded from a JSON object whose keys are `"<time> <latitude> <longitude>"`
/// and whose values are the observed reference values. Coordinates are
/// normalized the same way catalog locations are.
///
/// # Examples
///
/// ```
/// use survey_catalog::GroundTruth;
/// use survey_core::{GroundTruthSource, Location, MeasurementKey};
///
/// let gt = GroundTruth::from_reader(r#"{"60 42.0 -71.0": 31.5}"#.as_bytes()).unwrap();
/// let key = MeasurementKey::new(Location::new(42.0, -71.0), 60);
/// assert_eq!(gt.lookup(&key), Some(31.5));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroundTruth {
    values: HashMap<MeasurementKey, f64>,
}

impl GroundTruth {
    /// Build a table from in-memory entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (MeasurementKey, f64)>) -> Self {
        Self {
            values: entries.into_iter().collect(),
        }
    }

    /// Parse a JSON ground-truth object.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let raw: HashMap<String, f64> = serde_json::from_reader(reader)?;
        let values = raw
            .into_iter()
            .map(|(key, value)| parse_key(&key).map(|k| (k, value)))
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { values })
    }

    /// Load a JSON ground-truth file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: Some(path.to_path_buf()),
            source,
        })?;
        let gt = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), entries = gt.len(), "loaded ground truth");
        Ok(gt)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl GroundTruthSource for GroundTruth {
    fn lookup(&self, key: &MeasurementKey) -> Option<f64> {
        self.values.get(key).copied()
    }
}

fn parse_key(key: &str) -> Result<MeasurementKey, CatalogError> {
    let malformed = || CatalogError::MalformedKey {
        key: key.to_string(),
    };
    let mut parts = key.split_whitespace();
    let (Some(time), Some(lat), Some(lon), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let time: i64 = time.parse().map_err(|_| malformed())?;
    let lat: f64 = lat.parse().map_err(|_| malformed())?;
    let lon: f64 = lon.parse().map_err(|_| malformed())?;
    if !lat.is_finite() || !lon.is_finite() {
        return Err(malformed());
    }
    Ok(MeasurementKey::new(Location::new(lat, lon), time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_key_coordinates() {
        let gt = GroundTruth::from_reader(r#"{"0 1.0000001 2.0": 7.0}"#.as_bytes()).unwrap();
        assert_eq!(
            gt.lookup(&MeasurementKey::untimed(Location::new(1.0, 2.0))),
            Some(7.0)
        );
    }

    #[test]
    fn miss_returns_none() {
        let gt = GroundTruth::from_reader(r#"{"5 1.0 2.0": 7.0}"#.as_bytes()).unwrap();
        assert_eq!(gt.lookup(&MeasurementKey::new(Location::new(1.0, 2.0), 6)), None);
        assert_eq!(gt.len(), 1);
    }

    #[test]
    fn rejects_malformed_keys() {
        for bad in [
            r#"{"1.0 2.0": 1}"#,
            r#"{"x 1.0 2.0": 1}"#,
            r#"{"1 a 2.0": 1}"#,
            r#"{"1 1.0 2.0 3": 1}"#,
            r#"{"1 NaN 2.0": 1}"#,
        ] {
            match GroundTruth::from_reader(bad.as_bytes()) {
                Err(CatalogError::MalformedKey { .. }) => {}
                other => panic!("expected MalformedKey for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn from_entries_builds_table() {
        let key = MeasurementKey::new(Location::new(3.0, 4.0), 9);
        let gt = GroundTruth::from_entries([(key, 1.25)]);
        assert_eq!(gt.lookup(&key), Some(1.25));
        assert!(!gt.is_empty());
    }
}
