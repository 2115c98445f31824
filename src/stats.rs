//! Pure coverage statistics: percentage, threshold comparison, display
//! formatting.

use crate::error::{CovviewError, Result};
use crate::model::Class;

/// Coverage percentage from hit/miss counts. `None` when there is no data
/// at all; callers must treat that as "no coverage data", not 0% or 100%.
#[must_use]
pub fn percent(hits: usize, misses: usize) -> Option<f64> {
    let total = hits + misses;
    if total == 0 {
        None
    } else {
        Some(hits as f64 / total as f64 * 100.0)
    }
}

/// Coverage percentage of a single class.
#[must_use]
pub fn class_percent(class: &Class) -> Option<f64> {
    percent(class.hit_lines().len(), class.miss_lines().len())
}

/// Percentages are always displayed with two decimal digits.
#[must_use]
pub fn format_percent(p: f64) -> String {
    format!("{:.2}", p)
}

/// Validated minimum-coverage threshold. Values outside `[0, 100]` are a
/// configuration error, never silently clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumCoverage(f64);

impl MinimumCoverage {
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&value) {
            return Err(CovviewError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn meets(&self, percent: f64) -> bool {
        percent >= self.0
    }
}

impl Default for MinimumCoverage {
    fn default() -> Self {
        Self(80.0)
    }
}

impl<'de> serde::Deserialize<'de> for MinimumCoverage {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <f64 as serde::Deserialize>::deserialize(deserializer)?;
        MinimumCoverage::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_empty_is_none() {
        assert_eq!(percent(0, 0), None);
    }

    #[test]
    fn test_percent_values() {
        assert_eq!(percent(1, 1), Some(50.0));
        assert_eq!(percent(3, 0), Some(100.0));
        assert_eq!(percent(0, 4), Some(0.0));
    }

    #[test]
    fn test_percent_monotonic_in_hits() {
        // Adding a hit line while misses stay fixed never decreases the
        // percentage.
        for misses in 0..20 {
            let mut previous = -1.0;
            for hits in 1..20 {
                let p = percent(hits, misses).unwrap();
                assert!(p >= previous, "hits={hits} misses={misses}");
                previous = p;
            }
        }
    }

    #[test]
    fn test_format_percent_two_decimals() {
        assert_eq!(format_percent(50.0), "50.00");
        assert_eq!(format_percent(66.666), "66.67");
        assert_eq!(format_percent(100.0), "100.00");
    }

    #[test]
    fn test_minimum_default() {
        assert_eq!(MinimumCoverage::default().value(), 80.0);
    }

    #[test]
    fn test_minimum_rejects_out_of_range() {
        assert!(MinimumCoverage::new(-0.1).is_err());
        assert!(MinimumCoverage::new(100.1).is_err());
        assert!(MinimumCoverage::new(0.0).is_ok());
        assert!(MinimumCoverage::new(100.0).is_ok());
    }

    #[test]
    fn test_meets() {
        let min = MinimumCoverage::new(80.0).unwrap();
        assert!(min.meets(80.0));
        assert!(min.meets(99.9));
        assert!(!min.meets(79.99));
    }
}
