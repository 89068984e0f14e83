//! Year selection
//!
//! The dashboard is parameterized by a single year. `Year` can only be
//! constructed inside the inclusive range covered by the dataset, so a
//! stored selection is always valid.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated dataset year in `[Year::MIN, Year::MAX]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "u16")]
pub struct Year(u16);

impl Year {
    /// First year covered by the dataset
    pub const MIN: u16 = 2015;
    /// Last year covered by the dataset
    pub const MAX: u16 = 2024;

    /// Validate and wrap a year
    pub fn new(year: i32) -> Result<Self> {
        if year < i32::from(Self::MIN) || year > i32::from(Self::MAX) {
            return Err(Error::YearOutOfRange {
                year,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(year as u16))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// All selectable years, oldest first
    pub fn all() -> impl Iterator<Item = Year> {
        (Self::MIN..=Self::MAX).map(Year)
    }
}

impl Default for Year {
    /// Static default used until the available-years data says otherwise
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i32> for Year {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Year::new(value)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> u16 {
        year.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(Year::new(2015).unwrap().get(), 2015);
        assert_eq!(Year::new(2024).unwrap().get(), 2024);
        assert!(Year::new(2014).is_err());
        assert!(Year::new(2025).is_err());
    }

    #[test]
    fn test_out_of_range_error_carries_value() {
        match Year::new(2030) {
            Err(Error::YearOutOfRange { year, min, max }) => {
                assert_eq!(year, 2030);
                assert_eq!(min, 2015);
                assert_eq!(max, 2024);
            }
            other => panic!("Expected YearOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_default_is_latest_year() {
        assert_eq!(Year::default().get(), 2024);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let year: Year = serde_json::from_str("2019").unwrap();
        assert_eq!(year.get(), 2019);
        assert_eq!(serde_json::to_string(&year).unwrap(), "2019");
        assert!(serde_json::from_str::<Year>("1999").is_err());
    }

    #[test]
    fn test_all_covers_range() {
        let years: Vec<u16> = Year::all().map(Year::get).collect();
        assert_eq!(years.len(), 10);
        assert_eq!(years.first(), Some(&2015));
        assert_eq!(years.last(), Some(&2024));
    }
}
