use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open stay `[start, end)`: the check-out day is free for the next guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if start >= end {
            return Err(Error::InvalidDateRange);
        }
        Ok(Self { start, end })
    }

    /// Parse both ends before comparing them, so a bad check-out is reported
    /// as a format error even when check-in is already later.
    pub fn parse(start: &str, end: &str) -> Result<Self, Error> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::new(start, end)
    }

    pub fn overlaps(&self, other: &DateWindow) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days().abs()
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDateFormat)
}
