use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Declined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckinStatus {
    #[default]
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Declined => "declined",
        }
    }

    /// Owner-driven moves. Nothing leads back to `pending`, and `declined` and
    /// `cancelled` are final.
    pub fn can_become(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Declined) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }

    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, Error> {
        if self.can_become(next) {
            Ok(next)
        } else {
            Err(Error::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Whether a booking in this status still holds its dates.
    pub fn blocks_room(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    /// Whether moving into this status may give the room back.
    pub fn releases_room(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Declined)
    }
}

impl CheckinStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinStatus::NotCheckedIn => "not_checked_in",
            CheckinStatus::CheckedIn => "checked_in",
            CheckinStatus::CheckedOut => "checked_out",
        }
    }

    pub fn check_in(self, status: BookingStatus) -> Result<CheckinStatus, Error> {
        if status != BookingStatus::Confirmed {
            return Err(Error::NotConfirmed);
        }
        match self {
            CheckinStatus::NotCheckedIn => Ok(CheckinStatus::CheckedIn),
            CheckinStatus::CheckedIn => Err(Error::AlreadyCheckedIn),
            CheckinStatus::CheckedOut => Err(Error::InvalidTransition {
                from: self.to_string(),
                to: CheckinStatus::CheckedIn.to_string(),
            }),
        }
    }

    pub fn check_out(self) -> Result<CheckinStatus, Error> {
        match self {
            CheckinStatus::CheckedIn => Ok(CheckinStatus::CheckedOut),
            _ => Err(Error::NotCheckedIn),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CheckinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "declined" => Ok(BookingStatus::Declined),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl FromStr for CheckinStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_checked_in" => Ok(CheckinStatus::NotCheckedIn),
            "checked_in" => Ok(CheckinStatus::CheckedIn),
            "checked_out" => Ok(CheckinStatus::CheckedOut),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}
