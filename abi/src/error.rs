use std::mem;

use thiserror::Error;

/// SQLSTATE raised by the `gbookings` exclusion constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid date format, expected YYYY-MM-DD")]
    InvalidDateFormat,

    #[error("Check-out date must be after check-in date")]
    InvalidDateRange,

    #[error("Check-in date cannot be in the past")]
    PastCheckIn,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Room has an invalid price")]
    InvalidRoomPrice,

    #[error("Room is not available for the selected dates")]
    RoomUnavailable,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Cannot change booking from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Booking must be confirmed before check-in")]
    NotConfirmed,

    #[error("Guest has already checked in")]
    AlreadyCheckedIn,

    #[error("Guest has not checked in")]
    NotCheckedIn,

    #[error("Missing required parameters")]
    MissingParameters,

    #[error("No rooms found for this property")]
    NoRoomsForProperty,

    #[error("Failed to update booking")]
    UpdateFailed,

    #[error("Invalid request: {0}")]
    InvalidPayload(String),

    #[error("Failed to read configuration file")]
    ConfigReadError,

    #[error("Failed to parse configuration file")]
    ConfigParseError,

    #[error("Database error")]
    DbError(sqlx::Error),

    #[error("Internal server error")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err)
                if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) =>
            {
                Error::RoomUnavailable
            }
            sqlx::Error::RowNotFound => Error::BookingNotFound,
            _ => Error::DbError(e),
        }
    }
}

// database errors carry no comparable payload; they only match each other
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidStatus(a), Self::InvalidStatus(b)) => a == b,
            (
                Self::InvalidTransition { from: f1, to: t1 },
                Self::InvalidTransition { from: f2, to: t2 },
            ) => f1 == f2 && t1 == t2,
            (Self::InvalidPayload(a), Self::InvalidPayload(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (a, b) => mem::discriminant(a) == mem::discriminant(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_should_map_to_booking_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err, Error::BookingNotFound);
    }

    #[test]
    fn other_sqlx_errors_should_stay_db_errors() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err, Error::DbError(sqlx::Error::PoolClosed));
        assert_ne!(err, Error::UpdateFailed);
    }

    #[test]
    fn payload_variants_should_compare_payloads() {
        assert_eq!(
            Error::InvalidStatus("done".into()),
            Error::InvalidStatus("done".into())
        );
        assert_ne!(
            Error::InvalidStatus("done".into()),
            Error::InvalidStatus("gone".into())
        );
        assert_ne!(
            Error::InvalidTransition {
                from: "confirmed".into(),
                to: "declined".into()
            },
            Error::InvalidTransition {
                from: "declined".into(),
                to: "confirmed".into()
            }
        );
    }
}
