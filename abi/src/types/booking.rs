use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::{
    BookingId, BookingStatus, CheckinStatus, DateWindow, Error, PropertyId, RoomId, TravellerId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub traveller_id: TravellerId,
    pub property_id: PropertyId,
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub checkin_status: CheckinStatus,
    pub total_price: f64,
}

/// A booking joined with the room it occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub room_name: Option<String>,
    /// Current room price; `total_price` keeps the price at booking time.
    pub price_per_night: Option<f64>,
    pub nights: i64,
}

/// Booking body as it arrives over the wire. Every field is optional so that
/// absence is reported as a domain error rather than a decoder message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub traveller_id: Option<String>,
    pub property_id: Option<PropertyId>,
    pub room_id: Option<RoomId>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// A request that passed boundary validation; the room checks still need the
/// database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub traveller_id: TravellerId,
    pub property_id: PropertyId,
    pub room_id: RoomId,
    pub window: DateWindow,
}

/// Query string of an availability check. `property_id` stays text so that an
/// empty value counts as missing instead of failing to decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub property_id: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

impl BookingRequest {
    pub fn new(
        traveller_id: impl Into<String>,
        property_id: PropertyId,
        room_id: RoomId,
        check_in: impl Into<String>,
        check_out: impl Into<String>,
    ) -> Self {
        Self {
            traveller_id: Some(traveller_id.into()),
            property_id: Some(property_id),
            room_id: Some(room_id),
            check_in: Some(check_in.into()),
            check_out: Some(check_out.into()),
        }
    }

    pub fn validate(&self, today: NaiveDate) -> Result<NewBooking, Error> {
        let (Some(traveller_id), Some(property_id), Some(room_id), Some(check_in), Some(check_out)) = (
            self.traveller_id.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            self.property_id,
            self.room_id,
            self.check_in.as_deref(),
            self.check_out.as_deref(),
        ) else {
            return Err(Error::MissingParameters);
        };

        let window = DateWindow::parse(check_in, check_out)?;
        if window.start < today {
            return Err(Error::PastCheckIn);
        }

        Ok(NewBooking {
            traveller_id: traveller_id.to_string(),
            property_id,
            room_id,
            window,
        })
    }
}

impl AvailabilityQuery {
    pub fn validate(&self) -> Result<(PropertyId, DateWindow), Error> {
        let (Some(property_id), Some(check_in), Some(check_out)) = (
            self.property_id.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            self.check_in.as_deref().filter(|s| !s.is_empty()),
            self.check_out.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(Error::MissingParameters);
        };
        let property_id = property_id.parse::<PropertyId>().map_err(|_| {
            Error::InvalidPayload(format!("property_id must be a number, got {property_id:?}"))
        })?;
        Ok((property_id, DateWindow::parse(check_in, check_out)?))
    }
}

impl StatusUpdate {
    pub fn validate(&self) -> Result<BookingStatus, Error> {
        match self.status.as_deref() {
            Some(status) => status.parse(),
            None => Err(Error::InvalidStatus(String::new())),
        }
    }
}

impl NewBooking {
    pub fn total_price(&self, price_per_night: f64) -> f64 {
        self.window.nights() as f64 * price_per_night
    }
}

impl Booking {
    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.check_in,
            end: self.check_out,
        }
    }

    pub fn nights(&self) -> i64 {
        self.window().nights()
    }
}

/// Room prices are stored as free text; only finite positive amounts are usable.
pub fn parse_room_price(raw: Option<&str>) -> Result<f64, Error> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or(Error::InvalidRoomPrice)
}

/// Text form written to `gbookings.total_price`.
pub fn format_price(price: f64) -> String {
    format!("{}", price)
}

fn decode_err(e: Error) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}

impl FromRow<'_, PgRow> for Booking {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let checkin_status: String = row.try_get("checkin_status")?;
        let total_price: String = row.try_get("total_price")?;

        Ok(Self {
            id: row.try_get("id")?,
            traveller_id: row.try_get("traveller_id")?,
            property_id: row.try_get("property_id")?,
            room_id: row.try_get("room_id")?,
            check_in: row.try_get("check_in")?,
            check_out: row.try_get("check_out")?,
            status: status.parse().map_err(decode_err)?,
            checkin_status: checkin_status.parse().map_err(decode_err)?,
            total_price: total_price
                .trim()
                .parse()
                .map_err(|_| decode_err(Error::Internal(format!("bad total_price {total_price:?}"))))?,
        })
    }
}

impl FromRow<'_, PgRow> for BookingDetail {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let booking = Booking::from_row(row)?;
        let price: Option<String> = row.try_get("price_per_night")?;
        let nights = booking.nights();

        Ok(Self {
            room_name: row.try_get("room_name")?,
            price_per_night: parse_room_price(price.as_deref()).ok(),
            nights,
            booking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn request(check_in: &str, check_out: &str) -> BookingRequest {
        BookingRequest::new("auth0|tyr", 1, 5, check_in, check_out)
    }

    #[test]
    fn valid_request_should_pass() {
        let booking = request("2025-06-01", "2025-06-04").validate(today()).unwrap();
        assert_eq!(booking.traveller_id, "auth0|tyr");
        assert_eq!(booking.window.nights(), 3);
        assert_eq!(booking.total_price(1000.0), 3000.0);
    }

    #[test]
    fn missing_field_should_be_reported_first() {
        let mut req = request("bad", "2025-06-04");
        req.room_id = None;
        assert_eq!(req.validate(today()).unwrap_err(), Error::MissingParameters);

        let mut req = request("2025-06-01", "2025-06-04");
        req.traveller_id = Some("  ".into());
        assert_eq!(req.validate(today()).unwrap_err(), Error::MissingParameters);
    }

    #[test]
    fn validation_should_fail_in_order() {
        assert_eq!(
            request("2025-13-01", "2025-01-01").validate(today()).unwrap_err(),
            Error::InvalidDateFormat
        );
        // reversed and in the past: range is checked before the past
        assert_eq!(
            request("2025-01-05", "2025-01-01").validate(today()).unwrap_err(),
            Error::InvalidDateRange
        );
        assert_eq!(
            request("2025-06-01", "2025-06-01").validate(today()).unwrap_err(),
            Error::InvalidDateRange
        );
        assert_eq!(
            request("2025-05-19", "2025-05-21").validate(today()).unwrap_err(),
            Error::PastCheckIn
        );
    }

    #[test]
    fn check_in_today_should_be_allowed() {
        assert!(request("2025-05-20", "2025-05-21").validate(today()).is_ok());
    }

    #[test]
    fn room_price_should_be_positive_number() {
        assert_eq!(parse_room_price(Some("1000")).unwrap(), 1000.0);
        assert_eq!(parse_room_price(Some(" 89.50 ")).unwrap(), 89.5);
        for bad in [None, Some(""), Some("free"), Some("0"), Some("-10"), Some("NaN"), Some("inf")] {
            assert_eq!(parse_room_price(bad).unwrap_err(), Error::InvalidRoomPrice);
        }
    }

    #[test]
    fn price_text_should_drop_trailing_zeroes() {
        assert_eq!(format_price(3000.0), "3000");
        assert_eq!(format_price(268.5), "268.5");
    }

    #[test]
    fn availability_query_should_require_all_params() {
        let query = AvailabilityQuery {
            property_id: Some("1".into()),
            check_in: Some("2025-06-01".into()),
            check_out: None,
        };
        assert_eq!(query.validate().unwrap_err(), Error::MissingParameters);

        let query = AvailabilityQuery {
            check_out: Some("2025-06-03".into()),
            ..query
        };
        let (property_id, window) = query.validate().unwrap();
        assert_eq!(property_id, 1);
        assert_eq!(window.nights(), 2);
    }

    #[test]
    fn empty_property_id_should_count_as_missing() {
        let query = AvailabilityQuery {
            property_id: Some("".into()),
            check_in: Some("2025-06-01".into()),
            check_out: Some("2025-06-03".into()),
        };
        assert_eq!(query.validate().unwrap_err(), Error::MissingParameters);

        let query = AvailabilityQuery {
            property_id: Some("one".into()),
            ..query
        };
        assert!(matches!(query.validate(), Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn status_update_should_parse_known_status() {
        let update = StatusUpdate {
            status: Some("declined".into()),
        };
        assert_eq!(update.validate().unwrap(), BookingStatus::Declined);
        assert!(matches!(
            StatusUpdate::default().validate(),
            Err(Error::InvalidStatus(_))
        ));
    }

    #[test]
    fn detail_should_serialize_flat() {
        let detail = BookingDetail {
            booking: Booking {
                id: 7,
                traveller_id: "auth0|tyr".into(),
                property_id: 1,
                room_id: 5,
                check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                check_out: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
                status: BookingStatus::Pending,
                checkin_status: CheckinStatus::NotCheckedIn,
                total_price: 3000.0,
            },
            room_name: Some("Garden room".into()),
            price_per_night: Some(1000.0),
            nights: 3,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["check_in"], "2025-06-01");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["checkin_status"], "not_checked_in");
        assert_eq!(json["nights"], 3);
    }
}
