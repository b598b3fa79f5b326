use abi::{
  format_price, parse_room_price, AvailabilityQuery, Booking, BookingDetail, BookingId,
  BookingRequest, BookingStatus, CheckinStatus, DateWindow, Error, PropertyId, RoomId, TravellerId,
};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, error, info, instrument, warn};

use crate::{BookingManager, Bookings};

const DETAIL_SELECT: &str = "SELECT b.id, b.traveller_id, b.property_id, b.room_id, b.check_in, \
  b.check_out, b.status, b.checkin_status, b.total_price, r.name AS room_name, \
  r.price::text AS price_per_night \
  FROM gbookings b LEFT JOIN rooms r ON r.id = b.room_id AND r.property_id = b.property_id";

#[async_trait]
impl Bookings for BookingManager {
  #[instrument(skip(self, req), fields(room_id = ?req.room_id))]
  async fn create(&self, req: BookingRequest) -> Result<Booking, Error> {
    let new = req.validate(self.today())?;

    let mut tx = self.pool.begin().await?;

    // the room row lock serializes concurrent creates for the same room, so
    // the overlap check below cannot race with another insert
    let price: Option<String> = sqlx::query_scalar(
      "SELECT price::text FROM rooms WHERE id = $1 AND property_id = $2 FOR UPDATE",
    )
    .bind(new.room_id)
    .bind(new.property_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::RoomNotFound)?;
    let price = parse_room_price(price.as_deref())?;

    if let Some(existing) = find_conflict(&mut tx, new.room_id, &new.window).await? {
      debug!(existing, "room already booked for an overlapping window");
      return Err(Error::RoomUnavailable);
    }

    let booking: Booking = sqlx::query_as(
      "INSERT INTO gbookings (traveller_id, property_id, room_id, check_in, check_out, status, checkin_status, total_price) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(&new.traveller_id)
    .bind(new.property_id)
    .bind(new.room_id)
    .bind(new.window.start)
    .bind(new.window.end)
    .bind(BookingStatus::Pending.as_str())
    .bind(CheckinStatus::NotCheckedIn.as_str())
    .bind(format_price(new.total_price(price)))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(booking_id = booking.id, total_price = booking.total_price, "booking created");
    Ok(booking)
  }

  async fn list(&self) -> Result<Vec<BookingDetail>, Error> {
    let bookings = sqlx::query_as(&format!("{DETAIL_SELECT} ORDER BY b.id"))
      .fetch_all(&self.pool)
      .await?;
    Ok(bookings)
  }

  async fn get(&self, id: BookingId) -> Result<BookingDetail, Error> {
    sqlx::query_as(&format!("{DETAIL_SELECT} WHERE b.id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or(Error::BookingNotFound)
  }

  async fn list_by_property(&self, property_id: PropertyId) -> Result<Vec<BookingDetail>, Error> {
    let bookings = sqlx::query_as(&format!("{DETAIL_SELECT} WHERE b.property_id = $1 ORDER BY b.id"))
      .bind(property_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(bookings)
  }

  async fn list_by_traveller(&self, traveller_id: TravellerId) -> Result<Vec<BookingDetail>, Error> {
    let bookings = sqlx::query_as(&format!("{DETAIL_SELECT} WHERE b.traveller_id = $1 ORDER BY b.id"))
      .bind(traveller_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(bookings)
  }

  async fn check_availability(&self, query: AvailabilityQuery) -> Result<Vec<RoomId>, Error> {
    let (property_id, window) = query.validate()?;

    let rooms: Vec<RoomId> = sqlx::query_scalar("SELECT id FROM rooms WHERE property_id = $1")
      .bind(property_id)
      .fetch_all(&self.pool)
      .await?;
    if rooms.is_empty() {
      return Err(Error::NoRoomsForProperty);
    }

    let unavailable = sqlx::query_scalar(
      "SELECT DISTINCT room_id FROM gbookings \
       WHERE room_id = ANY($1) AND status <> 'cancelled' AND check_in < $3 AND check_out > $2 \
       ORDER BY room_id",
    )
    .bind(&rooms)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&self.pool)
    .await?;
    Ok(unavailable)
  }

  #[instrument(skip(self))]
  async fn update_status(&self, id: BookingId, status: BookingStatus) -> Result<Booking, Error> {
    let today = self.today();
    let mut tx = self.pool.begin().await.map_err(rolled_back)?;

    let booking = lock_booking(&mut tx, id).await.map_err(rolled_back)?;
    booking.status.transition(status).map_err(|e| {
      warn!(from = %booking.status, to = %status, "rejected status change");
      e
    })?;

    let booking: Booking = sqlx::query_as("UPDATE gbookings SET status = $1 WHERE id = $2 RETURNING *")
      .bind(status.as_str())
      .bind(id)
      .fetch_one(&mut *tx)
      .await
      .map_err(rolled_back)?;

    if status == BookingStatus::Confirmed {
      set_room_available(&mut tx, booking.room_id, false).await.map_err(rolled_back)?;
    } else if status.releases_room() {
      release_room(&mut tx, &booking, today).await.map_err(rolled_back)?;
    }

    tx.commit().await.map_err(rolled_back)?;

    info!(booking_id = id, %status, "booking status updated");
    Ok(booking)
  }

  #[instrument(skip(self))]
  async fn check_in(&self, id: BookingId) -> Result<Booking, Error> {
    let mut tx = self.pool.begin().await.map_err(rolled_back)?;

    let booking = lock_booking(&mut tx, id).await.map_err(rolled_back)?;
    let next = booking.checkin_status.check_in(booking.status)?;

    let booking = set_checkin_status(&mut tx, id, next).await.map_err(rolled_back)?;
    tx.commit().await.map_err(rolled_back)?;

    info!(booking_id = id, "guest checked in");
    Ok(booking)
  }

  #[instrument(skip(self))]
  async fn check_out(&self, id: BookingId) -> Result<Booking, Error> {
    let today = self.today();
    let mut tx = self.pool.begin().await.map_err(rolled_back)?;

    let booking = lock_booking(&mut tx, id).await.map_err(rolled_back)?;
    let next = booking.checkin_status.check_out()?;

    let booking = set_checkin_status(&mut tx, id, next).await.map_err(rolled_back)?;
    let released = release_room(&mut tx, &booking, today).await.map_err(rolled_back)?;
    tx.commit().await.map_err(rolled_back)?;

    info!(booking_id = id, released, "guest checked out");
    Ok(booking)
  }
}

impl BookingManager {
  pub fn new(pool: PgPool) -> Self {
    Self::with_clock(pool, local_today)
  }

  /// `today` decides which check-ins are in the past and which confirmed
  /// bookings still hold their room.
  pub fn with_clock(pool: PgPool, today: fn() -> NaiveDate) -> Self {
    Self { pool, today }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  fn today(&self) -> NaiveDate {
    (self.today)()
  }
}

fn local_today() -> NaiveDate {
  Local::now().date_naive()
}

/// Database failures inside a state-changing transaction are reported as a
/// generic update failure; the transaction is rolled back when dropped.
fn rolled_back(e: impl Into<Error>) -> Error {
  match e.into() {
    Error::DbError(e) => {
      error!("booking transaction rolled back: {e}");
      Error::UpdateFailed
    }
    e => e,
  }
}

async fn find_conflict(
  conn: &mut PgConnection,
  room_id: RoomId,
  window: &DateWindow,
) -> Result<Option<BookingId>, Error> {
  let id = sqlx::query_scalar(
    "SELECT id FROM gbookings \
     WHERE room_id = $1 AND status <> 'cancelled' AND check_in < $3 AND check_out > $2 \
     LIMIT 1",
  )
  .bind(room_id)
  .bind(window.start)
  .bind(window.end)
  .fetch_optional(&mut *conn)
  .await?;
  Ok(id)
}

async fn lock_booking(conn: &mut PgConnection, id: BookingId) -> Result<Booking, Error> {
  sqlx::query_as("SELECT * FROM gbookings WHERE id = $1 FOR UPDATE")
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(Error::BookingNotFound)
}

async fn set_checkin_status(
  conn: &mut PgConnection,
  id: BookingId,
  status: CheckinStatus,
) -> Result<Booking, Error> {
  let booking = sqlx::query_as("UPDATE gbookings SET checkin_status = $1 WHERE id = $2 RETURNING *")
    .bind(status.as_str())
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
  Ok(booking)
}

async fn set_room_available(conn: &mut PgConnection, room_id: RoomId, available: bool) -> Result<(), Error> {
  sqlx::query("UPDATE rooms SET available = $1 WHERE id = $2")
    .bind(available)
    .bind(room_id)
    .execute(&mut *conn)
    .await?;
  Ok(())
}

/// Marks the room available unless another confirmed booking still has a
/// check-out after `today`. Returns whether the room was released.
async fn release_room(conn: &mut PgConnection, booking: &Booking, today: NaiveDate) -> Result<bool, Error> {
  let still_held: bool = sqlx::query_scalar(
    "SELECT EXISTS (SELECT 1 FROM gbookings \
     WHERE room_id = $1 AND id <> $2 AND status = 'confirmed' AND check_out > $3)",
  )
  .bind(booking.room_id)
  .bind(booking.id)
  .bind(today)
  .fetch_one(&mut *conn)
  .await?;

  if still_held {
    debug!(room_id = booking.room_id, "room still held by another confirmed booking");
    return Ok(false);
  }
  set_room_available(conn, booking.room_id, true).await?;
  Ok(true)
}
