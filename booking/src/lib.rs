mod manager;

use abi::{
    AvailabilityQuery, Booking, BookingDetail, BookingId, BookingRequest, BookingStatus, Error,
    PropertyId, RoomId, TravellerId,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct BookingManager {
    pool: PgPool,
    today: fn() -> NaiveDate,
}

#[async_trait]
pub trait Bookings {
    /// make a booking for one room; it starts out `pending`
    async fn create(&self, req: BookingRequest) -> Result<Booking, Error>;
    /// all bookings with their room details
    async fn list(&self) -> Result<Vec<BookingDetail>, Error>;
    /// get a booking by id
    async fn get(&self, id: BookingId) -> Result<BookingDetail, Error>;
    /// bookings of every room in a property
    async fn list_by_property(&self, property_id: PropertyId) -> Result<Vec<BookingDetail>, Error>;
    /// bookings made by one traveller
    async fn list_by_traveller(&self, traveller_id: TravellerId) -> Result<Vec<BookingDetail>, Error>;
    /// rooms of the property that are taken for (part of) the window
    async fn check_availability(&self, query: AvailabilityQuery) -> Result<Vec<RoomId>, Error>;
    /// owner decision on a booking, keeps the room's `available` flag in sync
    async fn update_status(&self, id: BookingId, status: BookingStatus) -> Result<Booking, Error>;
    /// guest arrives; booking must be confirmed
    async fn check_in(&self, id: BookingId) -> Result<Booking, Error>;
    /// guest leaves; the room is released unless another confirmed booking still holds it
    async fn check_out(&self, id: BookingId) -> Result<Booking, Error>;
}
