mod config;
mod error;
mod types;

pub use config::*;
pub use error::Error;
pub use types::*;

pub type BookingId = i32;
pub type RoomId = i32;
pub type PropertyId = i32;
pub type TravellerId = String;
