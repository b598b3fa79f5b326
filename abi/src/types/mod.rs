mod booking;
mod status;
mod window;

pub use booking::*;
pub use status::*;
pub use window::*;
