// Domain rules for the booking engine: status lifecycle, stay dates,
// price snapshots and booking codes. No I/O lives here; the service
// crate wires these rules to the database and the HTTP surface.

pub mod code;
pub mod error;
pub mod pricing;
pub mod status;
pub mod stay;

pub use code::generate_booking_code;
pub use error::BookingError;
pub use pricing::total_price;
pub use status::BookingStatus;
pub use stay::StayRange;
