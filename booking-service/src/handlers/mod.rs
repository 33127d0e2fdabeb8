pub mod auth;
pub mod bookings;
pub mod cards;
pub mod hotels;
pub mod reviews;
pub mod rooms;
