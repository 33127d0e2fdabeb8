use thiserror::Error;

use crate::status::BookingStatus;

/// Failure taxonomy for the booking engine. Every operation surfaces one of
/// these; nothing is retried automatically except booking-code regeneration,
/// which the factory handles itself.
#[derive(Debug, Error, PartialEq)]
pub enum BookingError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("check-out date must be strictly after check-in date")]
    InvalidRange,

    #[error("room is not available for the selected dates")]
    Conflict,

    #[error("cannot transition booking from {from} to {to}")]
    InvalidStateTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("{0}")]
    Validation(String),
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }
}
