use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Lifecycle states of a booking. Stored in the database as the uppercase
/// string form (`PENDING`, `CHECKED_IN`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    /// Legal edges of the lifecycle. Everything not listed here is rejected;
    /// a booking is never moved back to an earlier state.
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Confirmed, CheckedIn)
                | (CheckedIn, CheckedOut)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
        )
    }

    /// Validates the edge and returns the new state, or
    /// `InvalidStateTransition` for any move the table does not allow.
    pub fn transition_to(self, target: BookingStatus) -> Result<BookingStatus, BookingError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(BookingError::InvalidStateTransition {
                from: self,
                to: target,
            })
        }
    }

    /// Whether a booking in this state occupies its room for availability
    /// purposes. Only confirmed and checked-in stays hold a room.
    pub fn holds_room(self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::CheckedIn)
    }

    /// True when moving to `target` newly takes the room out of the
    /// availability pool. Such a move must re-verify that no other holding
    /// booking overlaps the stay before it is persisted.
    pub fn begins_hold(self, target: BookingStatus) -> bool {
        !self.holds_room() && target.holds_room()
    }

    /// The status values that block availability, in storage form.
    pub const HOLDING: [&'static str; 2] = ["CONFIRMED", "CHECKED_IN"];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::CheckedIn => "CHECKED_IN",
            BookingStatus::CheckedOut => "CHECKED_OUT",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CHECKED_IN" => Ok(BookingStatus::CheckedIn),
            "CHECKED_OUT" => Ok(BookingStatus::CheckedOut),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "NO_SHOW" => Ok(BookingStatus::NoShow),
            other => Err(BookingError::validation(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;
    use super::*;

    const ALL: [BookingStatus; 6] = [Pending, Confirmed, CheckedIn, CheckedOut, Cancelled, NoShow];

    #[test]
    fn happy_path_transitions_are_legal() {
        assert_eq!(Pending.transition_to(Confirmed), Ok(Confirmed));
        assert_eq!(Confirmed.transition_to(CheckedIn), Ok(CheckedIn));
        assert_eq!(CheckedIn.transition_to(CheckedOut), Ok(CheckedOut));
    }

    #[test]
    fn cancellation_is_legal_from_pending_and_confirmed_only() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!CheckedIn.can_transition_to(Cancelled));
        assert!(!CheckedOut.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn no_show_only_from_confirmed() {
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(!Pending.can_transition_to(NoShow));
        assert!(!CheckedIn.can_transition_to(NoShow));
    }

    #[test]
    fn pending_cannot_skip_to_checked_out() {
        assert_eq!(
            Pending.transition_to(CheckedOut),
            Err(BookingError::InvalidStateTransition {
                from: Pending,
                to: CheckedOut,
            })
        );
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for terminal in [CheckedOut, Cancelled, NoShow] {
            for target in ALL {
                assert!(
                    !terminal.can_transition_to(target),
                    "{terminal} -> {target} should be illegal"
                );
            }
        }
    }

    #[test]
    fn confirming_a_pending_booking_begins_a_hold() {
        assert!(Pending.begins_hold(Confirmed));
    }

    #[test]
    fn moves_between_holding_states_do_not_begin_a_hold() {
        assert!(!Confirmed.begins_hold(CheckedIn));
    }

    #[test]
    fn moves_out_of_or_outside_the_pool_never_begin_a_hold() {
        for status in ALL {
            assert!(!status.begins_hold(Cancelled));
            assert!(!status.begins_hold(CheckedOut));
            assert!(!status.begins_hold(NoShow));
            assert!(!status.begins_hold(Pending));
        }
    }

    #[test]
    fn only_confirmed_and_checked_in_hold_a_room() {
        for status in ALL {
            assert_eq!(status.holds_room(), matches!(status, Confirmed | CheckedIn));
        }
    }

    #[test]
    fn storage_form_round_trips() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        assert!("SOMETHING_ELSE".parse::<BookingStatus>().is_err());
    }
}
