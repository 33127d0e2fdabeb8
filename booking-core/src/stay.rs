use chrono::NaiveDate;

use crate::error::BookingError;

/// A validated stay: a half-open date interval `[check_in, check_out)`.
/// Construction fails with `InvalidRange` unless `check_in < check_out`,
/// so a `StayRange` always covers at least one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_in < check_out {
            Ok(StayRange {
                check_in,
                check_out,
            })
        } else {
            Err(BookingError::InvalidRange)
        }
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Whole-day length of the stay. Always >= 1 by construction.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Non-empty intersection of the half-open intervals. Back-to-back
    /// stays (one checks out the day the other checks in) do not overlap.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        !(other.check_out <= self.check_in || other.check_in >= self.check_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(from: (i32, u32, u32), to: (i32, u32, u32)) -> StayRange {
        StayRange::new(date(from.0, from.1, from.2), date(to.0, to.1, to.2)).unwrap()
    }

    #[test]
    fn zero_or_negative_stay_is_invalid() {
        let d = date(2024, 1, 1);
        assert_eq!(StayRange::new(d, d), Err(BookingError::InvalidRange));
        assert_eq!(
            StayRange::new(date(2024, 1, 5), d),
            Err(BookingError::InvalidRange)
        );
    }

    #[test]
    fn nights_counts_whole_days() {
        assert_eq!(range((2024, 1, 1), (2024, 1, 4)).nights(), 3);
        assert_eq!(range((2024, 1, 1), (2024, 1, 2)).nights(), 1);
        // across a month boundary
        assert_eq!(range((2024, 2, 28), (2024, 3, 2)).nights(), 3);
    }

    #[test]
    fn partial_overlaps_conflict() {
        let existing = range((2024, 3, 3), (2024, 3, 6));
        assert!(range((2024, 3, 1), (2024, 3, 5)).overlaps(&existing));
        assert!(range((2024, 3, 5), (2024, 3, 8)).overlaps(&existing));
    }

    #[test]
    fn containment_in_either_direction_conflicts() {
        let existing = range((2024, 3, 3), (2024, 3, 6));
        assert!(range((2024, 3, 4), (2024, 3, 5)).overlaps(&existing));
        assert!(range((2024, 3, 1), (2024, 3, 10)).overlaps(&existing));
        assert!(existing.overlaps(&existing));
    }

    #[test]
    fn back_to_back_stays_do_not_conflict() {
        let existing = range((2024, 3, 3), (2024, 3, 6));
        assert!(!range((2024, 3, 1), (2024, 3, 3)).overlaps(&existing));
        assert!(!range((2024, 3, 6), (2024, 3, 9)).overlaps(&existing));
    }

    #[test]
    fn disjoint_stays_do_not_conflict() {
        let existing = range((2024, 3, 3), (2024, 3, 6));
        assert!(!range((2024, 2, 1), (2024, 2, 5)).overlaps(&existing));
        assert!(!range((2024, 4, 1), (2024, 4, 5)).overlaps(&existing));
    }
}
