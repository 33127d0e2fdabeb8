use bigdecimal::{BigDecimal, RoundingMode};

use crate::stay::StayRange;

/// Total price for a stay: nightly rate times the number of nights, rounded
/// to currency precision (2 decimal places, half-up). The result is
/// snapshotted into the booking at creation time and never recomputed, even
/// if the room's rate changes later.
pub fn total_price(nightly_rate: &BigDecimal, stay: &StayRange) -> BigDecimal {
    let total = nightly_rate * BigDecimal::from(stay.nights());
    total.with_scale_round(2, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;

    use super::*;

    fn stay(from: (i32, u32, u32), to: (i32, u32, u32)) -> StayRange {
        StayRange::new(
            NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
        )
        .unwrap()
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn three_nights_at_100() {
        let total = total_price(&dec("100.00"), &stay((2024, 1, 1), (2024, 1, 4)));
        assert_eq!(total, dec("300.00"));
    }

    #[test]
    fn single_night() {
        let total = total_price(&dec("89.50"), &stay((2024, 6, 10), (2024, 6, 11)));
        assert_eq!(total, dec("89.50"));
    }

    #[test]
    fn fractional_rate_rounds_half_up() {
        // 33.335 * 3 = 100.005 -> 100.01
        let total = total_price(&dec("33.335"), &stay((2024, 1, 1), (2024, 1, 4)));
        assert_eq!(total, dec("100.01"));
    }

    #[test]
    fn result_always_has_currency_scale() {
        let total = total_price(&dec("120"), &stay((2024, 1, 1), (2024, 1, 3)));
        assert_eq!(total, dec("240.00"));
        assert_eq!(total.fractional_digit_count(), 2);
    }
}
