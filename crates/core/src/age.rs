//! Age calculator.

use chrono::{Datelike, NaiveDate};

/// Returns the age in whole calendar months of someone born on `birth_date`, as of
/// `reference_date`.
///
/// Only the year and month fields take part: the day of month is ignored, so a child born on
/// 31 January is one month old on 1 February. The result is negative when `reference_date`
/// precedes `birth_date`; it is not clamped.
pub fn age_in_months(birth_date: NaiveDate, reference_date: NaiveDate) -> i32 {
    let years = reference_date.year() - birth_date.year();
    let months = reference_date.month() as i32 - birth_date.month() as i32;
    years * 12 + months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn test_same_day_is_zero() {
        let birth = date(2023, 6, 15);
        assert_eq!(age_in_months(birth, birth), 0);
    }

    #[test]
    fn test_day_of_month_is_ignored() {
        assert_eq!(age_in_months(date(2020, 1, 31), date(2020, 2, 1)), 1);
        assert_eq!(age_in_months(date(2020, 1, 1), date(2020, 1, 31)), 0);
    }

    #[test]
    fn test_crosses_year_boundary() {
        assert_eq!(age_in_months(date(2022, 11, 10), date(2024, 2, 3)), 15);
    }

    #[test]
    fn test_leap_day_birth() {
        assert_eq!(age_in_months(date(2020, 2, 29), date(2021, 2, 28)), 12);
    }

    #[test]
    fn test_reference_before_birth_is_negative() {
        assert_eq!(age_in_months(date(2024, 5, 1), date(2024, 2, 20)), -3);
    }
}
