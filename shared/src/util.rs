use chrono::{DateTime, Months, Utc};

/// End of a one-year subscription starting at `start`
///
/// Calendar arithmetic: 29 February maps to 28 February of the next year.
pub fn one_year_after(start: DateTime<Utc>) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(12))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// `dd/mm/yyyy`, the date format printed on cards and emails
pub fn format_date_fr(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn one_year_after_regular_date() {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let end = one_year_after(start);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn one_year_after_leap_day() {
        let start = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let end = one_year_after(start);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn french_date_format() {
        let date = Utc.with_ymd_and_hms(2025, 7, 4, 0, 0, 0).unwrap();
        assert_eq!(format_date_fr(date), "04/07/2025");
    }
}
