//! The availability service: two month queries and one toggle mutation.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::UnavailabilityEntry;
use crate::store::AvailabilityStore;

/// Canonical marker date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn first_of_month(months_since_year_zero: i64) -> Option<NaiveDate> {
    let year = i32::try_from(months_since_year_zero.div_euclid(12)).ok()?;
    let month = months_since_year_zero.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// First and last day of the zero-based `month` of `year`.
///
/// Out-of-range month indexes roll over the way JavaScript `Date`
/// arithmetic resolves them: month 12 is January of the following year,
/// month -1 is December of the preceding one.
pub fn month_bounds(year: i32, month: i32) -> Result<(NaiveDate, NaiveDate)> {
    let months = i64::from(year) * 12 + i64::from(month);
    let first = first_of_month(months);
    let last = first_of_month(months + 1).and_then(|day| day.pred_opt());
    match (first, last) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(Error::InvalidDate(format!("year {year}, month {month}"))),
    }
}

/// Parse a marker date, rejecting anything but the canonical fixed-width
/// `YYYY-MM-DD` form.
pub fn parse_marker_date(raw: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(raw.to_string()))?;
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(Error::InvalidDate(raw.to_string()));
    }
    Ok(date)
}

/// Every user's effectively-unavailable markers for the month, enriched
/// with the owner's display name.
pub async fn get_unavailability_for_month(
    store: &AvailabilityStore,
    year: i32,
    month: i32,
) -> Result<Vec<UnavailabilityEntry>> {
    let (first, last) = month_bounds(year, month)?;
    store
        .markers_in_range(
            &first.format(DATE_FORMAT).to_string(),
            &last.format(DATE_FORMAT).to_string(),
        )
        .await
}

/// The caller's unavailable dates for the month. Unauthenticated callers
/// get an empty overlay, not an error.
pub async fn get_current_user_unavailability(
    store: &AvailabilityStore,
    caller: Option<&str>,
    year: i32,
    month: i32,
) -> Result<Vec<String>> {
    let Some(user_id) = caller else {
        return Ok(Vec::new());
    };

    let (first, last) = month_bounds(year, month)?;
    store
        .user_dates_in_range(
            user_id,
            &first.format(DATE_FORMAT).to_string(),
            &last.format(DATE_FORMAT).to_string(),
        )
        .await
}

/// Flip the caller's marker for one date and return the post-toggle
/// unavailable state.
pub async fn toggle_unavailability(
    store: &AvailabilityStore,
    caller: Option<&str>,
    date: &str,
) -> Result<bool> {
    let user_id = caller.ok_or(Error::NotAuthenticated)?;
    let date = parse_marker_date(date)?;

    let unavailable = store
        .toggle(user_id, &date.format(DATE_FORMAT).to_string())
        .await?;

    info!(user_id, date = %date, unavailable, "availability toggled");
    Ok(unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn leap_year_february_bounds() {
        assert_eq!(
            month_bounds(2024, 1).unwrap(),
            (ymd(2024, 2, 1), ymd(2024, 2, 29))
        );
    }

    #[test]
    fn common_year_february_bounds() {
        assert_eq!(
            month_bounds(2023, 1).unwrap(),
            (ymd(2023, 2, 1), ymd(2023, 2, 28))
        );
    }

    #[test]
    fn december_bounds() {
        assert_eq!(
            month_bounds(2024, 11).unwrap(),
            (ymd(2024, 12, 1), ymd(2024, 12, 31))
        );
    }

    #[test]
    fn month_index_rolls_forward() {
        assert_eq!(
            month_bounds(2024, 12).unwrap(),
            (ymd(2025, 1, 1), ymd(2025, 1, 31))
        );
        assert_eq!(
            month_bounds(2024, 25).unwrap(),
            (ymd(2026, 2, 1), ymd(2026, 2, 28))
        );
    }

    #[test]
    fn month_index_rolls_backward() {
        assert_eq!(
            month_bounds(2024, -1).unwrap(),
            (ymd(2023, 12, 1), ymd(2023, 12, 31))
        );
    }

    #[test]
    fn unrepresentable_months_are_rejected() {
        assert!(month_bounds(i32::MAX, 0).is_err());
    }

    #[test]
    fn canonical_dates_parse() {
        assert_eq!(parse_marker_date("2024-03-05").unwrap(), ymd(2024, 3, 5));
        assert_eq!(parse_marker_date("2024-02-29").unwrap(), ymd(2024, 2, 29));
    }

    #[test]
    fn non_canonical_dates_are_rejected() {
        for raw in [
            "2024-3-5",
            "05-03-2024",
            "2024/03/05",
            "2024-02-30",
            "2023-02-29",
            "2024-13-01",
            "2024-03-15T00:00:00Z",
            "",
        ] {
            assert!(parse_marker_date(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
