//! Local-day time window and clock formatting helpers.

use chrono::{DateTime, Duration, NaiveTime, TimeZone};

/// Returns the `[start-of-day, end-of-day]` bounds of the calendar day
/// containing `now`, in `now`'s timezone.
///
/// The end bound is `23:59:59.999`, matching an inclusive end-of-day query
/// window. On DST transition days where local midnight does not exist, the
/// earliest valid instant of the day is used.
pub fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    let tz = now.timezone();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);

    let start = tz
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| now.clone());
    let end = start.clone() + Duration::days(1) - Duration::milliseconds(1);

    (start, end)
}

/// Formats a datetime as `HH:mm` in its own timezone.
pub fn clock_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};

    #[test]
    fn bounds_cover_the_whole_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 6, 12, 15, 45, 0).unwrap();

        let (start, end) = day_bounds(&now);

        assert_eq!(start.to_rfc3339(), "2025-06-12T00:00:00+02:00");
        assert_eq!(end.date_naive(), now.date_naive());
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert!(start <= now && now <= end);
    }

    #[test]
    fn bounds_in_utc() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let (start, end) = day_bounds(&now);
        assert_eq!(start, now);
        assert!(end > start);
        assert_eq!(end.date_naive(), start.date_naive());
    }

    #[test]
    fn clock_time_uses_own_offset() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let dt = tz.with_ymd_and_hms(2025, 6, 12, 9, 5, 0).unwrap();
        assert_eq!(clock_time(&dt), "09:05");

        // Same instant in UTC reads differently.
        assert_eq!(clock_time(&dt.with_timezone(&Utc)), "14:05");
    }
}
