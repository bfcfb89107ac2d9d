use chrono::{DateTime, Datelike, Duration, NaiveTime, SecondsFormat, Utc};

/// Offset of the dashboard's week boundary from Monday 00:00 UTC: one hour before it.
/// Sunday 23:00 UTC is Monday 00:00 at UTC+1, which lands early on Monday in Vilnius in
/// both winter and summer time.
fn boundary_offset() -> Duration {
    -Duration::hours(1)
}

/// Start of the week containing `now`: the Sunday 23:00 UTC preceding that week's Monday.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    let midnight = now.date_naive().and_time(NaiveTime::default()).and_utc();

    midnight - Duration::days(days_since_monday) + boundary_offset()
}

/// This week's and next week's window starts, in query order.
pub fn week_windows(now: DateTime<Utc>) -> [DateTime<Utc>; 2] {
    let this_week = week_start(now);
    [this_week, this_week + Duration::days(7)]
}

/// `weekStart` query value, e.g. `2024-03-10T23:00:00.000Z`.
pub fn format_week_start(week_start: DateTime<Utc>) -> String {
    week_start.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Weekday};

    use super::*;

    #[test]
    fn wednesday_maps_to_preceding_sunday_evening() {
        let now = Utc.with_ymd_and_hms(2024, 3, 13, 15, 42, 7).unwrap();
        assert_eq!(now.weekday(), Weekday::Wed);

        let [this_week, next_week] = week_windows(now);
        assert_eq!(this_week, Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap());
        assert_eq!(next_week, Utc.with_ymd_and_hms(2024, 3, 17, 23, 0, 0).unwrap());
        assert_eq!(next_week - this_week, Duration::days(7));
    }

    #[test]
    fn monday_uses_the_sunday_just_before() {
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 0, 30, 0).unwrap();
        assert_eq!(week_start(now), Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap());
    }

    #[test]
    fn sunday_late_evening_stays_in_the_ending_week() {
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 23, 30, 0).unwrap();
        assert_eq!(week_start(now), Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap());
    }

    #[test]
    fn every_day_of_a_week_shares_one_boundary() {
        let expected = Utc.with_ymd_and_hms(2024, 12, 29, 23, 0, 0).unwrap();
        // Monday 2024-12-30 through Sunday 2025-01-05 straddles a year change.
        for day in 0..7 {
            let now = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap()
                + Duration::days(day)
                + Duration::hours(22);
            let start = week_start(now);
            assert_eq!(start, expected, "now = {now}");
            assert_eq!(start.weekday(), Weekday::Sun);
        }
    }

    #[test]
    fn formats_with_milliseconds() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap();
        assert_eq!(format_week_start(start), "2024-03-10T23:00:00.000Z");
    }
}
