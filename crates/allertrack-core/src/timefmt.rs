//! Human-relative time formatting. Pure functions, no state.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Whole calendar days from `a` to `b` (negative if `b` precedes `a`).
///
/// Compares calendar dates, not elapsed time: 23:59 to 00:01 the next
/// day is one day.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Calendar days since a past date.
pub fn days_since(past: NaiveDate, today: NaiveDate) -> i64 {
    days_between(past, today)
}

/// Format a timestamp relative to `now`: "just now", "5 minutes ago",
/// "2 days ago", and so on.
///
/// Buckets: under 10s is "just now"; then seconds, minutes, hours, days
/// (up to 30), 30-day months (up to 12), years. Future timestamps clamp
/// to "just now".
pub fn format_relative(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - t).num_seconds();
    if seconds < 10 {
        return "just now".to_owned();
    }
    if seconds < 60 {
        return plural(seconds, "second");
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = hours / 24;
    if days < 30 {
        return plural(days, "day");
    }

    let months = days / 30;
    if months < 12 {
        return plural(months, "month");
    }

    plural(months / 12, "year")
}

/// Short absolute date, e.g. "Aug 24, 2026".
pub fn short_date(d: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let month = MONTHS
        .get(d.month0() as usize)
        .copied()
        .unwrap_or("???");
    format!("{} {}, {}", month, d.day(), d.year())
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().expect("timestamp")
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    #[test]
    fn days_between_uses_calendar_dates() {
        assert_eq!(days_between(date("2026-08-20"), date("2026-08-24")), 4);
        assert_eq!(days_between(date("2026-08-24"), date("2026-08-24")), 0);
        assert_eq!(days_between(date("2026-08-24"), date("2026-08-20")), -4);
    }

    #[test]
    fn relative_bucket_boundaries() {
        let now = at("2026-08-24T12:00:00Z");

        assert_eq!(format_relative(at("2026-08-24T11:59:51Z"), now), "just now");
        assert_eq!(
            format_relative(at("2026-08-24T11:59:50Z"), now),
            "10 seconds ago"
        );
        assert_eq!(
            format_relative(at("2026-08-24T11:59:00Z"), now),
            "1 minute ago"
        );
        assert_eq!(
            format_relative(at("2026-08-24T11:00:00Z"), now),
            "1 hour ago"
        );
        assert_eq!(
            format_relative(at("2026-08-23T12:00:00Z"), now),
            "1 day ago"
        );
        assert_eq!(
            format_relative(at("2026-07-24T12:00:00Z"), now),
            "1 month ago"
        );
        assert_eq!(
            format_relative(at("2024-08-24T12:00:00Z"), now),
            "2 years ago"
        );
    }

    #[test]
    fn future_timestamps_clamp_to_just_now() {
        let now = at("2026-08-24T12:00:00Z");
        assert_eq!(format_relative(at("2026-08-24T12:05:00Z"), now), "just now");
    }

    #[test]
    fn short_date_formats() {
        assert_eq!(short_date(date("2026-08-24")), "Aug 24, 2026");
    }
}
