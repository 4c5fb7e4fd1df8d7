//! Human-relative timestamp labels ("4 minutes ago"). Callers re-render on
//! their own tick to keep displayed values current; nothing here owns a
//! timer.

use chrono::{DateTime, Utc};

/// Formats `then` relative to `now`, with an "ago" / "in" suffix.
pub fn format_relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - then;
    let seconds = delta.num_seconds();
    let (magnitude, future) = if seconds < 0 {
        ((-seconds) as u64, true)
    } else {
        (seconds as u64, false)
    };

    let phrase = distance_phrase(magnitude);
    if future {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

/// Shorthand for `format_relative(then, Utc::now())`.
pub fn from_now(then: DateTime<Utc>) -> String {
    format_relative(then, Utc::now())
}

fn distance_phrase(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    match seconds {
        0..45 => "less than a minute".to_string(),
        45..90 => "1 minute".to_string(),
        90.. if seconds < 45 * MINUTE => {
            format!("{} minutes", seconds.div_ceil(MINUTE).max(2))
        }
        _ if seconds < 90 * MINUTE => "about 1 hour".to_string(),
        _ if seconds < DAY => format!("about {} hours", seconds.div_ceil(HOUR)),
        _ if seconds < 2 * DAY => "1 day".to_string(),
        _ if seconds < MONTH => format!("{} days", seconds / DAY),
        _ if seconds < 2 * MONTH => "about 1 month".to_string(),
        _ if seconds < YEAR => format!("{} months", seconds / MONTH),
        _ if seconds < 2 * YEAR => "about 1 year".to_string(),
        _ => format!("{} years", seconds / YEAR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn now() -> DateTime<Utc> {
        "2025-03-01T12:00:00Z".parse().unwrap()
    }

    fn ago(delta: TimeDelta) -> String {
        format_relative(now() - delta, now())
    }

    #[test]
    fn sub_minute() {
        assert_eq!(ago(TimeDelta::seconds(0)), "less than a minute ago");
        assert_eq!(ago(TimeDelta::seconds(44)), "less than a minute ago");
    }

    #[test]
    fn around_one_minute() {
        assert_eq!(ago(TimeDelta::seconds(45)), "1 minute ago");
        assert_eq!(ago(TimeDelta::seconds(89)), "1 minute ago");
        assert_eq!(ago(TimeDelta::seconds(90)), "2 minutes ago");
    }

    #[test]
    fn minutes() {
        assert_eq!(ago(TimeDelta::minutes(5)), "5 minutes ago");
        assert_eq!(ago(TimeDelta::minutes(44)), "44 minutes ago");
    }

    #[test]
    fn hours() {
        assert_eq!(ago(TimeDelta::minutes(46)), "about 1 hour ago");
        assert_eq!(ago(TimeDelta::hours(5)), "about 5 hours ago");
    }

    #[test]
    fn days_and_beyond() {
        assert_eq!(ago(TimeDelta::hours(26)), "1 day ago");
        assert_eq!(ago(TimeDelta::days(6)), "6 days ago");
        assert_eq!(ago(TimeDelta::days(40)), "about 1 month ago");
        assert_eq!(ago(TimeDelta::days(90)), "3 months ago");
        assert_eq!(ago(TimeDelta::days(400)), "about 1 year ago");
        assert_eq!(ago(TimeDelta::days(800)), "2 years ago");
    }

    #[test]
    fn future_timestamps_use_in_prefix() {
        assert_eq!(
            format_relative(now() + TimeDelta::minutes(5), now()),
            "in 5 minutes"
        );
    }
}
