//! Relative-time labels
//!
//! Formats "how long ago" strings for feed items. `now` is an explicit
//! parameter so callers pass one consistent clock reading per feed build
//! and tests stay deterministic.

use chrono::{DateTime, Utc};

/// Format the distance between `timestamp` and `now` as a short label.
///
/// Units escalate minute -> hour -> day and stop there; each unit is
/// rounded to the nearest whole value, so 90 seconds reads "2 minutes
/// ago". Timestamps in the future saturate to "less than 1 minute ago".
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds().max(0);

    if secs < 60 {
        return "less than 1 minute ago".to_string();
    }

    let minutes = (secs + 30) / 60;
    if minutes < 60 {
        return format!("{} minute{} ago", minutes, plural(minutes));
    }

    let hours = (secs + 1800) / 3600;
    if hours < 24 {
        return format!("{} hour{} ago", hours, plural(hours));
    }

    let days = (secs + 43200) / 86400;
    format!("{} day{} ago", days, plural(days))
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-08-29T12:00:00Z".parse().unwrap()
    }

    fn ago(seconds: i64) -> DateTime<Utc> {
        now() - Duration::seconds(seconds)
    }

    #[test]
    fn test_under_one_minute() {
        assert_eq!(relative_time(ago(0), now()), "less than 1 minute ago");
        assert_eq!(relative_time(ago(30), now()), "less than 1 minute ago");
        assert_eq!(relative_time(ago(59), now()), "less than 1 minute ago");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(relative_time(ago(60), now()), "1 minute ago");
        assert_eq!(relative_time(ago(90), now()), "2 minutes ago");
        assert_eq!(relative_time(ago(120), now()), "2 minutes ago");
        assert_eq!(relative_time(ago(45 * 60), now()), "45 minutes ago");
    }

    #[test]
    fn test_hours() {
        assert_eq!(relative_time(ago(3600), now()), "1 hour ago");
        assert_eq!(relative_time(ago(7200), now()), "2 hours ago");
        assert_eq!(relative_time(ago(23 * 3600), now()), "23 hours ago");
    }

    #[test]
    fn test_days() {
        // ~25 hours
        assert_eq!(relative_time(ago(90_000), now()), "1 day ago");
        assert_eq!(relative_time(ago(3 * 86_400), now()), "3 days ago");
        // No escalation past days
        assert_eq!(relative_time(ago(45 * 86_400), now()), "45 days ago");
    }

    #[test]
    fn test_future_timestamp_saturates() {
        let future = now() + Duration::hours(2);
        assert_eq!(relative_time(future, now()), "less than 1 minute ago");
    }

    #[test]
    fn test_always_non_empty() {
        for secs in [0, 1, 61, 3_700, 100_000, 10_000_000] {
            assert!(!relative_time(ago(secs), now()).is_empty());
        }
    }
}
