//! Wait-time reporting.

use chrono::{DateTime, Utc};

use super::store::Member;

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

/// Unit for elapsed-time reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Parse a user-supplied unit (`m`, `h`, `d` and their long forms).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeUnit::Hours),
            "d" | "day" | "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            TimeUnit::Minutes => "minute(s)",
            TimeUnit::Hours => "hour(s)",
            TimeUnit::Days => "day(s)",
        }
    }
}

/// Numeric component of the elapsed time in the given unit.
///
/// Minutes are the rounded sub-hour remainder and hours the sub-day remainder,
/// so a 25 hour wait reports 0 minutes, 1 hour or 1 day.
pub fn elapsed_value(joined_at: DateTime<Utc>, now: DateTime<Utc>, unit: TimeUnit) -> i64 {
    let diff_ms = (now - joined_at).num_milliseconds().max(0);
    match unit {
        // Round half up
        TimeUnit::Minutes => {
            ((diff_ms % MS_PER_DAY) % MS_PER_HOUR + MS_PER_MINUTE / 2) / MS_PER_MINUTE
        }
        TimeUnit::Hours => (diff_ms % MS_PER_DAY) / MS_PER_HOUR,
        TimeUnit::Days => diff_ms / MS_PER_DAY,
    }
}

/// Human-readable time a member has spent in the queue, e.g. `"3 minute(s)"`.
pub fn elapsed(member: &Member, now: DateTime<Utc>, unit: TimeUnit) -> String {
    format!("{} {}", elapsed_value(member.joined_at, now, unit), unit.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn member_joined(ago: Duration, now: DateTime<Utc>) -> Member {
        Member::new("Alice", "1", now - ago)
    }

    #[test]
    fn test_zero_elapsed() {
        let now = Utc::now();
        let m = member_joined(Duration::zero(), now);
        assert_eq!(elapsed(&m, now, TimeUnit::Minutes), "0 minute(s)");
        assert_eq!(elapsed(&m, now, TimeUnit::Hours), "0 hour(s)");
        assert_eq!(elapsed(&m, now, TimeUnit::Days), "0 day(s)");
    }

    #[test]
    fn test_minutes_round_half_up() {
        let now = Utc::now();
        assert_eq!(
            elapsed(&member_joined(Duration::seconds(90), now), now, TimeUnit::Minutes),
            "2 minute(s)"
        );
        assert_eq!(
            elapsed(&member_joined(Duration::seconds(89), now), now, TimeUnit::Minutes),
            "1 minute(s)"
        );
        assert_eq!(
            elapsed(&member_joined(Duration::seconds(29), now), now, TimeUnit::Minutes),
            "0 minute(s)"
        );
    }

    #[test]
    fn test_minutes_are_sub_hour_remainder() {
        let now = Utc::now();
        let joined = now - Duration::hours(25) - Duration::minutes(10);
        assert_eq!(elapsed_value(joined, now, TimeUnit::Minutes), 10);
        assert_eq!(elapsed_value(joined, now, TimeUnit::Hours), 1);
        assert_eq!(elapsed_value(joined, now, TimeUnit::Days), 1);

        // Just under the hour rounds up to 60
        let joined = now - Duration::minutes(59) - Duration::seconds(45);
        assert_eq!(elapsed_value(joined, now, TimeUnit::Minutes), 60);
        assert_eq!(elapsed_value(joined, now, TimeUnit::Hours), 0);
    }

    #[test]
    fn test_future_join_clamps_to_zero() {
        let now = Utc::now();
        let joined = now + Duration::minutes(5);
        assert_eq!(elapsed_value(joined, now, TimeUnit::Minutes), 0);
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(TimeUnit::parse("m"), Some(TimeUnit::Minutes));
        assert_eq!(TimeUnit::parse("Hours"), Some(TimeUnit::Hours));
        assert_eq!(TimeUnit::parse("d"), Some(TimeUnit::Days));
        assert_eq!(TimeUnit::parse("weeks"), None);
        assert_eq!(TimeUnit::default(), TimeUnit::Minutes);
    }
}
