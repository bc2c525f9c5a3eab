use chrono::NaiveDateTime;

/// Sentinel shown once an event's moment has been reached
pub const EVENT_PASSED: &str = "Event has passed";

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_MINUTE: i64 = 60;

/// Time remaining until an event, broken into display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub is_past: bool,
}

impl Countdown {
    /// Break down the whole seconds from `now` until `target`
    ///
    /// A target at or before `now` counts as passed.
    pub fn until(target: NaiveDateTime, now: NaiveDateTime) -> Self {
        let remaining = (target - now).num_seconds();
        if remaining <= 0 {
            return Countdown {
                is_past: true,
                ..Countdown::default()
            };
        }
        Countdown {
            days: remaining / SECS_PER_DAY,
            hours: (remaining % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (remaining % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: remaining % SECS_PER_MINUTE,
            is_past: false,
        }
    }

    /// Compact display form; leading zero units are dropped, seconds always shown
    pub fn format(&self) -> String {
        if self.is_past {
            return EVENT_PASSED.to_string();
        }
        if self.days > 0 {
            format!(
                "{}d {}h {}m {}s",
                self.days, self.hours, self.minutes, self.seconds
            )
        } else if self.hours > 0 {
            format!("{}h {}m {}s", self.hours, self.minutes, self.seconds)
        } else if self.minutes > 0 {
            format!("{}m {}s", self.minutes, self.seconds)
        } else {
            format!("{}s", self.seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(date: &str, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_countdown_day_and_hours() {
        let countdown = Countdown::until(at("2026-01-10", 0, 0, 0), at("2026-01-08", 12, 0, 0));
        assert_eq!(countdown.days, 1);
        assert_eq!(countdown.hours, 12);
        assert_eq!(countdown.minutes, 0);
        assert_eq!(countdown.seconds, 0);
        assert!(!countdown.is_past);
        assert_eq!(countdown.format(), "1d 12h 0m 0s");
    }

    #[test]
    fn test_countdown_drops_leading_zero_units() {
        let now = at("2026-01-09", 23, 54, 30);
        let countdown = Countdown::until(at("2026-01-10", 0, 0, 0), now);
        assert_eq!(countdown.format(), "5m 30s");

        let now = at("2026-01-09", 23, 59, 18);
        let countdown = Countdown::until(at("2026-01-10", 0, 0, 0), now);
        assert_eq!(countdown.format(), "42s");

        let now = at("2026-01-09", 21, 0, 1);
        let countdown = Countdown::until(at("2026-01-10", 0, 0, 0), now);
        assert_eq!(countdown.format(), "2h 59m 59s");
    }

    #[test]
    fn test_countdown_exact_moment_is_passed() {
        let moment = at("2026-01-10", 0, 0, 0);
        let countdown = Countdown::until(moment, moment);
        assert!(countdown.is_past);
        assert_eq!(countdown.format(), EVENT_PASSED);
    }

    #[test]
    fn test_countdown_after_event_is_passed() {
        let countdown = Countdown::until(at("2026-01-10", 0, 0, 0), at("2026-01-10", 8, 30, 0));
        assert!(countdown.is_past);
        assert_eq!(countdown.days, 0);
        assert_eq!(countdown.format(), EVENT_PASSED);
    }
}
