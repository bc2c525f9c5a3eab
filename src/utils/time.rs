use crate::error::{config_error, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an HH:MM string into hour and minute
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Resolve a configured timezone name
pub fn resolve_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| config_error(&format!("Invalid timezone: {}", name)))
}

/// Current wall-clock time in the given timezone
pub fn now_in_tz(tz: &Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(tz)
}

/// Current calendar date in the given timezone
pub fn today_in_tz(tz: &Tz) -> NaiveDate {
    now_in_tz(tz).date_naive()
}

/// Next occurrence of a daily HH:MM time, today or tomorrow
pub fn next_daily_time<Z: TimeZone>(
    current_time: &DateTime<Z>,
    time_str: &str,
) -> Option<NaiveDateTime> {
    let (hour, minute) = parse_time(time_str)?;

    // Today at the target time
    let mut next_time = current_time.date_naive().and_hms_opt(hour, minute, 0)?;

    // Already past for today, roll to tomorrow
    if current_time.naive_local() >= next_time {
        next_time = next_time.checked_add_signed(chrono::Duration::days(1))?;
    }

    Some(next_time)
}

/// Seconds until the next scheduled time, floored at one minute
pub fn calculate_wait_duration<Z: TimeZone>(
    now: &DateTime<Z>,
    next_time: &NaiveDateTime,
) -> AppResult<i64> {
    let wait_duration = next_time.signed_duration_since(now.naive_local());
    let seconds = wait_duration.num_seconds();

    if seconds <= 0 {
        // A pass that overruns can land just past its own target; waiting a
        // minute is better than erroring out of the scheduler loop
        return Ok(60);
    }

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("00:00"), Some((0, 0)));
        assert_eq!(parse_time("09:00"), Some((9, 0)));
        assert_eq!(parse_time("23:59"), Some((23, 59)));
        // Single-digit hours are accepted
        assert_eq!(parse_time("7:05"), Some((7, 5)));

        assert_eq!(parse_time("24:00"), None); // hour out of range
        assert_eq!(parse_time("12:60"), None); // minute out of range
        assert_eq!(parse_time("12:30:45"), None); // seconds not allowed
        assert_eq!(parse_time("12"), None); // no minute part
        assert_eq!(parse_time("12:ab"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_resolve_timezone() {
        assert!(resolve_timezone("UTC").is_ok());
        assert!(resolve_timezone("America/New_York").is_ok());
        assert!(resolve_timezone("Mars/Olympus").is_err());
        assert!(resolve_timezone("").is_err());
    }

    #[test]
    fn test_next_daily_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();

        // Later today stays on today
        let result = next_daily_time(&now, "15:30").unwrap();
        assert_eq!(
            result.format("%Y-%m-%d %H:%M").to_string(),
            "2026-03-15 15:30"
        );

        // Earlier today rolls to tomorrow
        let result = next_daily_time(&now, "09:30").unwrap();
        assert_eq!(
            result.format("%Y-%m-%d %H:%M").to_string(),
            "2026-03-16 09:30"
        );

        // The exact current minute also rolls to tomorrow
        let result = next_daily_time(&now, "10:00").unwrap();
        assert_eq!(
            result.format("%Y-%m-%d %H:%M").to_string(),
            "2026-03-16 10:00"
        );

        assert_eq!(next_daily_time(&now, "25:00"), None);
    }

    #[test]
    fn test_calculate_wait_duration() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();

        let target = now.naive_utc() + Duration::hours(1);
        assert_eq!(calculate_wait_duration(&now, &target).unwrap(), 3600);

        let target = now.naive_utc() + Duration::minutes(1);
        assert_eq!(calculate_wait_duration(&now, &target).unwrap(), 60);

        // A target in the past floors at the one-minute minimum
        let target = now.naive_utc() - Duration::minutes(5);
        assert_eq!(calculate_wait_duration(&now, &target).unwrap(), 60);

        // Chained with next_daily_time for a time already past today
        let next = next_daily_time(&now, "09:30").unwrap();
        let wait = calculate_wait_duration(&now, &next).unwrap();
        assert_eq!(wait, 23 * 3600 + 30 * 60);
    }
}
