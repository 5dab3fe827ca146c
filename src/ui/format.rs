use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// RFC 3339, RFC 2822 (`Fri, 01 Aug 2025 10:00:00 GMT`), naive ISO
/// date-times read as UTC, or a bare `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `Mar 4, 2025`.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return "Date unknown".to_string();
    };
    match parse_timestamp(raw) {
        Some(ts) => ts.format("%b %-d, %Y").to_string(),
        None => "Invalid date".to_string(),
    }
}

/// Human distance between `raw` and `now`, e.g. `about 3 hours ago`.
/// Empty when `raw` cannot be parsed.
pub fn format_relative_date(raw: &str, now: DateTime<Utc>) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        return String::new();
    };
    let seconds = (now - ts).num_seconds();
    let distance = describe_distance(seconds.unsigned_abs());
    if seconds >= 0 {
        format!("{distance} ago")
    } else {
        format!("in {distance}")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

fn describe_distance(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;

    let rounded = |unit: u64| (seconds + unit / 2) / unit;

    if seconds < 30 {
        "less than a minute".to_string()
    } else if seconds < 90 {
        "1 minute".to_string()
    } else if seconds < 44 * MINUTE + 30 {
        plural(rounded(MINUTE), "minute")
    } else if seconds < 89 * MINUTE + 30 {
        "about 1 hour".to_string()
    } else if seconds < DAY {
        format!("about {}", plural(rounded(HOUR), "hour"))
    } else if seconds < 42 * HOUR {
        "1 day".to_string()
    } else if seconds < MONTH {
        plural(rounded(DAY), "day")
    } else if seconds < 45 * DAY {
        "about 1 month".to_string()
    } else if seconds < 60 * DAY {
        "about 2 months".to_string()
    } else if seconds < 12 * MONTH {
        plural(rounded(MONTH), "month")
    } else {
        let months = seconds / MONTH;
        let years = months / 12;
        match months % 12 {
            0..=2 => format!("about {}", plural(years, "year")),
            3..=8 => format!("over {}", plural(years, "year")),
            _ => format!("almost {}", plural(years + 1, "year")),
        }
    }
}

/// Wall-clock time of a log entry in the local zone.
pub fn format_log_time(ts: DateTime<Utc>, with_millis: bool) -> String {
    let local = ts.with_timezone(&Local);
    if with_millis {
        local.format("%H:%M:%S%.3f").to_string()
    } else {
        local.format("%H:%M:%S").to_string()
    }
}
