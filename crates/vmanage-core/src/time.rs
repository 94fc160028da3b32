// ── Timestamp coercion ──
//
// The controller reports most timestamps as epoch milliseconds, but the
// same fields can also hold strings or be missing entirely.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde_json::Value;

use crate::record::display_value;

/// Numbers above this are taken to be epoch milliseconds.
pub const EPOCH_MS_THRESHOLD: f64 = 1_000_000_000.0;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an epoch-milliseconds value as local `YYYY-MM-DD HH:MM:SS`.
///
/// Non-numeric values and small numbers are shown unchanged.
pub fn ms_to_date(value: &Value) -> String {
    let Some(ms) = value.as_f64().filter(|ms| *ms > EPOCH_MS_THRESHOLD) else {
        return display_value(value);
    };

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    let millis = ms as i64;

    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(DATE_FORMAT).to_string(),
        None => display_value(value),
    }
}

/// Parse an epoch-milliseconds value from a number or a numeric string.
pub fn epoch_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            n.as_f64().map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Time elapsed since `boot_ms` as `Xd Yh Zm`.
///
/// Days are shown only when non-zero, hours when either hours or days are
/// non-zero, minutes always. A boot time in the future reads as `0m`.
pub fn uptime_since(boot_ms: i64, now: DateTime<Utc>) -> String {
    let Some(boot) = Utc.timestamp_millis_opt(boot_ms).single() else {
        return "n/a".into();
    };

    let total = (now - boot).num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days != 0 {
        parts.push(format!("{days}d"));
    }
    if hours != 0 || days != 0 {
        parts.push(format!("{hours}h"));
    }
    parts.push(format!("{minutes}m"));
    parts.join(" ")
}

/// Uptime cell for a raw controller value, `n/a` when not an epoch time.
pub fn format_uptime(value: Option<&Value>, now: DateTime<Utc>) -> String {
    value
        .and_then(epoch_ms)
        .map_or_else(|| "n/a".into(), |ms| uptime_since(ms, now))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
            .single()
            .expect("valid date")
    }

    fn ms_before(now: DateTime<Utc>, seconds: i64) -> i64 {
        (now - chrono::Duration::seconds(seconds)).timestamp_millis()
    }

    #[test]
    fn epoch_millis_render_as_local_dates() {
        let ms = 1_700_000_000_000_i64;
        let expected = Local
            .timestamp_millis_opt(ms)
            .single()
            .expect("valid timestamp")
            .format(DATE_FORMAT)
            .to_string();
        assert_eq!(ms_to_date(&json!(ms)), expected);
    }

    #[test]
    fn small_numbers_and_strings_pass_through() {
        assert_eq!(ms_to_date(&json!(12345)), "12345");
        assert_eq!(ms_to_date(&json!("yesterday")), "yesterday");
        assert_eq!(ms_to_date(&json!(null)), "");
        assert_eq!(ms_to_date(&json!(true)), "true");
    }

    #[test]
    fn uptime_formats_days_hours_minutes() {
        let now = now();
        let boot = ms_before(now, 2 * 86_400 + 3 * 3_600 + 4 * 60 + 59);
        assert_eq!(uptime_since(boot, now), "2d 3h 4m");
    }

    #[test]
    fn uptime_keeps_zero_hours_when_days_present() {
        let now = now();
        assert_eq!(uptime_since(ms_before(now, 86_400 + 60), now), "1d 0h 1m");
    }

    #[test]
    fn uptime_under_an_hour_is_minutes_only() {
        let now = now();
        assert_eq!(uptime_since(ms_before(now, 45 * 60), now), "45m");
        assert_eq!(uptime_since(ms_before(now, 3 * 3_600), now), "3h 0m");
    }

    #[test]
    fn future_boot_time_clamps_to_zero() {
        let now = now();
        assert_eq!(uptime_since(now.timestamp_millis() + 60_000, now), "0m");
    }

    #[test]
    fn format_uptime_accepts_numeric_strings() {
        let now = now();
        let boot = ms_before(now, 5 * 60);
        assert_eq!(format_uptime(Some(&json!(boot.to_string())), now), "5m");
        assert_eq!(format_uptime(Some(&json!("up 5 days")), now), "n/a");
        assert_eq!(format_uptime(None, now), "n/a");
    }
}
