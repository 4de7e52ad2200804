use std::fmt::Write;

/// Relative age of the last successful update, e.g. "3 minutes ago".
pub fn format_ago(elapsed_ms: f64) -> String {
    let mut out = String::with_capacity(16);
    write_ago(&mut out, elapsed_ms);
    out
}

pub fn write_ago(buf: &mut String, elapsed_ms: f64) {
    buf.clear();
    let secs = if elapsed_ms.is_finite() {
        (elapsed_ms / 1000.0).max(0.0) as u64
    } else {
        0
    };
    let minutes = secs / 60;
    let hours = minutes / 60;
    let _ = match (hours, minutes) {
        (0, 0) => write!(buf, "just now"),
        (0, 1) => write!(buf, "1 minute ago"),
        (0, m) => write!(buf, "{m} minutes ago"),
        (1, _) => write!(buf, "1 hour ago"),
        (h, _) => write!(buf, "{h} hours ago"),
    };
}

/// Offline banner text. `last_success_ms` is None until the first successful fetch.
pub fn offline_label(last_success_ms: Option<f64>, now_ms: f64) -> String {
    match last_success_ms {
        Some(at) => format!("Offline \u{2014} last updated {}", format_ago(now_ms - at)),
        None => "Offline \u{2014} waiting for leaderboard data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_a_minute_is_just_now() {
        assert_eq!(format_ago(0.0), "just now");
        assert_eq!(format_ago(59_999.0), "just now");
    }

    #[test]
    fn minutes_are_pluralized() {
        assert_eq!(format_ago(60_000.0), "1 minute ago");
        assert_eq!(format_ago(3.0 * 60_000.0 + 10.0), "3 minutes ago");
    }

    #[test]
    fn hours_take_over_after_sixty_minutes() {
        assert_eq!(format_ago(60.0 * 60_000.0), "1 hour ago");
        assert_eq!(format_ago(5.0 * 60.0 * 60_000.0), "5 hours ago");
    }

    #[test]
    fn clamps_negative_and_nan() {
        assert_eq!(format_ago(-5_000.0), "just now");
        assert_eq!(format_ago(f64::NAN), "just now");
    }

    #[test]
    fn offline_label_mentions_age() {
        assert_eq!(
            offline_label(Some(0.0), 120_000.0),
            "Offline \u{2014} last updated 2 minutes ago"
        );
        assert_eq!(
            offline_label(None, 10.0),
            "Offline \u{2014} waiting for leaderboard data"
        );
    }
}
