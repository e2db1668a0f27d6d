//! Display formatting and custom-input parsing for the countdown.

/// Render seconds as `M:SS`.
///
/// Minutes are never padded and never roll over into hours, so
/// 6000 seconds renders as `100:00`.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Parse a custom duration the way the input field is read: leading
/// whitespace is skipped, an optional sign is accepted, then the leading
/// run of digits is taken and anything after it is ignored.
///
/// Returns `None` for non-numeric text and for values that are not
/// strictly positive, which callers treat as "ignore this input".
pub fn parse_custom_minutes(input: &str) -> Option<u32> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 || negative {
        return None;
    }

    // Saturate absurdly long digit runs instead of rejecting them.
    let minutes = rest[..digits_len].parse::<u32>().unwrap_or(u32::MAX);
    (minutes > 0).then_some(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_time_examples() {
        assert_eq!(format_time(599), "9:59");
        assert_eq!(format_time(600), "10:00");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(6000), "100:00");
    }

    #[test]
    fn parse_custom_accepts_leading_integer() {
        assert_eq!(parse_custom_minutes("15"), Some(15));
        assert_eq!(parse_custom_minutes("  7"), Some(7));
        assert_eq!(parse_custom_minutes("12abc"), Some(12));
        assert_eq!(parse_custom_minutes("3.9"), Some(3));
        assert_eq!(parse_custom_minutes("+4"), Some(4));
    }

    #[test]
    fn parse_custom_rejects_non_positive_and_text() {
        assert_eq!(parse_custom_minutes("0"), None);
        assert_eq!(parse_custom_minutes("-5"), None);
        assert_eq!(parse_custom_minutes("abc"), None);
        assert_eq!(parse_custom_minutes(""), None);
        assert_eq!(parse_custom_minutes("-"), None);
    }

    proptest! {
        #[test]
        fn format_time_matches_minutes_and_padded_seconds(s in 0u64..1_000_000) {
            let out = format_time(s);
            let (m, sec) = out.split_once(':').unwrap();
            prop_assert_eq!(m.parse::<u64>().unwrap(), s / 60);
            prop_assert_eq!(sec.len(), 2);
            prop_assert_eq!(sec.parse::<u64>().unwrap(), s % 60);
        }

        #[test]
        fn parse_custom_roundtrips_positive_values(n in 1u32..100_000) {
            prop_assert_eq!(parse_custom_minutes(&n.to_string()), Some(n));
        }
    }
}
