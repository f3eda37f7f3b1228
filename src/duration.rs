//! Compact lookback expressions: `30s`, `15m`, `6h`, `3d`, `1w`.
//!
//! A parsed value of zero is meaningful ("no cutoff") and is not an error.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::DurationError;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([smhdw])$").expect("duration regex"));

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Parse `<integer><unit>` after trimming surrounding whitespace.
///
/// The whole trimmed input must match; `1w2d` or `1 w` are rejected.
pub fn parse_lookback(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    let caps = DURATION_RE
        .captures(trimmed)
        .ok_or_else(|| DurationError::InvalidFormat {
            input: trimmed.to_string(),
        })?;

    let magnitude: u64 = caps[1]
        .parse()
        .map_err(|_| DurationError::InvalidMagnitude {
            input: trimmed.to_string(),
        })?;

    let unit_secs = match &caps[2] {
        "s" => 1,
        "m" => MINUTE,
        "h" => HOUR,
        "d" => DAY,
        "w" => WEEK,
        _ => {
            return Err(DurationError::InvalidFormat {
                input: trimmed.to_string(),
            });
        }
    };

    magnitude
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| DurationError::InvalidMagnitude {
            input: trimmed.to_string(),
        })
}

/// Renders a lookback for messages; zero reads as "all time".
pub fn describe_lookback(lookback: Duration) -> String {
    let secs = lookback.as_secs();
    if secs == 0 {
        return "all time".to_string();
    }
    for (unit, size) in [("w", WEEK), ("d", DAY), ("h", HOUR), ("m", MINUTE)] {
        if secs % size == 0 {
            return format!("{}{}", secs / size, unit);
        }
    }
    format!("{}s", secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_unit() {
        assert_eq!(parse_lookback("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_lookback("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_lookback("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_lookback("3d").unwrap(), Duration::from_secs(3 * 86_400));
        assert_eq!(parse_lookback("1w").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_zero_is_valid() {
        assert_eq!(parse_lookback("0d").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        for input in ["3d", " 3d", "3d ", "\t3d\n"] {
            assert_eq!(parse_lookback(input), parse_lookback(input.trim()));
        }
        assert_eq!(parse_lookback("  1w  ").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_errors_report_trimmed_input() {
        for input in [" 3x ", "\tabc\n", " 99999999999999999999999s "] {
            assert_eq!(parse_lookback(input), parse_lookback(input.trim()));
        }
        assert_eq!(
            parse_lookback(" 3x "),
            Err(DurationError::InvalidFormat {
                input: "3x".to_string()
            })
        );
    }

    #[test]
    fn test_non_ascii_digits_are_rejected() {
        for input in ["\u{0663}d", "\u{FF13}h", "1\u{0663}w"] {
            assert!(
                matches!(parse_lookback(input), Err(DurationError::InvalidFormat { .. })),
                "expected InvalidFormat for {input:?}"
            );
        }
    }

    #[test]
    fn test_rejects_partial_matches() {
        for input in ["", "d", "3", "3x", "1w2d", "1 w", "-1h", "1.5h", "3D", "abc3d"] {
            assert!(
                matches!(parse_lookback(input), Err(DurationError::InvalidFormat { .. })),
                "expected InvalidFormat for {input:?}"
            );
        }
    }

    #[test]
    fn test_magnitude_overflow() {
        let huge = format!("{}s", u128::MAX);
        assert!(matches!(
            parse_lookback(&huge),
            Err(DurationError::InvalidMagnitude { .. })
        ));

        let overflow_weeks = format!("{}w", u64::MAX / 2);
        assert!(matches!(
            parse_lookback(&overflow_weeks),
            Err(DurationError::InvalidMagnitude { .. })
        ));
    }

    #[test]
    fn test_describe_lookback() {
        assert_eq!(describe_lookback(Duration::ZERO), "all time");
        assert_eq!(describe_lookback(Duration::from_secs(604_800)), "1w");
        assert_eq!(describe_lookback(Duration::from_secs(2 * 86_400)), "2d");
        assert_eq!(describe_lookback(Duration::from_secs(90)), "90s");
    }
}
