//! LiveSplit timecode parsing and formatting
//!
//! Split files store times as `[D.]HH:MM:SS.fffffff` text. The literal `None`
//! stands for a time that was never recorded, and is equivalent to an omitted
//! element or a value of zero.
//!
//! Parsing never fails: malformed text yields zero seconds together with a
//! [`TimecodeIssue`] so callers can tell a corrupt field from a genuine zero.

use tracing::warn;

/// Token written in place of a time that was never recorded
pub const ABSENT: &str = "None";

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

/// Timecodes carry seven fractional digits (100ns ticks)
const TICKS_PER_SEC: u64 = 10_000_000;
const FRACTION_DIGITS: usize = 7;

/// Problem noticed while parsing a timecode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeIssue {
    /// `H:M:S` without fractional seconds; accepted as-is
    MissingFraction,
    /// Not a timecode at all; parsed as zero
    Invalid,
}

/// Result of [`parse`]: the value in seconds plus any diagnostic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedTimecode {
    pub seconds: f64,
    pub issue: Option<TimecodeIssue>,
}

impl ParsedTimecode {
    fn clean(seconds: f64) -> Self {
        Self { seconds, issue: None }
    }

    /// True when the text was rejected and the zero value is synthetic
    pub fn is_invalid(&self) -> bool {
        self.issue == Some(TimecodeIssue::Invalid)
    }
}

/// Parse a timecode into seconds.
///
/// Day prefix is only recognised when the text holds more than one `.`
/// (`1.02:03:04.5`); otherwise the leading field is hours.
///
/// # Examples
///
/// ```
/// use lssr_common::timecode::{parse, TimecodeIssue};
///
/// assert_eq!(parse("None").seconds, 0.0);
/// assert_eq!(parse("00:01:05.5000000").seconds, 65.5);
/// assert_eq!(parse("1.00:00:01.0000000").seconds, 86_401.0);
///
/// let lenient = parse("00:00:07");
/// assert_eq!(lenient.seconds, 7.0);
/// assert_eq!(lenient.issue, Some(TimecodeIssue::MissingFraction));
///
/// assert!(parse("garbage").is_invalid());
/// ```
pub fn parse(text: &str) -> ParsedTimecode {
    let text = text.trim();
    if text == ABSENT {
        return ParsedTimecode::clean(0.0);
    }

    match parse_fields(text) {
        Some((seconds, true)) => ParsedTimecode::clean(seconds),
        Some((seconds, false)) => {
            warn!("Timecode '{}' has no fractional seconds (expected H:M:S.f)", text);
            ParsedTimecode {
                seconds,
                issue: Some(TimecodeIssue::MissingFraction),
            }
        }
        None => {
            warn!("Invalid timecode '{}', using 0s", text);
            ParsedTimecode {
                seconds: 0.0,
                issue: Some(TimecodeIssue::Invalid),
            }
        }
    }
}

/// Parse a timecode and discard the diagnostic.
pub fn parse_seconds(text: &str) -> f64 {
    parse(text).seconds
}

/// Returns (seconds, had_fraction), or None when the text is not a timecode.
fn parse_fields(text: &str) -> Option<(f64, bool)> {
    let (days, clock) = if text.matches('.').count() > 1 {
        let (days, rest) = text.split_once('.')?;
        (parse_digits(days)?, rest)
    } else {
        (0, text)
    };

    let mut fields = clock.splitn(3, ':');
    let hours = parse_digits(fields.next()?)?;
    let minutes = parse_digits(fields.next()?)?;
    let seconds_field = fields.next()?;

    let (whole, fraction) = match seconds_field.split_once('.') {
        Some((whole, fraction)) => (parse_digits(whole)?, Some(parse_fraction(fraction)?)),
        None => (parse_digits(seconds_field)?, None),
    };

    // Oversized fields are rejected rather than wrapped
    let total = days
        .checked_mul(SECS_PER_DAY)?
        .checked_add(hours.checked_mul(SECS_PER_HOUR)?)?
        .checked_add(minutes.checked_mul(SECS_PER_MINUTE)?)?
        .checked_add(whole)?;
    Some((total as f64 + fraction.unwrap_or(0.0), fraction.is_some()))
}

fn parse_digits(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn parse_fraction(digits: &str) -> Option<f64> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.is_empty() {
        return Some(0.0);
    }
    format!("0.{}", digits).parse().ok()
}

/// Format seconds as a timecode.
///
/// Zero renders as [`ABSENT`]. The day component is omitted when zero, and
/// the fraction is always seven digits. Negative input is rendered with a
/// leading minus sign.
///
/// # Examples
///
/// ```
/// use lssr_common::timecode::format;
///
/// assert_eq!(format(0.0), "None");
/// assert_eq!(format(50.0), "00:00:50.0000000");
/// assert_eq!(format(0.1234567), "00:00:00.1234567");
/// assert_eq!(format(90_061.5), "1.01:01:01.5000000");
/// ```
pub fn format(seconds: f64) -> String {
    if seconds == 0.0 {
        return ABSENT.to_string();
    }

    let is_negative = seconds < 0.0;
    let ticks = (seconds.abs() * TICKS_PER_SEC as f64).round() as u64;
    let fraction = ticks % TICKS_PER_SEC;
    let mut whole = ticks / TICKS_PER_SEC;

    let days = whole / SECS_PER_DAY;
    whole %= SECS_PER_DAY;
    let hours = whole / SECS_PER_HOUR;
    whole %= SECS_PER_HOUR;
    let minutes = whole / SECS_PER_MINUTE;
    let secs = whole % SECS_PER_MINUTE;

    let day_prefix = if days > 0 {
        format!("{}.", days)
    } else {
        String::new()
    };
    let formatted = format!(
        "{}{:02}:{:02}:{:02}.{:0width$}",
        day_prefix,
        hours,
        minutes,
        secs,
        fraction,
        width = FRACTION_DIGITS
    );

    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Round seconds to the seven decimal places a timecode can hold.
pub fn round_ticks(seconds: f64) -> f64 {
    (seconds * TICKS_PER_SEC as f64).round() / TICKS_PER_SEC as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_token() {
        let parsed = parse("None");
        assert_eq!(parsed.seconds, 0.0);
        assert_eq!(parsed.issue, None);
        assert_eq!(format(0.0), "None");
    }

    #[test]
    fn test_parse_standard_timecodes() {
        assert_eq!(parse_seconds("00:00:50.0000000"), 50.0);
        assert_eq!(parse_seconds("00:02:00.0000000"), 120.0);
        assert_eq!(parse_seconds("01:01:01.2500000"), 3661.25);
        assert_eq!(parse_seconds(" 00:00:01.5000000\n"), 1.5);
    }

    #[test]
    fn test_parse_day_prefix() {
        assert_eq!(parse_seconds("1.00:00:00.0000000"), 86_400.0);
        assert_eq!(parse_seconds("2.03:04:05.5000000"), 2.0 * 86_400.0 + 11_045.5);
    }

    #[test]
    fn test_parse_without_fraction_is_flagged() {
        let parsed = parse("00:01:07");
        assert_eq!(parsed.seconds, 67.0);
        assert_eq!(parsed.issue, Some(TimecodeIssue::MissingFraction));
        assert!(!parsed.is_invalid());
    }

    #[test]
    fn test_parse_invalid_returns_zero() {
        for text in [
            "", "abc", "12", "00:01", "aa:bb:cc.0", "00:0x:00.1", "1.2.3", "00:00:01.5e3",
            "9999999999999999999:00:00.0000000",
            "999999999999999.00:00:00.0000000",
            "00:99999999999999999999:00.0000000",
        ] {
            let parsed = parse(text);
            assert_eq!(parsed.seconds, 0.0, "input {:?}", text);
            assert!(parsed.is_invalid(), "input {:?}", text);
        }
    }

    #[test]
    fn test_format_components() {
        assert_eq!(format(50.0), "00:00:50.0000000");
        assert_eq!(format(100.0), "00:01:40.0000000");
        assert_eq!(format(3661.25), "01:01:01.2500000");
        assert_eq!(format(0.1234567), "00:00:00.1234567");
        assert_eq!(format(86_400.0), "1.00:00:00.0000000");
    }

    #[test]
    fn test_format_carries_rounded_fraction() {
        // .99999999 rounds up into the next whole second
        assert_eq!(format(59.999_999_99), "00:01:00.0000000");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format(-1.5), "-00:00:01.5000000");
    }

    #[test]
    fn test_normalizes_short_fields() {
        assert_eq!(format(parse_seconds("0:1:2.5")), "00:01:02.5000000");
        assert_eq!(format(parse_seconds("00:00:03.25")), "00:00:03.2500000");
    }

    #[test]
    fn test_round_ticks() {
        assert_eq!(round_ticks(0.1 + 0.2), 0.3);
        assert_eq!(round_ticks(120.000_000_04), 120.0);
    }
}
