//! Property tests for timecode parsing and formatting

use lssr_common::timecode::{format, parse, round_ticks};
use proptest::prelude::*;

proptest! {
    /// Formatting then parsing recovers the value to 7 decimal places
    #[test]
    fn prop_parse_inverts_format(ticks in 1u64..10_000_000_000_000) {
        let seconds = ticks as f64 / 10_000_000.0;
        let parsed = parse(&format(seconds));

        prop_assert!(parsed.issue.is_none());
        prop_assert!((parsed.seconds - round_ticks(seconds)).abs() < 1e-6);
    }

    /// Any well-formed timecode re-formats to its normalized spelling
    #[test]
    fn prop_format_normalizes_parsed_text(
        days in 0u64..5,
        hours in 0u64..24,
        minutes in 0u64..60,
        secs in 0u64..60,
        fraction in 0u64..10_000_000,
    ) {
        prop_assume!(days + hours + minutes + secs + fraction > 0);

        let clock = format!("{:02}:{:02}:{:02}.{:07}", hours, minutes, secs, fraction);
        let text = if days > 0 { format!("{}.{}", days, clock) } else { clock };

        prop_assert_eq!(format(parse(&text).seconds), text);
    }
}
