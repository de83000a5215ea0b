//! # Duration Normalizer
//!
//! InfluxDB spells the same retention duration many ways: schema files tend to
//! use compact literals (`2w`, `100d`), while the server echoes Go-style
//! composites (`168h0m0s`). Both are sequences of `<integer><unit>` segments,
//! so everything is reduced to total seconds before comparison.
//!
//! `INF` maps to zero seconds, mirroring how InfluxDB itself reports infinite
//! retention as a zero duration.

/// Seconds per duration unit, keyed by the (lower-cased) unit character.
const UNIT_SECONDS: &[(char, u64)] = &[
    ('s', 1),
    ('m', 60),
    ('h', 3600),
    ('d', 86400),
    ('w', 604800),
];

fn unit_seconds(unit: char) -> Option<u64> {
    UNIT_SECONDS
        .iter()
        .find(|(u, _)| *u == unit)
        .map(|(_, secs)| *secs)
}

/// Converts a duration literal to a canonical number of seconds.
///
/// Accepts one or more `<integer><unit>` segments (units: `s`, `m`, `h`, `d`,
/// `w`, case-insensitive) or the literal `INF`. Well-formedness is the
/// statement parser's concern; a malformed segment terminates the scan and
/// contributes nothing rather than panicking.
pub fn normalize_duration(literal: &str) -> u64 {
    let literal = literal.trim();
    if literal.eq_ignore_ascii_case("inf") {
        return 0;
    }

    let mut total = 0u64;
    let mut value = 0u64;
    let mut has_digits = false;
    for c in literal.chars() {
        if let Some(digit) = c.to_digit(10) {
            value = value.saturating_mul(10).saturating_add(digit as u64);
            has_digits = true;
        } else {
            match unit_seconds(c.to_ascii_lowercase()) {
                Some(secs) if has_digits => {
                    total = total.saturating_add(value.saturating_mul(secs))
                }
                _ => break,
            }
            value = 0;
            has_digits = false;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_unit_literals() {
        assert_eq!(normalize_duration("30s"), 30);
        assert_eq!(normalize_duration("5m"), 300);
        assert_eq!(normalize_duration("24h"), 86400);
        assert_eq!(normalize_duration("100d"), 8_640_000);
        assert_eq!(normalize_duration("2w"), 1_209_600);
    }

    #[test]
    fn test_equivalent_spellings() {
        assert_eq!(normalize_duration("2w"), normalize_duration("14d"));
        assert_eq!(normalize_duration("2w"), normalize_duration("336h"));
        assert_eq!(normalize_duration("1d"), normalize_duration("24h"));
    }

    #[test]
    fn test_go_style_composite() {
        // The server reports durations in Go's composite format.
        assert_eq!(normalize_duration("168h0m0s"), normalize_duration("1w"));
        assert_eq!(normalize_duration("1h30m"), 5400);
    }

    #[test]
    fn test_infinite_retention_is_zero() {
        assert_eq!(normalize_duration("INF"), 0);
        assert_eq!(normalize_duration("inf"), 0);
    }

    #[test]
    fn test_case_insensitive_units() {
        assert_eq!(normalize_duration("2W"), normalize_duration("2w"));
        assert_eq!(normalize_duration("10D"), normalize_duration("10d"));
    }

    #[test]
    fn test_absurd_literal_saturates_instead_of_overflowing() {
        assert_eq!(normalize_duration("99999999999999999999999w"), u64::MAX);
        assert_eq!(normalize_duration("18446744073709551615s1h"), u64::MAX);
    }

    #[test]
    fn test_malformed_tail_is_ignored() {
        // A unit without preceding digits terminates the scan.
        assert_eq!(normalize_duration("1hx"), 3600);
        assert_eq!(normalize_duration(""), 0);
    }
}
