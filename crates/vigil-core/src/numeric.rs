#![forbid(unsafe_code)]

//! Lenient numeric parsing with web-form semantics.
//!
//! Constraint parameters and field values arrive as strings authored in
//! markup. Both parsers read the longest numeric prefix and ignore trailing
//! garbage (`"12px"` is `12`), returning `None` where a browser would yield
//! `NaN`. Comparisons against `None` are treated as failures by callers.

/// Parse the leading decimal number of `input`.
///
/// Accepts leading whitespace, an optional sign, `Infinity`, digits with an
/// optional fraction, and an optional exponent.
#[must_use]
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    // A trailing '.' with digits before it is still a valid Rust float.
    s[..end].parse::<f64>().ok()
}

/// Parse the leading integer of `input`.
///
/// Decimal by default; a `0x`/`0X` prefix switches to hexadecimal.
#[must_use]
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let len = digits
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(digits.len(), |(idx, _)| idx);
    if len == 0 {
        return None;
    }
    let magnitude = i64::from_str_radix(&digits[..len], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn float_reads_longest_prefix() {
        assert_eq!(parse_float_prefix("12px"), Some(12.0));
        assert_eq!(parse_float_prefix("  -3.5e2x"), Some(-350.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("7."), Some(7.0));
        assert_eq!(parse_float_prefix("1e"), Some(1.0));
        assert_eq!(parse_float_prefix("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn float_rejects_non_numeric() {
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("-"), None);
    }

    #[test]
    fn int_reads_decimal_and_hex() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix(" 3.9"), Some(3));
        assert_eq!(parse_int_prefix("-8kb"), Some(-8));
        assert_eq!(parse_int_prefix("0x10"), Some(16));
        assert_eq!(parse_int_prefix("x10"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    proptest! {
        #[test]
        fn float_round_trips_integers(n in -1_000_000i64..1_000_000) {
            prop_assert_eq!(parse_float_prefix(&n.to_string()), Some(n as f64));
        }

        #[test]
        fn int_ignores_trailing_suffix(n in 1i64..1_000_000, suffix in "[a-z ]{0,6}") {
            let text = format!("{n}{suffix}");
            prop_assert_eq!(parse_int_prefix(&text), Some(n));
        }
    }
}
