//! Argument text helpers
//!
//! Lenient numeric parsing (leading number, trailing junk ignored,
//! no number at all reads as zero) and ASCII case-insensitive matching.

/// Parse a leading signed decimal integer.
///
/// Leading whitespace is skipped, parsing stops at the first non-digit,
/// text without digits yields 0. Overflow wraps.
pub fn parse_int(text: &str) -> i32 {
    let bytes = text.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: i32 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i32);
    }

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Parse a leading decimal floating point number.
///
/// Accepts `[+-]digits[.digits][e[+-]digits]`; anything after the number
/// is ignored and text without a number yields 0.0.
pub fn parse_float(text: &str) -> f32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    end += count_digits(&bytes[end..]);
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        end += count_digits(&bytes[end..]);
    }

    // Exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f32>().unwrap_or(0.0)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// True if `prefix` is an ASCII case-insensitive prefix of `s`.
///
/// An empty prefix matches everything.
pub fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Index of the first name that `input` is a case-insensitive prefix of.
///
/// Linear scan in table order, bounded by the length of `input`.
pub fn find_by_prefix(names: &[&str], input: &str) -> Option<usize> {
    names.iter().position(|name| starts_with_ignore_case(name, input))
}
