//! Argument parsing tests

use flight_console::config::{FEATURE_NAMES, MIXER_NAMES};
use flight_console::console::parser::{find_by_prefix, parse_float, parse_int, starts_with_ignore_case};

#[test]
fn test_parse_int_stops_at_junk() {
    assert_eq!(parse_int("400"), 400);
    assert_eq!(parse_int("12abc"), 12);
    assert_eq!(parse_int(" -5"), -5);
    assert_eq!(parse_int("3 4"), 3);
}

#[test]
fn test_parse_int_no_digits_is_zero() {
    assert_eq!(parse_int(""), 0);
    assert_eq!(parse_int("-"), 0);
    assert_eq!(parse_int("x1"), 0);
}

#[test]
fn test_parse_int_wraps_on_overflow() {
    assert_eq!(parse_int("4294967296"), 0);
    assert_eq!(parse_int("2147483648"), i32::MIN);
}

#[test]
fn test_parse_float_forms() {
    assert_eq!(parse_float("1.5"), 1.5);
    assert_eq!(parse_float("-0.666667"), -0.666667);
    assert_eq!(parse_float("10"), 10.0);
    assert_eq!(parse_float("1e3"), 1000.0);
    assert_eq!(parse_float("0.5 0.25"), 0.5);
    assert_eq!(parse_float("abc"), 0.0);
}

#[test]
fn test_starts_with_ignore_case() {
    assert!(starts_with_ignore_case("QUADX", "quad"));
    assert!(starts_with_ignore_case("list", ""));
    assert!(!starts_with_ignore_case("list", "lists"));
}

#[test]
fn test_mixer_prefix_takes_first_in_table_order() {
    assert_eq!(find_by_prefix(MIXER_NAMES, "quad"), Some(1));
    assert_eq!(find_by_prefix(MIXER_NAMES, "QUADX"), Some(2));
    assert_eq!(find_by_prefix(MIXER_NAMES, "hex6"), Some(6));
    assert_eq!(find_by_prefix(MIXER_NAMES, "custom"), Some(MIXER_NAMES.len() - 1));
    assert_eq!(find_by_prefix(MIXER_NAMES, "QUADXX"), None);
}

#[test]
fn test_feature_prefix_bounded_by_input() {
    assert_eq!(find_by_prefix(FEATURE_NAMES, "vbat"), Some(1));
    assert_eq!(find_by_prefix(FEATURE_NAMES, "s"), Some(3));
    assert_eq!(find_by_prefix(FEATURE_NAMES, "spek"), Some(6));
    assert_eq!(find_by_prefix(FEATURE_NAMES, ""), Some(0));
}
