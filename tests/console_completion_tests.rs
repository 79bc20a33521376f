//! Tab completion tests against the real command table

use flight_console::console::commands::{command_names, COMMANDS};
use flight_console::console::completion::complete;
use flight_console::console::line_buffer::LineBuffer;

fn line(s: &str) -> LineBuffer {
    let mut l = LineBuffer::new();
    for b in s.bytes() {
        l.push(b);
    }
    l
}

/// Indices of every command the prefix matches, by plain scan
fn brute_force(prefix: &str) -> Vec<usize> {
    COMMANDS
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name.to_ascii_lowercase().starts_with(&prefix.to_ascii_lowercase()))
        .map(|(i, _)| i)
        .collect()
}

fn longest_common_prefix(names: &[&str]) -> String {
    let first = names[0].as_bytes();
    let mut len = first.len();
    for n in &names[1..] {
        len = len.min(n.len());
        len = first
            .iter()
            .zip(n.as_bytes())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    String::from_utf8(first[..len].to_vec()).unwrap()
}

#[test]
fn test_complete_unique_command() {
    let mut l = line("he");
    let c = complete(&mut l, command_names());

    assert_eq!(l.as_str(), "help ");
    assert!(c.is_unique());
    assert!(!c.redraw);
}

#[test]
fn test_complete_ambiguous_stays_at_prefix() {
    let mut l = line("s");
    let c = complete(&mut l, command_names());

    // save, set, status
    assert_eq!(l.as_str(), "s");
    assert_eq!(c.candidates.map(|r| r.count()), Some(3));
    assert!(c.redraw);
}

#[test]
fn test_complete_empty_line_redraws_all() {
    let mut l = LineBuffer::new();
    let c = complete(&mut l, command_names());

    assert_eq!(l.as_str(), "");
    assert_eq!(c.candidates, Some(0..=COMMANDS.len() - 1));
    assert!(c.redraw);
}

#[test]
fn test_complete_no_match() {
    let mut l = line("xyz");
    let c = complete(&mut l, command_names());

    assert_eq!(l.as_str(), "xyz");
    assert_eq!(c.candidates, None);
}

#[test]
fn test_complete_after_full_name_with_args() {
    // "set x" is no command name prefix: nothing matches
    let mut l = line("set x");
    let c = complete(&mut l, command_names());
    assert_eq!(c.candidates, None);
    assert_eq!(l.as_str(), "set x");
}

#[test]
fn test_complete_matches_brute_force_for_every_prefix() {
    for cmd in COMMANDS {
        for end in 0..=cmd.name.len() {
            let prefix = &cmd.name[..end];
            let expected = brute_force(prefix);

            let mut l = line(prefix);
            let c = complete(&mut l, command_names());

            let found: Vec<usize> = c.candidates.clone().map(|r| r.collect()).unwrap_or_default();
            assert_eq!(found, expected, "candidates for '{}'", prefix);

            let names: Vec<&str> = expected.iter().map(|&i| COMMANDS[i].name).collect();
            let common = longest_common_prefix(&names);
            if names.len() == 1 {
                assert_eq!(l.as_str(), format!("{} ", common), "unique completion of '{}'", prefix);
            } else {
                assert_eq!(l.as_str(), common, "common prefix of '{}'", prefix);
            }
        }
    }
}

#[test]
fn test_complete_uppercase_prefix() {
    let mut l = line("VER");
    complete(&mut l, command_names());
    assert_eq!(l.as_str(), "VERsion ");
}
