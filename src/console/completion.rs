//! Tab completion over a sorted name table
//!
//! All names sharing the typed prefix form one contiguous run of a sorted
//! table, so the run is fully described by its first and last entry and
//! their common prefix is the common prefix of every candidate. An
//! unsorted table breaks this.

use core::ops::RangeInclusive;

use super::line_buffer::LineBuffer;
use super::parser::starts_with_ignore_case;

/// Outcome of one completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Line length before completion; bytes past it were appended
    pub start: usize,
    /// Table indices from first to last matching name
    pub candidates: Option<RangeInclusive<usize>>,
    /// Candidate list must be printed and the line redrawn
    pub redraw: bool,
}

impl Completion {
    /// True if exactly one name matched
    pub fn is_unique(&self) -> bool {
        matches!(&self.candidates, Some(r) if r.start() == r.end())
    }
}

/// Complete `line` against `names` (sorted).
///
/// The line is extended while the first and last candidates agree; when
/// the end of a name is reached unambiguously a space is appended. A
/// redraw is requested when the result is still ambiguous or the line was
/// empty.
pub fn complete<'a, I>(line: &mut LineBuffer, names: I) -> Completion
where
    I: IntoIterator<Item = &'a str>,
{
    let start = line.len();

    let mut first: Option<(usize, &str)> = None;
    let mut last: Option<(usize, &str)> = None;
    for (idx, name) in names.into_iter().enumerate() {
        if !starts_with_ignore_case(name, line.as_str()) {
            continue;
        }
        if first.is_none() {
            first = Some((idx, name));
        }
        last = Some((idx, name));
    }

    let candidates = match (first, last) {
        (Some((first_idx, first_name)), Some((last_idx, last_name))) => {
            extend_common(line, first_name.as_bytes(), last_name.as_bytes());
            Some(first_idx..=last_idx)
        }
        _ => None,
    };

    let ambiguous = matches!(&candidates, Some(r) if r.start() != r.end());
    let redraw = start == 0 || ambiguous;

    Completion { start, candidates, redraw }
}

/// Append bytes while `a` and `b` agree past the current line end.
fn extend_common(line: &mut LineBuffer, a: &[u8], b: &[u8]) {
    let mut pos = line.len();
    loop {
        let (ca, cb) = (a.get(pos), b.get(pos));
        if ca != cb {
            break;
        }
        match ca {
            // Both names end here: unambiguous
            None => {
                line.push(b' ');
                break;
            }
            Some(&c) => {
                if !line.push(c) {
                    break;
                }
            }
        }
        pos += 1;
    }
}
