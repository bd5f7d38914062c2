use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use super::{IntensityThresholds, LineError, WarningKind, token};
use crate::workout::{Bounds, Intensity, Target};

/// A named shorthand with a fixed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SpecialBlock {
    Warmup,
    Cooldown,
    Recovery,
    Open,
}

/// One line, before expansion into steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ParsedLine {
    pub duration_seconds: u32,
    /// Absent only for special blocks.
    pub target: Option<Target>,
    pub cadence: Option<Bounds<u8>>,
    pub note: Option<String>,
    pub intensity: Option<Intensity>,
    pub repeat_count: u16,
    pub special: Option<SpecialBlock>,
}

/// Special block keywords, longest first.
const SPECIAL_BLOCKS: &[(&str, SpecialBlock)] = &[
    ("warm-up", SpecialBlock::Warmup),
    ("warm up", SpecialBlock::Warmup),
    ("warmup", SpecialBlock::Warmup),
    ("cool-down", SpecialBlock::Cooldown),
    ("cool down", SpecialBlock::Cooldown),
    ("cooldown", SpecialBlock::Cooldown),
    ("recovery", SpecialBlock::Recovery),
    ("free ride", SpecialBlock::Open),
    ("freeride", SpecialBlock::Open),
    ("free", SpecialBlock::Open),
    ("open", SpecialBlock::Open),
    ("rest", SpecialBlock::Recovery),
];

fn keyword_intensity(token: &str) -> Option<Intensity> {
    let intensity = match token {
        "warmup" | "warm-up" | "cooldown" | "cool-down" => Intensity::Warmup,
        "recovery" | "rest" | "easy" => Intensity::Rest,
        "endurance" | "tempo" | "threshold" | "sweetspot" => Intensity::Active,
        "vo2" | "vo2max" | "interval" | "sprint" | "anaerobic" => Intensity::Interval,
        _ => None?,
    };

    Some(intensity)
}

/// Intensity keywords written as two words. `first` is lowercase.
fn keyword_pair(first: &str, second: &str) -> Option<Intensity> {
    match (first, second.to_ascii_lowercase().as_str()) {
        ("sweet", "spot") => Some(Intensity::Active),
        _ => None,
    }
}

/// Parse one trimmed, non-empty, non-comment line.
pub(super) fn parse(
    line: &str,
    thresholds: &IntensityThresholds,
    warnings: &mut Vec<WarningKind>,
) -> Result<ParsedLine, LineError> {
    let (note, rest) = take_note(line);
    let (repeat_count, rest) = take_repeat(&rest)?;

    if let Some((special, rest)) = take_special(rest) {
        if repeat_count > 1 {
            warnings.push(WarningKind::IgnoredRepeat(repeat_count));
        }

        let first = rest
            .split_whitespace()
            .next()
            .ok_or_else(|| LineError::MissingDuration(line.to_string()))?;

        return Ok(ParsedLine {
            duration_seconds: seconds(first)?,
            target: None,
            cadence: None,
            note,
            intensity: None,
            repeat_count: 1,
            special: Some(special),
        });
    }

    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let (duration_seconds, mut i) = match tokens.as_slice() {
        [] => Err(LineError::MissingDuration(line.to_string()))?,
        // A bare number followed by its unit.
        [value, unit, ..] if is_number(value) && token::unit_seconds(unit).is_some() => {
            let joined = [*value, *unit].concat();
            (seconds(&joined)?, 2)
        }
        [first, ..] => (seconds(first)?, 1),
    };

    let mut target = None;
    let mut derived = None;

    if let Some((bounds, unit, used)) = token::heart_rate(&tokens[i..]) {
        target = Some(Target::HeartRate(bounds, unit));
        i += used;
    } else if let Some((bounds, used)) = token::power(&tokens[i..]) {
        target = Some(Target::Power(bounds));
        derived = Some(thresholds.classify(bounds.low, bounds.high));
        i += used;
    } else if let Some(t) = tokens.get(i).filter(|t| is_target_like(t)) {
        Err(LineError::InvalidTarget(t.to_string()))?;
    }

    let mut cadence = None;
    let mut open = false;
    let mut keyword = None;

    let mut rest = &tokens[i..];

    while let [t, tail @ ..] = rest {
        rest = tail;

        let lower = t.to_ascii_lowercase();
        let invalid = || LineError::InvalidTarget(t.to_string());

        if lower.starts_with('@') {
            cadence = Some(token::cadence(t).ok_or_else(invalid)?);
        } else if matches!(lower.as_str(), "open" | "free" | "freeride") {
            open = true;
        } else if let [next, after @ ..] = tail
            && let Some(intensity) = keyword_pair(&lower, next)
        {
            keyword.get_or_insert(intensity);
            rest = after;
        } else if let Some(intensity) = keyword_intensity(&lower) {
            keyword.get_or_insert(intensity);
        } else if is_target_like(&lower) {
            Err(invalid())?;
        } else {
            warnings.push(WarningKind::UnknownToken(t.to_string()));
        }
    }

    let target = match (target, cadence) {
        (Some(target), _) => target,
        (None, _) if open => Target::Open,
        (None, Some(bounds)) => {
            cadence = None;
            Target::Cadence(bounds)
        }
        (None, None) => Err(LineError::MissingTarget(line.to_string()))?,
    };

    Ok(ParsedLine {
        duration_seconds,
        target: Some(target),
        cadence,
        note,
        intensity: keyword.or(derived),
        repeat_count,
        special: None,
    })
}

/// Remove the first double-quoted note from a line.
fn take_note(line: &str) -> (Option<String>, String) {
    let quoted = line.find('"').and_then(|start| {
        let end = start + 1 + line[start + 1..].find('"')?;
        Some((start, end))
    });

    match quoted {
        Some((start, end)) if end > start + 1 => {
            let note = line[start + 1..end].trim().to_string();
            let rest = [&line[..start], " ", &line[end + 1..]].concat();
            (Some(note).filter(|n| !n.is_empty()), rest)
        }
        _ => (None, line.to_string()),
    }
}

/// Remove a leading `3x` or `3 x` repeat prefix, returning the count.
fn take_repeat(line: &str) -> Result<(u16, &str), LineError> {
    let line = line.trim_start();
    let mut words = line.splitn(2, char::is_whitespace);
    let first = words.next().unwrap_or_default();
    let after = words.next().unwrap_or_default().trim_start();

    let (count, rest) = match first.strip_suffix(['x', 'X']) {
        Some(count) if is_integer(count) => (count, after),
        _ if is_integer(first) => {
            let mut words = after.splitn(2, char::is_whitespace);
            match words.next() {
                Some("x" | "X") => (first, words.next().unwrap_or_default()),
                _ => return Ok((1, line)),
            }
        }
        _ => return Ok((1, line)),
    };

    match count.parse::<u16>() {
        Ok(count) if count > 0 => Ok((count, rest)),
        _ => Err(LineError::InvalidRepeat([count, "x"].concat())),
    }
}

/// Match a special block keyword at the start of a line, at a word boundary.
fn take_special(line: &str) -> Option<(SpecialBlock, &str)> {
    let line = line.trim_start();

    SPECIAL_BLOCKS.iter().find_map(|&(keyword, special)| {
        let head = line.get(..keyword.len())?;
        let rest = &line[keyword.len()..];

        let boundary = rest.chars().next().is_none_or(char::is_whitespace);
        (head.eq_ignore_ascii_case(keyword) && boundary).then_some((special, rest))
    })
}

fn seconds(token: &str) -> Result<u32, LineError> {
    let seconds =
        token::duration(token).ok_or_else(|| LineError::InvalidDuration(token.to_string()))?;

    match token::whole_seconds(seconds) {
        0 => Err(LineError::ZeroDuration),
        seconds => Ok(seconds),
    }
}

fn is_integer(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_number(token: &str) -> bool {
    token.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// Whether a token looks like a power or heart rate target that failed to
/// parse.
fn is_target_like(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    !lower.starts_with('@') && (lower.contains('%') || lower.ends_with("bpm"))
}
