//! Single-token values: durations, power, heart rate and cadence.
//!
//! Every function takes raw tokens as written and returns `None` for anything
//! it does not recognise. Matching is case-insensitive.

use crate::workout::{Bounds, HeartRateUnit};

/// Seconds in one unit of duration, or `None` for an unknown unit. The empty
/// unit is minutes.
pub fn unit_seconds(unit: &str) -> Option<f64> {
    let seconds = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "" | "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        _ => None?,
    };

    Some(seconds)
}

/// Parse a duration such as `5min`, `30s`, `1.5h` or `10`, in seconds.
pub fn duration(token: &str) -> Option<f64> {
    let split = token
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(token.len());
    let (value, unit) = token.split_at(split);

    Some(number(value)? * unit_seconds(unit)?)
}

/// Round seconds to whole seconds, saturating.
pub fn whole_seconds(seconds: f64) -> u32 {
    (seconds + 0.5) as u32
}

/// Parse a power target: `90%`, `85-95%`, `85%-95%`, or the spaced form
/// `85 - 95%`, optionally followed by `FTP` or `of FTP`.
///
/// Returns the bounds in percent of threshold power and the number of tokens
/// consumed.
pub fn power(tokens: &[&str]) -> Option<(Bounds<u16>, usize)> {
    let (low, high, used) = percent_range(tokens)?;

    let used = match &tokens[used..] {
        [ftp, ..] if ftp.eq_ignore_ascii_case("ftp") => used + 1,
        [of, ftp, ..] if of.eq_ignore_ascii_case("of") && ftp.eq_ignore_ascii_case("ftp") => {
            used + 2
        }
        _ => used,
    };

    Some((bounds(low, high)?, used))
}

/// Parse a heart rate target: `150bpm`, `140-160bpm`, `140-160 bpm`, or a
/// percentage followed by `HR` or `max HR` (`75% HR`, `70-80% max HR`).
///
/// Returns the bounds, their unit, and the number of tokens consumed.
pub fn heart_rate(tokens: &[&str]) -> Option<(Bounds<u8>, HeartRateUnit, usize)> {
    use HeartRateUnit::{BeatsPerMinute, PercentOfMax};

    let first = tokens.first()?.to_ascii_lowercase();

    if let Some(range) = first.strip_suffix("bpm") {
        let (low, high) = range_of(range)?;
        return Some((bounds(low, high)?, BeatsPerMinute, 1));
    }

    if tokens.get(1).is_some_and(|t| t.eq_ignore_ascii_case("bpm")) {
        let (low, high) = range_of(&first)?;
        return Some((bounds(low, high)?, BeatsPerMinute, 2));
    }

    if let Some(range) = first
        .strip_suffix("%hr")
        .or_else(|| first.strip_suffix("%maxhr"))
    {
        let (low, high) = percent_range_of(range)?;
        return Some((bounds(low, high)?, PercentOfMax, 1));
    }

    let (low, high, used) = percent_range(tokens)?;

    let used = match &tokens[used..] {
        [hr, ..] if hr.eq_ignore_ascii_case("hr") || hr.eq_ignore_ascii_case("maxhr") => used + 1,
        [max, hr, ..] if max.eq_ignore_ascii_case("max") && hr.eq_ignore_ascii_case("hr") => {
            used + 2
        }
        _ => None?,
    };

    Some((bounds(low, high)?, PercentOfMax, used))
}

/// Parse a cadence target: `@90rpm` or `@85-95rpm`.
pub fn cadence(token: &str) -> Option<Bounds<u8>> {
    let lower = token.to_ascii_lowercase();
    let range = lower.strip_prefix('@')?.strip_suffix("rpm")?;
    let (low, high) = range_of(range)?;

    bounds(low, high)
}

/// Whether a token is a hyphen or dash on its own.
fn is_dash(token: &str) -> bool {
    matches!(token, "-" | "–" | "—")
}

/// A percentage or percentage range in one or three tokens, and the number of
/// tokens used.
fn percent_range(tokens: &[&str]) -> Option<(f64, f64, usize)> {
    let first = tokens.first()?.to_ascii_lowercase();

    // Spaced form: `85 - 95%` or `85% - 95%`.
    if let [_, dash, last, ..] = tokens
        && is_dash(dash)
        && let Some(high) = last.strip_suffix('%')
    {
        let low = number(first.strip_suffix('%').unwrap_or(&first))?;
        return Some((low, number(high)?, 3));
    }

    let range = first
        .strip_suffix('%')
        .or_else(|| first.strip_suffix("%ftp"))?;
    let (low, high) = percent_range_of(range)?;

    Some((low, high, 1))
}

/// Parse `85`, `85-95` or `85%-95` (the trailing `%` already stripped).
fn percent_range_of(s: &str) -> Option<(f64, f64)> {
    match split_dash(s) {
        Some((low, high)) => {
            let low = low.strip_suffix('%').unwrap_or(low);
            Some((number(low)?, number(high)?))
        }
        None => {
            let value = number(s)?;
            Some((value, value))
        }
    }
}

/// Parse `140` or `140-160`.
fn range_of(s: &str) -> Option<(f64, f64)> {
    match split_dash(s) {
        Some((low, high)) => Some((number(low)?, number(high)?)),
        None => {
            let value = number(s)?;
            Some((value, value))
        }
    }
}

fn split_dash(s: &str) -> Option<(&str, &str)> {
    let at = s.find(['-', '–', '—'])?;
    let dash = s[at..].chars().next()?.len_utf8();

    Some((&s[..at], &s[at + dash..]))
}

/// A plain unsigned decimal number. Signs, exponents and special values are
/// rejected.
fn number(s: &str) -> Option<f64> {
    let digits = s.chars().filter(char::is_ascii_digit).count();
    let points = s.chars().filter(|&c| c == '.').count();

    if digits == 0 || points > 1 || digits + points != s.len() {
        return None;
    }

    s.parse().ok()
}

/// Round both bounds to the nearest integer, if representable.
fn bounds<T: TryFrom<u64> + Copy + PartialEq>(low: f64, high: f64) -> Option<Bounds<T>> {
    let round = |x: f64| T::try_from((x + 0.5) as u64).ok();

    Some(Bounds::new(round(low)?, round(high)?))
}
