//! Parsing plain-text workout descriptions.
//!
//! A description has one step per line:
//!
//! ```text
//! # Sweet spot
//! warmup 10min
//! 3x 8min 88-94% FTP @90rpm "stay seated"
//! recovery 4min
//! 5min 75% HR
//! cooldown 10min
//! ```
//!
//! Each line is, in order: an optional repeat prefix (`3x`), a duration
//! (`8min`, `30s`, `1.5h`, or a bare number of minutes), and a target. Targets
//! are power in percent of threshold power (`90%`, `85-95% FTP`), heart rate
//! (`150bpm`, `75% HR`), cadence (`@90rpm`), or `open` for free riding. A
//! cadence alongside another target is kept as a secondary target. Intensity
//! keywords (`tempo`, `vo2max`, `easy`, ...) and a double-quoted note may
//! appear anywhere after the duration.
//!
//! Lines starting with `warmup`, `cooldown`, `recovery` or `open` (and a few
//! aliases) are special blocks: only a duration follows, and fixed targets
//! apply. Blank lines and lines starting with `#` or `//` are ignored.
//!
//! A line that fails to parse is reported and skipped; the rest of the text is
//! still parsed.

mod block;
mod line;
pub mod token;

use alloc::{string::String, vec::Vec};
use core::fmt;

use thiserror::Error;
use tracing::{debug, trace};

use crate::workout::{Intensity, Workout};

/// Cut points classifying a power target's intensity, in percent of threshold
/// power. The average of the low and high bounds is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct IntensityThresholds {
    /// Targets below this are rest.
    pub rest_below: u16,
    /// Targets below this (and not rest) are active; the rest are intervals.
    pub active_below: u16,
}

impl Default for IntensityThresholds {
    fn default() -> Self {
        Self {
            rest_below: 50,
            active_below: 90,
        }
    }
}

impl IntensityThresholds {
    pub fn classify(&self, low: u16, high: u16) -> Intensity {
        let average = (u32::from(low) + u32::from(high)) / 2;

        if average < u32::from(self.rest_below) {
            Intensity::Rest
        } else if average < u32::from(self.active_below) {
            Intensity::Active
        } else {
            Intensity::Interval
        }
    }
}

/// Options for [`parse_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ParseOptions {
    /// Name given to the workout.
    pub name: String,
    /// Threshold power in watts, carried to the workout for presentation.
    pub ftp: Option<u16>,
    /// Maximum heart rate, carried to the workout for presentation.
    pub max_heart_rate: Option<u8>,
    pub thresholds: IntensityThresholds,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            name: String::from("Custom Workout"),
            ftp: None,
            max_heart_rate: None,
            thresholds: IntensityThresholds::default(),
        }
    }
}

/// A reason a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("No duration found in '{0}'.")]
    MissingDuration(String),
    #[error("Invalid duration '{0}'.")]
    InvalidDuration(String),
    #[error("Duration must be at least one second.")]
    ZeroDuration,
    #[error("Invalid repeat count '{0}'.")]
    InvalidRepeat(String),
    #[error("Invalid target '{0}'.")]
    InvalidTarget(String),
    #[error("No power, heart rate or cadence target found in '{0}'.")]
    MissingTarget(String),
}

/// Errors produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line was rejected and contributed no steps.
    #[error("Line {line}: {error}")]
    Line { line: usize, error: LineError },
    /// The text holds nothing but whitespace.
    #[error("Workout text is empty.")]
    EmptyInput,
    /// No line produced a step.
    #[error("No valid workout steps found.")]
    NoSteps,
}

/// Something ignored while parsing a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarningKind {
    #[error("Unrecognised '{0}' ignored.")]
    UnknownToken(String),
    #[error("Repeat count {0}x ignored on a special block.")]
    IgnoredRepeat(u16),
}

/// A non-fatal observation about a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The 1-based line number.
    pub line: usize,
    pub kind: WarningKind,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.kind)
    }
}

/// The outcome of parsing a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    /// The workout, present if at least one step was built.
    pub workout: Option<Workout>,
    /// Errors, including those of lines skipped in a successful parse.
    pub errors: Vec<ParseError>,
    pub warnings: Vec<Warning>,
}

impl Parse {
    pub fn is_success(&self) -> bool {
        self.workout.is_some()
    }
}

/// Parse a description with default options.
pub fn parse(text: &str) -> Parse {
    parse_with(text, &ParseOptions::default())
}

/// Parse a description.
///
/// Line numbers in errors and warnings count every line of `text`, including
/// blank lines and comments.
pub fn parse_with(text: &str, options: &ParseOptions) -> Parse {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if text.trim().is_empty() {
        errors.push(ParseError::EmptyInput);
        return Parse {
            workout: None,
            errors,
            warnings,
        };
    }

    let mut steps = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let number = number + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let mut kinds = Vec::new();
        let parsed = line::parse(line, &options.thresholds, &mut kinds);

        warnings.extend(kinds.into_iter().map(|kind| Warning { line: number, kind }));

        match parsed {
            Ok(parsed) => {
                trace!(line = number, ?parsed, "Parsed line");
                block::build(parsed, &mut steps);
            }
            Err(error) => {
                debug!(line = number, %error, "Skipping line");
                errors.push(ParseError::Line {
                    line: number,
                    error,
                });
            }
        }
    }

    debug!(
        steps = steps.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        "Parsed workout text"
    );

    if steps.is_empty() {
        errors.push(ParseError::NoSteps);
        return Parse {
            workout: None,
            errors,
            warnings,
        };
    }

    let mut workout = Workout::new(options.name.clone(), steps);
    workout.ftp = options.ftp;
    workout.max_heart_rate = options.max_heart_rate;

    Parse {
        workout: Some(workout),
        errors,
        warnings,
    }
}
