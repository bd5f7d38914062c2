//! The structured workout model shared by the parser and the codec.
//!
//! Steps are stored in playback order with repeats already unrolled. Power
//! targets are percentages of threshold power, so a workout is independent of
//! the rider; the optional reference values on [`Workout`] only feed the
//! presentation helpers.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

/// A pair of bounds. Equal bounds describe a steady target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds<T> {
    pub low: T,
    pub high: T,
}

impl<T: Copy + PartialEq> Bounds<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    pub fn steady(value: T) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    pub fn is_steady(&self) -> bool {
        self.low == self.high
    }
}

impl<T: fmt::Display + PartialEq> fmt::Display for Bounds<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// The shape of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Steady,
    Ramp,
    Warmup,
    Cooldown,
    Recovery,
    /// Free riding, without a target.
    Open,
}

/// How heart rate bounds are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeartRateUnit {
    PercentOfMax,
    BeatsPerMinute,
}

/// What a step asks the rider to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Power, in percent of threshold power. A ramp runs linearly from `low`
    /// to `high` over the step.
    Power(Bounds<u16>),
    HeartRate(Bounds<u8>, HeartRateUnit),
    /// Cadence, in revolutions per minute.
    Cadence(Bounds<u8>),
    Open,
}

/// The metric a [`Target`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Power,
    HeartRate,
    Cadence,
    Open,
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Power(_) => TargetKind::Power,
            Self::HeartRate(..) => TargetKind::HeartRate,
            Self::Cadence(_) => TargetKind::Cadence,
            Self::Open => TargetKind::Open,
        }
    }
}

/// Intensity tag, used by devices for display and colouring only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intensity {
    #[default]
    Active,
    Rest,
    Warmup,
    Cooldown,
    Recovery,
    Interval,
}

/// Marks a step as copy `index` (zero-based) of `count` unrolled from one
/// repeated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Repetition {
    pub index: u16,
    pub count: u16,
}

/// A single step of a workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutStep {
    pub kind: StepKind,
    pub duration_seconds: u32,
    pub target: Target,
    /// Secondary cadence target, alongside a power or heart rate target.
    pub cadence: Option<Bounds<u8>>,
    pub note: Option<String>,
    pub name: Option<String>,
    pub intensity: Intensity,
    pub repetition: Option<Repetition>,
}

impl WorkoutStep {
    /// A step with the given target and no optional extras.
    pub fn new(kind: StepKind, duration_seconds: u32, target: Target) -> Self {
        Self {
            kind,
            duration_seconds,
            target,
            cadence: None,
            note: None,
            name: None,
            intensity: Intensity::Active,
            repetition: None,
        }
    }

    /// Power bounds, for power targets.
    pub fn power(&self) -> Option<Bounds<u16>> {
        match self.target {
            Target::Power(bounds) => Some(bounds),
            _ => None,
        }
    }

    pub fn power_low(&self) -> Option<u16> {
        self.power().map(|b| b.low)
    }

    pub fn power_high(&self) -> Option<u16> {
        self.power().map(|b| b.high)
    }

    /// The step's name, or one derived from its target.
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        match self.target {
            Target::Power(bounds) if bounds.is_steady() => format!("{bounds}% FTP"),
            Target::Power(bounds) => format!("Ramp {}%-{}%", bounds.low, bounds.high),
            Target::HeartRate(bounds, HeartRateUnit::PercentOfMax) => format!("{bounds}% HR"),
            Target::HeartRate(bounds, HeartRateUnit::BeatsPerMinute) => format!("{bounds} bpm"),
            Target::Cadence(bounds) => format!("{bounds} rpm"),
            Target::Open => "Free ride".to_string(),
        }
    }

    /// A one-line description of the step, converting relative targets to
    /// absolute values where a reference is known.
    pub fn describe(&self, ftp: Option<u16>, max_heart_rate: Option<u8>) -> String {
        let mut line = format_duration(self.duration_seconds);

        match self.target {
            Target::Power(bounds) => {
                line += &format!(" {}-{}% FTP", bounds.low, bounds.high);
                if let Some(ftp) = ftp {
                    let watts = |pct: u16| u32::from(pct) * u32::from(ftp) / 100;
                    line += &format!(" ({}-{}W)", watts(bounds.low), watts(bounds.high));
                }
            }
            Target::HeartRate(bounds, HeartRateUnit::PercentOfMax) => {
                line += &format!(" {}-{}% HR", bounds.low, bounds.high);
                if let Some(max) = max_heart_rate {
                    let bpm = |pct: u8| u32::from(pct) * u32::from(max) / 100;
                    line += &format!(" ({}-{} bpm)", bpm(bounds.low), bpm(bounds.high));
                }
            }
            Target::HeartRate(bounds, HeartRateUnit::BeatsPerMinute) => {
                line += &format!(" {}-{} bpm", bounds.low, bounds.high);
            }
            Target::Cadence(bounds) => line += &format!(" {bounds} rpm"),
            Target::Open => line += " Open (free ride)",
        }

        if let Some(cadence) = self.cadence {
            line += &format!(" @{cadence}rpm");
        }

        if let Some(note) = &self.note {
            line += &format!(" \"{note}\"");
        }

        line
    }
}

/// A complete workout, in playback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub name: String,
    pub steps: Vec<WorkoutStep>,
    /// Threshold power in watts, for presentation.
    pub ftp: Option<u16>,
    /// Maximum heart rate in beats per minute, for presentation.
    pub max_heart_rate: Option<u8>,
}

impl Workout {
    pub fn new(name: impl Into<String>, steps: Vec<WorkoutStep>) -> Self {
        Self {
            name: name.into(),
            steps,
            ftp: None,
            max_heart_rate: None,
        }
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration_seconds)).sum()
    }

    /// Total duration as `H:MM:SS`, or `M:SS` under an hour.
    pub fn total_duration_formatted(&self) -> String {
        let total = self.total_duration_seconds();
        let (hours, rest) = (total / 3600, total % 3600);
        let (minutes, seconds) = (rest / 60, rest % 60);

        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

/// Format a duration compactly, in the largest unit it reaches.
pub fn format_duration(seconds: u32) -> String {
    let seconds = f64::from(seconds);

    if seconds >= 3600.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else if seconds >= 60.0 {
        format!("{:.1}min", seconds / 60.0)
    } else {
        format!("{seconds:.0}s")
    }
}
