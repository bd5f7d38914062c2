//! Workout documents: encoding a [`Workout`] and reading one back.
//!
//! Encoding walks a fixed sequence of states. Each state token owns the
//! document written so far and accepts exactly one kind of message:
//!
//! 1. [`FileIdState`] takes the `file_id` message;
//! 2. [`SummaryState`] takes the `workout` message, whose step count decides
//!    how many steps follow;
//! 3. [`StepState`] takes one `workout_step` message per step;
//! 4. [`EndState`] completes the document.
//!
//! Most users should call [`encode`] or [`encode_with`], which drive the
//! states from a [`Workout`].

use alloc::{format, string::String, vec::Vec};

use either::Either::{self, Left, Right};
use thiserror::Error;
use tracing::{debug, trace};

use super::{
    slice::{self, Record},
    writer::Writer,
};
use crate::{
    profile::{
        DateTime, FileIdMessage, FileType, HEART_RATE_OFFSET, MANUFACTURER_DEVELOPMENT,
        POWER_OFFSET, SerialNumber, Sport, WorkoutMessage, WorkoutStepDuration,
        WorkoutStepMessage, WorkoutStepTarget,
    },
    sans::{data::StringMode, header::HeaderLength},
    workout::{
        Bounds, HeartRateUnit, Intensity, Repetition, StepKind, Target, Workout, WorkoutStep,
    },
};

// The top of each unsigned range is the 'invalid' marker.
const MAX_STEP_MESSAGES: u16 = u16::MAX - 1;
const MAX_MESSAGE_INDEX: u16 = MAX_STEP_MESSAGES - 1;
const MAX_DURATION_MILLISECONDS: u32 = u32::MAX - 1;

/// How repeated steps are written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RepeatMode {
    /// Every repetition is written as its own step.
    #[default]
    Unroll,
    /// A repeated step is written once, followed by a repeat instruction.
    Native,
}

/// Options for [`encode_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EncodeOptions {
    pub strings: StringMode,
    pub repeats: RepeatMode,
    pub header: HeaderLength,
    pub sport: Sport,
    pub manufacturer: u16,
    pub product: u16,
    /// Device serial number. A random one is used when absent, given the `std`
    /// feature.
    pub serial_number: Option<u32>,
    /// Creation time, in seconds since the Unix epoch. The current time is
    /// used when absent, given the `std` feature.
    pub time_created: Option<u64>,
    /// Name unnamed steps after their target.
    pub step_names: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            strings: StringMode::default(),
            repeats: RepeatMode::default(),
            header: HeaderLength::default(),
            sport: Sport::Cycling,
            manufacturer: MANUFACTURER_DEVELOPMENT,
            product: 0,
            serial_number: None,
            time_created: None,
            step_names: false,
        }
    }
}

/// Expects the `file_id` message.
#[derive(Debug)]
pub struct FileIdState(Writer);

impl FileIdState {
    pub fn new(header: HeaderLength, strings: StringMode) -> Self {
        Self(Writer::new(header, strings))
    }

    pub fn advance(mut self, message: &FileIdMessage) -> SummaryState {
        self.0.write(message);
        SummaryState(self.0)
    }
}

/// Expects the `workout` message.
#[derive(Debug)]
pub struct SummaryState(Writer);

impl SummaryState {
    pub fn advance(mut self, message: &WorkoutMessage) -> Either<StepState, EndState> {
        self.0.write(message);
        StepState::next(self.0, message.num_valid_steps)
    }
}

/// Expects a `workout_step` message.
#[derive(Debug)]
pub struct StepState {
    writer: Writer,
    remaining: u16,
}

impl StepState {
    fn next(writer: Writer, remaining: u16) -> Either<Self, EndState> {
        if remaining == 0 {
            Right(EndState(writer))
        } else {
            Left(Self { writer, remaining })
        }
    }

    pub fn advance(mut self, message: &WorkoutStepMessage) -> Either<Self, EndState> {
        self.writer.write(message);
        Self::next(self.writer, self.remaining - 1)
    }

    /// Stop writing steps before the announced count is reached.
    pub fn close(self) -> EndState {
        debug!(remaining = self.remaining, "Closing step sequence early");
        EndState(self.writer)
    }
}

/// Every message has been written.
#[derive(Debug)]
pub struct EndState(Writer);

impl EndState {
    /// Complete the document: patch the header and append the check value.
    pub fn finish(self) -> Vec<u8> {
        self.0.finish()
    }
}

/// Encode a workout with default options.
pub fn encode(workout: &Workout) -> Vec<u8> {
    encode_with(workout, &EncodeOptions::default())
}

/// Encode a workout.
///
/// At most `u16::MAX - 1` step messages are written; further steps are
/// dropped.
pub fn encode_with(workout: &Workout, options: &EncodeOptions) -> Vec<u8> {
    let mut steps = step_messages(workout, options);
    steps.truncate(usize::from(MAX_STEP_MESSAGES));

    let file_id = FileIdMessage {
        file_type: FileType::Workout,
        manufacturer: options.manufacturer,
        product: options.product,
        serial_number: serial_number(options),
        time_created: time_created(options),
    };

    let summary = WorkoutMessage {
        sport: options.sport,
        num_valid_steps: steps.len() as u16,
        name: Some(workout.name.clone()).filter(|n| !n.is_empty()),
    };

    debug!(
        workout = %workout.name,
        steps = workout.steps.len(),
        messages = steps.len(),
        "Encoding workout"
    );

    let mut state = FileIdState::new(options.header, options.strings)
        .advance(&file_id)
        .advance(&summary);
    let mut steps = steps.iter();

    let end = loop {
        state = match (state, steps.next()) {
            (Left(step), Some(message)) => step.advance(message),
            (Left(step), None) => break step.close(),
            (Right(end), _) => break end,
        };
    };

    end.finish()
}

fn serial_number(options: &EncodeOptions) -> Option<SerialNumber> {
    match options.serial_number {
        Some(0) | None => {
            #[cfg(feature = "std")]
            return Some(SerialNumber::random());
            #[cfg(not(feature = "std"))]
            return None;
        }
        Some(serial) => Some(SerialNumber(serial)),
    }
}

fn time_created(options: &EncodeOptions) -> Option<DateTime> {
    match options.time_created {
        Some(seconds) => Some(DateTime::from_unix(seconds)),
        None => {
            #[cfg(feature = "std")]
            return Some(DateTime::now());
            #[cfg(not(feature = "std"))]
            return None;
        }
    }
}

/// Build the `workout_step` messages of a workout, in order.
fn step_messages(workout: &Workout, options: &EncodeOptions) -> Vec<WorkoutStepMessage> {
    let mut messages = Vec::with_capacity(workout.steps.len());
    let mut steps = workout.steps.as_slice();

    while let Some(step) = steps.first() {
        let index = messages.len().min(usize::from(MAX_MESSAGE_INDEX)) as u16;

        let count = match (options.repeats, step.repetition) {
            (RepeatMode::Native, Some(repetition)) => repeated_run(steps, repetition),
            _ => 1,
        };

        messages.push(step_message(index, step, options));

        if count > 1 {
            trace!(index, count, "Writing native repeat");

            let mut repeat = WorkoutStepMessage::empty(
                index.saturating_add(1).min(MAX_MESSAGE_INDEX),
                WorkoutStepDuration::RepeatUntilStepsComplete,
            );
            repeat.name = Some(format!("Repeat {count}x"));
            repeat.duration_value = Some(u32::from(index));
            repeat.target_type = Some(WorkoutStepTarget::Open);
            repeat.target_value = Some(u32::from(count));
            repeat.intensity = Some(Intensity::Active);
            messages.push(repeat);
        }

        steps = &steps[usize::from(count)..];
    }

    messages
}

/// Length of the run of copies starting at the front of `steps`, or 1 if the
/// markers do not describe a complete run.
fn repeated_run(steps: &[WorkoutStep], first: Repetition) -> u16 {
    if first.index != 0 || first.count < 2 {
        return 1;
    }

    let complete = (0..first.count).all(|i| {
        steps.get(usize::from(i)).and_then(|s| s.repetition)
            == Some(Repetition {
                index: i,
                count: first.count,
            })
    });

    if complete { first.count } else { 1 }
}

fn step_message(index: u16, step: &WorkoutStep, options: &EncodeOptions) -> WorkoutStepMessage {
    let mut message = WorkoutStepMessage::empty(index, WorkoutStepDuration::Time);

    message.name = step
        .name
        .clone()
        .or_else(|| options.step_names.then(|| step.label()));
    message.duration_value = Some(
        step.duration_seconds
            .saturating_mul(1000)
            .min(MAX_DURATION_MILLISECONDS),
    );
    message.intensity = Some(step.intensity);
    message.notes = step.note.clone();

    let (target_type, bounds) = target(&step.target);
    message.target_type = Some(target_type);
    message.target_value = Some(0);

    if let Some((low, high)) = bounds {
        message.custom_target_value_low = Some(low);
        message.custom_target_value_high = Some(high);
    }

    if let Some(cadence) = step.cadence.filter(|_| !matches!(step.target, Target::Cadence(_))) {
        message.secondary_target_type = Some(WorkoutStepTarget::Cadence);
        message.secondary_target_value = Some(0);
        message.secondary_custom_target_value_low = Some(u32::from(cadence.low));
        message.secondary_custom_target_value_high = Some(u32::from(cadence.high));
    }

    message
}

/// The target type and custom bounds of a step target.
///
/// Relative values are clipped below the offset that marks absolute ones.
fn target(target: &Target) -> (WorkoutStepTarget, Option<(u32, u32)>) {
    match *target {
        Target::Power(bounds) => {
            let percent = |x: u16| u32::from(x).min(POWER_OFFSET - 1);
            (
                WorkoutStepTarget::Power,
                Some((percent(bounds.low), percent(bounds.high))),
            )
        }
        Target::HeartRate(bounds, HeartRateUnit::PercentOfMax) => {
            let percent = |x: u8| u32::from(x).min(HEART_RATE_OFFSET);
            (
                WorkoutStepTarget::HeartRate,
                Some((percent(bounds.low), percent(bounds.high))),
            )
        }
        Target::HeartRate(bounds, HeartRateUnit::BeatsPerMinute) => {
            let bpm = |x: u8| u32::from(x) + HEART_RATE_OFFSET;
            (
                WorkoutStepTarget::HeartRate,
                Some((bpm(bounds.low), bpm(bounds.high))),
            )
        }
        Target::Cadence(bounds) => (
            WorkoutStepTarget::Cadence,
            Some((u32::from(bounds.low), u32::from(bounds.high))),
        ),
        Target::Open => (WorkoutStepTarget::Open, None),
    }
}

/// Errors occurring while reading a workout from a document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document could not be decoded.
    #[error(transparent)]
    Decode(#[from] slice::Error),
    /// The document is not a workout file.
    #[error("Not a workout file (file type {0:?}).")]
    NotWorkout(Option<u8>),
    /// A step uses a duration type other than time or repeat.
    #[error("Step {index} has an unsupported duration type ({duration_type:?}).")]
    UnsupportedDuration {
        index: u16,
        duration_type: Option<u8>,
    },
    /// A step uses a target that cannot be expressed.
    #[error("Step {index} has an unsupported target ({target_type:?}).")]
    UnsupportedTarget { index: u16, target_type: Option<u8> },
    /// A repeat instruction refers to a step that does not precede it.
    #[error("Step {index} repeats from unknown step {from}.")]
    RepeatOutOfRange { index: u16, from: u32 },
}

/// Read a workout back from a document.
///
/// Native repeat instructions are expanded, so the result holds every step in
/// playback order. Step kinds are inferred from targets and intensities.
pub fn decode_workout(r: &[u8]) -> Result<Workout, DecodeError> {
    let records = slice::decode(r)?;

    let file_type = records.iter().find(|r| r.global == 0).and_then(|r| r.u8(0));
    if file_type != Some(FileType::Workout as u8) {
        Err(DecodeError::NotWorkout(file_type))?;
    }

    let name = records
        .iter()
        .find(|r| r.global == 26)
        .and_then(|r| r.str(8))
        .unwrap_or_default();

    let mut steps: Vec<WorkoutStep> = Vec::new();
    // Position in `steps` where each step message's expansion begins.
    let mut starts: Vec<(u16, usize)> = Vec::new();

    for (position, record) in records.iter().filter(|r| r.global == 27).enumerate() {
        let index = record.u16(254).unwrap_or(position as u16);
        starts.push((index, steps.len()));

        match record.u8(1).and_then(WorkoutStepDuration::from_u8) {
            Some(WorkoutStepDuration::Time) => steps.push(decode_step(index, record)?),
            Some(WorkoutStepDuration::RepeatUntilStepsComplete) => {
                let from = record.u32(2).unwrap_or_default();
                let start = starts
                    .iter()
                    .find(|(i, _)| u32::from(*i) == from)
                    .map(|(_, start)| *start)
                    .ok_or(DecodeError::RepeatOutOfRange { index, from })?;

                let count = record.u16(4).unwrap_or(1);
                repeat(&mut steps, start, count);
            }
            _ => Err(DecodeError::UnsupportedDuration {
                index,
                duration_type: record.u8(1),
            })?,
        }
    }

    debug!(workout = name, steps = steps.len(), "Decoded workout");

    Ok(Workout::new(name, steps))
}

/// Append copies of `steps[start..]` until it occurs `count` times.
fn repeat(steps: &mut Vec<WorkoutStep>, start: usize, count: u16) {
    let block = steps.split_off(start);
    let single = block.len() == 1;

    for i in 0..count.max(1) {
        for step in &block {
            let mut step = step.clone();
            if single && count > 1 {
                step.repetition = Some(Repetition { index: i, count });
            }
            steps.push(step);
        }
    }
}

fn decode_step(index: u16, record: &Record<'_>) -> Result<WorkoutStep, DecodeError> {
    let unsupported = || DecodeError::UnsupportedTarget {
        index,
        target_type: record.u8(3),
    };

    let low = record.u32(5);
    let high = record.u32(6).or(low);

    let target = match record.u8(3).map(WorkoutStepTarget::from_u8) {
        None | Some(Some(WorkoutStepTarget::Open)) => Target::Open,
        Some(Some(WorkoutStepTarget::Power)) => {
            let (low, high) = low.zip(high).ok_or_else(unsupported)?;
            if low >= POWER_OFFSET || high >= POWER_OFFSET {
                Err(unsupported())?;
            }
            Target::Power(Bounds::new(low as u16, high as u16))
        }
        Some(Some(WorkoutStepTarget::HeartRate)) => {
            let (low, high) = low.zip(high).ok_or_else(unsupported)?;
            heart_rate(low, high).ok_or_else(unsupported)?
        }
        Some(Some(WorkoutStepTarget::Cadence)) => {
            let (low, high) = low.zip(high).ok_or_else(unsupported)?;
            Target::Cadence(cadence(low, high).ok_or_else(unsupported)?)
        }
        Some(_) => Err(unsupported())?,
    };

    let intensity = record
        .u8(7)
        .and_then(Intensity::from_u8)
        .unwrap_or_default();

    let kind = match target {
        Target::Open => StepKind::Open,
        Target::Power(bounds) if bounds.is_steady() => StepKind::Steady,
        Target::Power(bounds) if intensity == Intensity::Warmup && bounds.low < bounds.high => {
            StepKind::Warmup
        }
        Target::Power(_) if intensity == Intensity::Warmup => StepKind::Cooldown,
        Target::Power(_) => StepKind::Ramp,
        _ => StepKind::Steady,
    };

    let milliseconds = record.u32(2).unwrap_or_default();

    let mut step = WorkoutStep::new(kind, milliseconds.saturating_add(500) / 1000, target);
    step.intensity = intensity;
    step.name = record.str(0).map(String::from);
    step.note = record.str(8).map(String::from);

    if record.u8(19) == Some(WorkoutStepTarget::Cadence as u8) {
        let low = record.u32(21);
        let high = record.u32(22).or(low);
        step.cadence = low.zip(high).and_then(|(low, high)| cadence(low, high));
    }

    Ok(step)
}

fn heart_rate(low: u32, high: u32) -> Option<Target> {
    if low <= HEART_RATE_OFFSET && high <= HEART_RATE_OFFSET {
        let bounds = Bounds::new(low as u8, high as u8);
        Some(Target::HeartRate(bounds, HeartRateUnit::PercentOfMax))
    } else {
        let bpm = |x: u32| u8::try_from(x.checked_sub(HEART_RATE_OFFSET)?).ok();
        let bounds = Bounds::new(bpm(low)?, bpm(high)?);
        Some(Target::HeartRate(bounds, HeartRateUnit::BeatsPerMinute))
    }
}

fn cadence(low: u32, high: u32) -> Option<Bounds<u8>> {
    Some(Bounds::new(low.try_into().ok()?, high.try_into().ok()?))
}
