use alloc::{string::String, vec::Vec};

use super::line::{ParsedLine, SpecialBlock};
use crate::workout::{Bounds, Intensity, Repetition, StepKind, Target, WorkoutStep};

impl SpecialBlock {
    fn step(self, duration_seconds: u32) -> WorkoutStep {
        let (kind, target, intensity, name, note) = match self {
            Self::Warmup => (
                StepKind::Warmup,
                Target::Power(Bounds::new(40, 75)),
                Intensity::Warmup,
                "Warmup",
                "Easy spin, gradually increase effort",
            ),
            Self::Cooldown => (
                StepKind::Cooldown,
                Target::Power(Bounds::new(65, 40)),
                Intensity::Warmup,
                "Cooldown",
                "Easy spin, relax",
            ),
            Self::Recovery => (
                StepKind::Recovery,
                Target::Power(Bounds::steady(50)),
                Intensity::Rest,
                "Recovery",
                "Easy spinning, recover",
            ),
            Self::Open => (
                StepKind::Open,
                Target::Open,
                Intensity::Active,
                "Free ride",
                "Ride at your own pace",
            ),
        };

        let mut step = WorkoutStep::new(kind, duration_seconds, target);
        step.intensity = intensity;
        step.name = Some(String::from(name));
        step.note = Some(String::from(note));
        step
    }
}

/// Expand a parsed line into its steps, appending them in order.
pub(super) fn build(line: ParsedLine, steps: &mut Vec<WorkoutStep>) {
    let mut step = match (line.special, line.target) {
        (Some(special), _) => special.step(line.duration_seconds),
        (None, Some(target)) => {
            let kind = match target {
                Target::Power(bounds) if !bounds.is_steady() => StepKind::Ramp,
                Target::Open => StepKind::Open,
                _ => StepKind::Steady,
            };

            let mut step = WorkoutStep::new(kind, line.duration_seconds, target);
            step.cadence = line.cadence;
            step.intensity = line.intensity.unwrap_or_default();
            step
        }
        (None, None) => return,
    };

    if line.note.is_some() {
        step.note = line.note;
    }

    if line.repeat_count <= 1 {
        steps.push(step);
        return;
    }

    let count = line.repeat_count;
    steps.extend((0..count).map(|index| {
        let mut step = step.clone();
        step.repetition = Some(Repetition { index, count });
        step
    }));
}
