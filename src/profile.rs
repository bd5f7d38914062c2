//! The messages and types of the FIT profile used by workout files.
//!
//! Only the `file_id`, `workout` and `workout_step` messages are modelled, with
//! the fields a trainer or head-unit reads from a structured workout.

use alloc::string::String;

use zerocopy::{Immutable, IntoBytes, KnownLayout, TryFromBytes};

use crate::{
    sans::{
        data::{Message, ToValue, Value},
        definition::BaseType,
    },
    workout::Intensity,
};

/// Manufacturer identifier reserved for development.
pub const MANUFACTURER_DEVELOPMENT: u16 = 255;

/// Offset added to absolute heart rate targets; values below are percentages
/// of maximum heart rate.
pub const HEART_RATE_OFFSET: u32 = 100;

/// Offset added to absolute power targets; values below are percentages of
/// threshold power.
pub const POWER_OFFSET: u32 = 1000;

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET: u64 = 631_065_600;

macro_rules! profile_enum {
    ($(#[$attr:meta])* $name:ident { $($variant:ident = $value:literal),* $(,)? }) => {
        $(#[$attr])*
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromBytes, IntoBytes, KnownLayout, Immutable)]
        pub enum $name {
            $($variant = $value),*
        }

        impl $name {
            pub fn from_u8(r: u8) -> Option<Self> {
                let x: Result<Self, _> = zerocopy::try_transmute!(r);
                x.ok()
            }
        }

        impl ToValue for $name {
            const BASE_TYPE: BaseType = BaseType::Enum;

            fn to_value(&self) -> Value<'_> {
                Value::Enum(*self as u8)
            }
        }
    };
}

profile_enum!(
    /// `file`
    FileType {
        Device = 1,
        Settings = 2,
        Sport = 3,
        Activity = 4,
        Workout = 5,
        Course = 6,
    }
);

profile_enum!(
    /// `sport`
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(rename_all = "lowercase")
    )]
    Sport {
        Generic = 0,
        Running = 1,
        Cycling = 2,
        Transition = 3,
        FitnessEquipment = 4,
        Swimming = 5,
    }
);

profile_enum!(
    /// `wkt_step_duration`
    WorkoutStepDuration {
        Time = 0,
        Distance = 1,
        HeartRateLessThan = 2,
        HeartRateGreaterThan = 3,
        Calories = 4,
        Open = 5,
        RepeatUntilStepsComplete = 6,
    }
);

profile_enum!(
    /// `wkt_step_target`
    WorkoutStepTarget {
        Speed = 0,
        HeartRate = 1,
        Open = 2,
        Cadence = 3,
        Power = 4,
    }
);

impl Intensity {
    /// The `intensity` enumeration value.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Rest => 1,
            Self::Warmup => 2,
            Self::Cooldown => 3,
            Self::Recovery => 4,
            Self::Interval => 5,
        }
    }

    /// Look up an `intensity` enumeration value. `other` (6) maps to active.
    pub fn from_u8(r: u8) -> Option<Self> {
        Some(match r {
            0 | 6 => Self::Active,
            1 => Self::Rest,
            2 => Self::Warmup,
            3 => Self::Cooldown,
            4 => Self::Recovery,
            5 => Self::Interval,
            _ => None?,
        })
    }
}

impl ToValue for Intensity {
    const BASE_TYPE: BaseType = BaseType::Enum;

    fn to_value(&self) -> Value<'_> {
        Value::Enum(self.to_u8())
    }
}

/// A device serial number. Zero is reserved as 'invalid'.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialNumber(pub u32);

impl SerialNumber {
    /// A random, non-zero serial number.
    #[cfg(feature = "std")]
    pub fn random() -> Self {
        use rand::Rng;

        Self(rand::thread_rng().gen_range(1..=u32::MAX))
    }
}

impl ToValue for SerialNumber {
    const BASE_TYPE: BaseType = BaseType::UInt32z;

    fn to_value(&self) -> Value<'_> {
        Value::UInt32z(self.0)
    }
}

/// Seconds since the FIT epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(pub u32);

impl DateTime {
    /// Convert seconds since the Unix epoch, saturating at both ends of the
    /// representable range.
    pub fn from_unix(seconds: u64) -> Self {
        let fit = seconds.saturating_sub(FIT_EPOCH_OFFSET);
        // The top of the range is the 'invalid' marker.
        Self(fit.min(u64::from(u32::MAX - 1)) as u32)
    }

    /// Seconds since the Unix epoch.
    pub fn to_unix(self) -> u64 {
        u64::from(self.0) + FIT_EPOCH_OFFSET
    }

    /// The current time, or the FIT epoch if the clock is before it.
    #[cfg(feature = "std")]
    pub fn now() -> Self {
        let seconds = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self::from_unix(seconds)
    }
}

impl ToValue for DateTime {
    const BASE_TYPE: BaseType = BaseType::UInt32;

    fn to_value(&self) -> Value<'_> {
        Value::UInt32(self.0)
    }
}

/// `file_id` (0): identifies the document as a workout and its creator.
#[derive(Debug, Clone, PartialEq, Message)]
#[message(0)]
pub struct FileIdMessage {
    #[field(0)]
    pub file_type: FileType,
    #[field(1)]
    pub manufacturer: u16,
    #[field(2)]
    pub product: u16,
    #[field(3)]
    pub serial_number: Option<SerialNumber>,
    #[field(4)]
    pub time_created: Option<DateTime>,
}

/// `workout` (26): the summary preceding the steps.
#[derive(Debug, Clone, PartialEq, Message)]
#[message(26)]
pub struct WorkoutMessage {
    #[field(4)]
    pub sport: Sport,
    #[field(6)]
    pub num_valid_steps: u16,
    #[field(8)]
    pub name: Option<String>,
}

/// `workout_step` (27): one step, or a repeat instruction.
///
/// For repeat instructions, `duration_value` holds the index of the first step
/// to repeat and `target_value` the number of repetitions.
#[derive(Debug, Clone, PartialEq, Message)]
#[message(27)]
pub struct WorkoutStepMessage {
    #[field(254)]
    pub message_index: u16,
    #[field(0)]
    pub name: Option<String>,
    #[field(1)]
    pub duration_type: WorkoutStepDuration,
    #[field(2)]
    pub duration_value: Option<u32>,
    #[field(3)]
    pub target_type: Option<WorkoutStepTarget>,
    #[field(4)]
    pub target_value: Option<u32>,
    #[field(5)]
    pub custom_target_value_low: Option<u32>,
    #[field(6)]
    pub custom_target_value_high: Option<u32>,
    #[field(7)]
    pub intensity: Option<Intensity>,
    #[field(8)]
    pub notes: Option<String>,
    #[field(19)]
    pub secondary_target_type: Option<WorkoutStepTarget>,
    #[field(20)]
    pub secondary_target_value: Option<u32>,
    #[field(21)]
    pub secondary_custom_target_value_low: Option<u32>,
    #[field(22)]
    pub secondary_custom_target_value_high: Option<u32>,
}

impl WorkoutStepMessage {
    /// A step message with every optional field absent.
    pub fn empty(message_index: u16, duration_type: WorkoutStepDuration) -> Self {
        Self {
            message_index,
            name: None,
            duration_type,
            duration_value: None,
            target_type: None,
            target_value: None,
            custom_target_value_low: None,
            custom_target_value_high: None,
            intensity: None,
            notes: None,
            secondary_target_type: None,
            secondary_target_value: None,
            secondary_custom_target_value_low: None,
            secondary_custom_target_value_high: None,
        }
    }
}
