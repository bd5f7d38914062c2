//! Field values and the messages carrying them.
//!
//! A [`Message`] lists its fields in a fixed order. Each [`Field`] pairs a
//! field number with a [`Value`], which knows its base type and how wide it is
//! once encoded. The definition record for a message is derived from the same
//! list, so layout and content cannot drift apart.

use alloc::vec::Vec;

use super::definition::{Architecture, BaseType, FieldDefinition};

/// How string fields are sized.
///
/// Receiving devices disagree on strings: some expect every instance of a
/// field to share one width, others accept the exact encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum StringMode {
    /// Pad or truncate to a fixed number of bytes, terminator included.
    Fixed(u8),
    /// Encode the string and its terminator exactly.
    Variable,
}

impl Default for StringMode {
    fn default() -> Self {
        Self::Fixed(50)
    }
}

impl StringMode {
    /// Encoded width of a string, terminator included.
    fn width(self, s: &str) -> u8 {
        match self {
            Self::Fixed(width) => width.max(1),
            Self::Variable => (truncate(s, u8::MAX as usize - 1).len() + 1) as u8,
        }
    }
}

/// A single field value, tagged with its base type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Enum(u8),
    SInt8(i8),
    UInt8(u8),
    SInt16(i16),
    UInt16(u16),
    SInt32(i32),
    UInt32(u32),
    String(&'a str),
    Float32(f32),
    Float64(f64),
    UInt8z(u8),
    UInt16z(u16),
    UInt32z(u32),
    Byte(u8),
    SInt64(i64),
    UInt64(u64),
    UInt64z(u64),
    /// The 'invalid' marker of a base type, used for absent values.
    Invalid(BaseType),
}

impl Value<'_> {
    /// The base type of this value.
    pub fn base_type(&self) -> BaseType {
        match self {
            Self::Enum(_) => BaseType::Enum,
            Self::SInt8(_) => BaseType::SInt8,
            Self::UInt8(_) => BaseType::UInt8,
            Self::SInt16(_) => BaseType::SInt16,
            Self::UInt16(_) => BaseType::UInt16,
            Self::SInt32(_) => BaseType::SInt32,
            Self::UInt32(_) => BaseType::UInt32,
            Self::String(_) => BaseType::String,
            Self::Float32(_) => BaseType::Float32,
            Self::Float64(_) => BaseType::Float64,
            Self::UInt8z(_) => BaseType::UInt8z,
            Self::UInt16z(_) => BaseType::UInt16z,
            Self::UInt32z(_) => BaseType::UInt32z,
            Self::Byte(_) => BaseType::Byte,
            Self::SInt64(_) => BaseType::SInt64,
            Self::UInt64(_) => BaseType::UInt64,
            Self::UInt64z(_) => BaseType::UInt64z,
            Self::Invalid(t) => *t,
        }
    }

    /// Encoded width of this value, in bytes.
    pub fn size(&self, strings: StringMode) -> u8 {
        match self {
            Self::String(s) => strings.width(s),
            Self::Invalid(BaseType::String) => strings.width(""),
            _ => self.base_type().size(),
        }
    }

    /// Append this value to a buffer, little-endian.
    pub fn encode(&self, strings: StringMode, w: &mut Vec<u8>) {
        match *self {
            Self::Enum(x) | Self::UInt8(x) | Self::UInt8z(x) | Self::Byte(x) => w.push(x),
            Self::SInt8(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::SInt16(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::UInt16(x) | Self::UInt16z(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::SInt32(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::UInt32(x) | Self::UInt32z(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::Float32(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::Float64(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::SInt64(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::UInt64(x) | Self::UInt64z(x) => w.extend_from_slice(&x.to_le_bytes()),
            Self::String(s) => encode_string(s, strings.width(s), w),
            Self::Invalid(BaseType::String) => encode_string("", strings.width(""), w),
            Self::Invalid(t) => w.extend_from_slice(&t.invalid()[..t.size() as usize]),
        }
    }

    /// Whether this value is the 'invalid' marker.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Widen an unsigned integer or enumeration value.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Enum(x) | Self::UInt8(x) | Self::UInt8z(x) | Self::Byte(x) => Some(x.into()),
            Self::UInt16(x) | Self::UInt16z(x) => Some(x.into()),
            Self::UInt32(x) | Self::UInt32z(x) => Some(x.into()),
            Self::UInt64(x) | Self::UInt64z(x) => Some(x),
            _ => None,
        }
    }
}

impl<'a> Value<'a> {
    /// The string content of a string value.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Decode a value of a base type from its bytes.
    ///
    /// Array fields yield their first element only. Values holding their
    /// type's 'invalid' marker decode to [`Value::Invalid`], as do empty
    /// strings.
    pub fn decode(base_type: BaseType, r: &'a [u8], architecture: Architecture) -> Self {
        if base_type == BaseType::String {
            let end = r.iter().position(|b| *b == 0).unwrap_or(r.len());
            let s = match core::str::from_utf8(&r[..end]) {
                Ok(s) => s,
                Err(e) => core::str::from_utf8(&r[..e.valid_up_to()]).unwrap_or_default(),
            };

            return if s.is_empty() {
                Self::Invalid(base_type)
            } else {
                Self::String(s)
            };
        }

        let size = base_type.size() as usize;
        let Some(element) = r.get(..size) else {
            return Self::Invalid(base_type);
        };

        let mut le = [0; 8];
        le[..size].copy_from_slice(element);
        if architecture == Architecture::BigEndian && base_type.is_endian() {
            le[..size].reverse();
        }

        if le[..size] == base_type.invalid()[..size] {
            return Self::Invalid(base_type);
        }

        let b1 = le[0];
        let b2 = [le[0], le[1]];
        let b4 = [le[0], le[1], le[2], le[3]];
        let b8 = le;

        match base_type {
            BaseType::Enum => Self::Enum(b1),
            BaseType::SInt8 => Self::SInt8(b1 as i8),
            BaseType::UInt8 => Self::UInt8(b1),
            BaseType::SInt16 => Self::SInt16(i16::from_le_bytes(b2)),
            BaseType::UInt16 => Self::UInt16(u16::from_le_bytes(b2)),
            BaseType::SInt32 => Self::SInt32(i32::from_le_bytes(b4)),
            BaseType::UInt32 => Self::UInt32(u32::from_le_bytes(b4)),
            BaseType::Float32 => Self::Float32(f32::from_le_bytes(b4)),
            BaseType::Float64 => Self::Float64(f64::from_le_bytes(b8)),
            BaseType::UInt8z => Self::UInt8z(b1),
            BaseType::UInt16z => Self::UInt16z(u16::from_le_bytes(b2)),
            BaseType::UInt32z => Self::UInt32z(u32::from_le_bytes(b4)),
            BaseType::Byte => Self::Byte(b1),
            BaseType::SInt64 => Self::SInt64(i64::from_le_bytes(b8)),
            BaseType::UInt64 => Self::UInt64(u64::from_le_bytes(b8)),
            BaseType::UInt64z => Self::UInt64z(u64::from_le_bytes(b8)),
            BaseType::String => Self::Invalid(base_type),
        }
    }
}

/// Truncate a string to at most `max` bytes, on a character boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }

    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

fn encode_string(s: &str, width: u8, w: &mut Vec<u8>) {
    let width = width as usize;
    let s = truncate(s, width - 1);

    w.extend_from_slice(s.as_bytes());
    w.resize(w.len() + width - s.len(), 0);
}

/// A numbered field of a message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<'a> {
    pub number: u8,
    pub value: Value<'a>,
}

impl<'a> Field<'a> {
    pub fn new(number: u8, value: Value<'a>) -> Self {
        Self { number, value }
    }

    /// The definition entry describing this field.
    pub fn definition(&self, strings: StringMode) -> FieldDefinition {
        FieldDefinition::new(
            self.number,
            self.value.size(strings),
            self.value.base_type(),
        )
    }
}

/// A message of the FIT profile, publishing its fields in definition order.
///
/// See the [`Message`](macro@Message) derive macro for an automatic
/// implementation of this trait.
pub trait Message {
    /// The global message number.
    const NUMBER: u16;

    /// Publish each field, in order.
    fn fields<'a>(&'a self, emit: impl FnMut(Field<'a>));
}

/// Derive [`Message`] for a struct representing a single message.
///
/// # Example
///
/// Name the global message number with the `message(N)` attribute on the
/// struct, and each field number with a `field(N)` attribute. Fields are
/// written in declaration order; fields without an attribute are skipped.
/// Wrap a field in `Option<T>` to write its 'invalid' marker when absent.
///
/// ```
/// #[derive(Message)]
/// #[message(26)]
/// struct Workout {
///     #[field(4)]
///     sport: u8,
///     #[field(6)]
///     num_valid_steps: u16,
///     #[field(8)]
///     name: Option<String>,
/// }
/// ```
pub use chainring_derive::Message;

/// Convert a Rust value into a field value.
pub trait ToValue {
    /// The base type this value is written as.
    const BASE_TYPE: BaseType;

    fn to_value(&self) -> Value<'_>;
}

macro_rules! to_value {
    ($t:ty, $variant:ident) => {
        impl ToValue for $t {
            const BASE_TYPE: BaseType = BaseType::$variant;

            fn to_value(&self) -> Value<'_> {
                Value::$variant(*self)
            }
        }
    };
}

to_value!(u8, UInt8);
to_value!(i8, SInt8);
to_value!(u16, UInt16);
to_value!(i16, SInt16);
to_value!(u32, UInt32);
to_value!(i32, SInt32);
to_value!(u64, UInt64);
to_value!(i64, SInt64);
to_value!(f32, Float32);
to_value!(f64, Float64);

impl ToValue for str {
    const BASE_TYPE: BaseType = BaseType::String;

    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for alloc::string::String {
    const BASE_TYPE: BaseType = BaseType::String;

    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    const BASE_TYPE: BaseType = T::BASE_TYPE;

    fn to_value(&self) -> Value<'_> {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    const BASE_TYPE: BaseType = T::BASE_TYPE;

    fn to_value(&self) -> Value<'_> {
        match self {
            Some(x) => x.to_value(),
            None => Value::Invalid(T::BASE_TYPE),
        }
    }
}
