//! Definition records and the base types they declare.

use alloc::vec::Vec;

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, TryFromBytes, Unaligned,
    little_endian::U16 as LeU16,
};

/// Byte order of the data records following a definition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    #[default]
    LittleEndian,
    BigEndian,
}

impl Architecture {
    fn from_u8(r: u8) -> Self {
        if r == 0 {
            Self::LittleEndian
        } else {
            Self::BigEndian
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::LittleEndian => 0,
            Self::BigEndian => 1,
        }
    }
}

/// A base type, as numbered in definition records.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromBytes, IntoBytes, KnownLayout, Immutable)]
pub enum BaseType {
    Enum = 0x00,
    SInt8 = 0x01,
    UInt8 = 0x02,
    SInt16 = 0x83,
    UInt16 = 0x84,
    SInt32 = 0x85,
    UInt32 = 0x86,
    String = 0x07,
    Float32 = 0x88,
    Float64 = 0x89,
    UInt8z = 0x0A,
    UInt16z = 0x8B,
    UInt32z = 0x8C,
    Byte = 0x0D,
    SInt64 = 0x8E,
    UInt64 = 0x8F,
    UInt64z = 0x90,
}

impl BaseType {
    /// Look up a base type by its number.
    pub fn from_u8(r: u8) -> Option<Self> {
        let base_type: Result<Self, _> = zerocopy::try_transmute!(r);
        base_type.ok()
    }

    /// Width of one element of this type, in bytes.
    pub const fn size(self) -> u8 {
        match self {
            Self::Enum | Self::SInt8 | Self::UInt8 | Self::String | Self::UInt8z | Self::Byte => 1,
            Self::SInt16 | Self::UInt16 | Self::UInt16z => 2,
            Self::SInt32 | Self::UInt32 | Self::Float32 | Self::UInt32z => 4,
            Self::Float64 | Self::SInt64 | Self::UInt64 | Self::UInt64z => 8,
        }
    }

    /// Whether multi-byte values of this type are subject to byte order.
    pub const fn is_endian(self) -> bool {
        self as u8 & 0x80 != 0
    }

    /// The 'invalid' marker of this type, as little-endian bytes.
    ///
    /// Only the first [`BaseType::size`] bytes are meaningful.
    pub const fn invalid(self) -> [u8; 8] {
        let x: u64 = match self {
            Self::Enum | Self::UInt8 | Self::Byte => 0xFF,
            Self::SInt8 => 0x7F,
            Self::SInt16 => 0x7FFF,
            Self::UInt16 => 0xFFFF,
            Self::SInt32 => 0x7FFF_FFFF,
            Self::UInt32 | Self::Float32 => 0xFFFF_FFFF,
            Self::SInt64 => 0x7FFF_FFFF_FFFF_FFFF,
            Self::UInt64 | Self::Float64 => u64::MAX,
            Self::String | Self::UInt8z | Self::UInt16z | Self::UInt32z | Self::UInt64z => 0,
        };
        x.to_le_bytes()
    }
}

/// One field entry of a definition record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct FieldDefinition {
    pub number: u8,
    pub size: u8,
    base_type: u8,
}

impl FieldDefinition {
    pub fn new(number: u8, size: u8, base_type: BaseType) -> Self {
        Self {
            number,
            size,
            base_type: base_type as u8,
        }
    }

    /// The declared base type, if known.
    pub fn base_type(&self) -> Option<BaseType> {
        BaseType::from_u8(self.base_type)
    }

    /// The declared base type number, known or not.
    pub fn base_type_number(&self) -> u8 {
        self.base_type
    }

    /// Decode a field entry.
    pub fn decode(r: [u8; 3]) -> Self {
        zerocopy::transmute!(r)
    }
}

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
struct DefinitionMessage {
    reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    field_count: u8,
}

/// A definition record: the layout of data records for one local message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub global: u16,
    pub architecture: Architecture,
    pub fields: Vec<FieldDefinition>,
}

impl Definition {
    /// Total width of a data record following this definition, excluding its
    /// record header.
    pub fn data_size(&self) -> usize {
        self.fields.iter().map(|f| f.size as usize).sum()
    }

    /// Append this definition record's content (everything after the record
    /// header) to a buffer.
    ///
    /// Definitions are always written little-endian. At most 255 fields are
    /// written.
    pub fn encode(&self, w: &mut Vec<u8>) {
        let count = self.fields.len().min(u8::MAX as usize);

        let message = DefinitionMessage {
            reserved: 0,
            architecture: Architecture::LittleEndian.to_u8(),
            global_message: LeU16::new(self.global).to_bytes(),
            field_count: count as u8,
        };

        w.extend_from_slice(message.as_bytes());

        for field in &self.fields[..count] {
            w.extend_from_slice(field.as_bytes());
        }
    }

    /// Decode the fixed prefix of a definition record.
    ///
    /// Returns a definition without fields, and the number of field entries
    /// that follow.
    pub fn decode(r: [u8; 5]) -> (Self, u8) {
        let DefinitionMessage {
            architecture,
            global_message,
            field_count,
            ..
        } = zerocopy::transmute!(r);

        let architecture = Architecture::from_u8(architecture);
        let global = match architecture {
            Architecture::LittleEndian => u16::from_le_bytes(global_message),
            Architecture::BigEndian => u16::from_be_bytes(global_message),
        };

        let definition = Self {
            global,
            architecture,
            fields: Vec::with_capacity(field_count as usize),
        };

        (definition, field_count)
    }
}
