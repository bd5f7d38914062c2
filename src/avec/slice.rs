//! Slice-based record decoder.

use alloc::vec::Vec;

use thiserror::Error;

use crate::sans::{
    check::compute_crc,
    data::{Field, Value},
    definition::{Definition, FieldDefinition},
    header::{DocumentHeader, DocumentHeaderError, HeaderLength, RecordHeader, RecordHeaderError},
};

/// Errors occurring while decoding from a slice.
#[derive(Debug, Error)]
pub enum Error {
    /// Unexpectedly reached the end of the slice.
    #[error("Unexpectedly reached the end of the slice.")]
    EndOfSlice,
    /// Calculated and found CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    CyclicRedundancyCheck { found: u16, calculated: u16 },
    /// Incorrect file header.
    #[error("Incorrect file header: {0}")]
    Header(#[from] DocumentHeaderError),
    /// Found unsupported developer data.
    #[error("Found unsupported developer data.")]
    Developer,
    /// A data record referred to a local message with no definition.
    #[error("Data record for undefined local message {0}.")]
    UndefinedMessage(u8),
    /// A definition declared an unknown base type.
    #[error("Unknown base type ({base_type:#04x}) for field {field}.")]
    UnknownBaseType { field: u8, base_type: u8 },
}

impl From<RecordHeaderError> for Error {
    fn from(err: RecordHeaderError) -> Self {
        match err {
            RecordHeaderError::DeveloperData => Self::Developer,
        }
    }
}

/// A decoded data record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'a> {
    /// The global message number.
    pub global: u16,
    /// The time offset of a compressed timestamp header.
    pub time_offset: Option<u8>,
    /// Field values, in definition order, including invalid ones.
    pub fields: Vec<Field<'a>>,
}

impl<'a> Record<'a> {
    /// The value of a field, unless absent or 'invalid'.
    pub fn value(&self, number: u8) -> Option<Value<'a>> {
        self.fields
            .iter()
            .find(|f| f.number == number)
            .map(|f| f.value)
            .filter(|v| !v.is_invalid())
    }

    /// An unsigned integer or enumeration field, if it fits in `u8`.
    pub fn u8(&self, number: u8) -> Option<u8> {
        self.value(number)?.as_u64()?.try_into().ok()
    }

    /// An unsigned integer field, if it fits in `u16`.
    pub fn u16(&self, number: u8) -> Option<u16> {
        self.value(number)?.as_u64()?.try_into().ok()
    }

    /// An unsigned integer field, if it fits in `u32`.
    pub fn u32(&self, number: u8) -> Option<u32> {
        self.value(number)?.as_u64()?.try_into().ok()
    }

    /// A string field.
    pub fn str(&self, number: u8) -> Option<&'a str> {
        self.value(number)?.as_str()
    }
}

/// Decode every data record of a document, in order.
///
/// The document's check value is verified before any record is decoded. This
/// method is also re-exported as `chainring::avec::decode_slice`.
pub fn decode(r: &[u8]) -> Result<Vec<Record<'_>>, Error> {
    let i = &mut 0; // Offset of the next unread byte.

    let (header, length) = DocumentHeader::decode(take(r, i)?)?;

    if length == HeaderLength::Extended {
        header.check_extension(take(r, i)?)?;
    }

    let end = *i + header.data_size() as usize; // Offset to the end of the record section.

    // Apply the cyclic redundancy check before continuing.
    let found = u16::from_le_bytes(take(r, &mut end.clone())?);
    let r = r.get(..end).ok_or(Error::EndOfSlice)?;
    let calculated = compute_crc(0, r);

    if found != calculated {
        Err(Error::CyclicRedundancyCheck { found, calculated })?;
    }

    // Definitions by local message number.
    let mut definitions: [Option<Definition>; 16] = Default::default();
    let mut records = Vec::new();

    while *i < end {
        let [byte] = take::<1>(r, i)?;

        match RecordHeader::decode(byte)? {
            RecordHeader::Definition { local } => {
                definitions[local as usize] = Some(decode_definition(r, i)?);
            }
            RecordHeader::Data { local, time_offset } => {
                let definition = definitions[local as usize]
                    .as_ref()
                    .ok_or(Error::UndefinedMessage(local))?;

                records.push(decode_data(definition, time_offset, r, i)?);
            }
        }
    }

    Ok(records)
}

fn decode_definition(r: &[u8], i: &mut usize) -> Result<Definition, Error> {
    let (mut definition, count) = Definition::decode(take(r, i)?);

    for _ in 0..count {
        definition.fields.push(FieldDefinition::decode(take(r, i)?));
    }

    Ok(definition)
}

fn decode_data<'a>(
    definition: &Definition,
    time_offset: Option<u8>,
    r: &'a [u8],
    i: &mut usize,
) -> Result<Record<'a>, Error> {
    let body = take_slice(r, i, definition.data_size())?;
    let j = &mut 0; // Offset within the record body.

    let mut fields = Vec::with_capacity(definition.fields.len());

    for field in &definition.fields {
        let base_type = field.base_type().ok_or(Error::UnknownBaseType {
            field: field.number,
            base_type: field.base_type_number(),
        })?;

        let bytes = take_slice(body, j, field.size as usize)?;
        let value = Value::decode(base_type, bytes, definition.architecture);

        fields.push(Field::new(field.number, value));
    }

    Ok(Record {
        global: definition.global,
        time_offset,
        fields,
    })
}

/// Take an exact number of bytes from an offset in a slice, advancing the offset.
fn take<const N: usize>(r: &[u8], i: &mut usize) -> Result<[u8; N], Error> {
    let bytes = take_slice(r, i, N)?;
    bytes.try_into().map_err(|_| Error::EndOfSlice)
}

fn take_slice<'a>(r: &'a [u8], i: &mut usize, n: usize) -> Result<&'a [u8], Error> {
    let s = *i;
    *i += n;

    r.get(s..*i).ok_or(Error::EndOfSlice)
}
