//! Document and record headers.

use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    little_endian::{U16, U32},
};

use super::check::compute_crc;

/// Protocol version written to document headers (2.0).
pub const PROTOCOL_VERSION: u8 = 0x20;
/// Profile version written to document headers (21.32).
pub const PROFILE_VERSION: u16 = 2132;
/// File type marker closing every document header.
pub const DATA_TYPE: [u8; 4] = *b".FIT";

/// Length of a document header.
///
/// Short headers end at the file type marker. Extended headers append a check
/// value over the preceding header bytes, which some devices insist on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum HeaderLength {
    #[default]
    Short,
    Extended,
}

impl HeaderLength {
    /// Number of bytes occupied by a header of this length.
    pub const fn size(self) -> usize {
        match self {
            Self::Short => 12,
            Self::Extended => 14,
        }
    }
}

/// An error decoding a document header.
#[derive(Debug, Error)]
pub enum DocumentHeaderError {
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker.")]
    NotFitData,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
    /// Calculated and found header CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) header CRC values do not match.")]
    CyclicRedundancyCheck { found: u16, calculated: u16 },
}

/// The fixed part of a document header, shared by both lengths.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub struct DocumentHeader {
    header_size: u8,
    protocol_version: u8,
    profile_version: U16,
    data_size: U32,
    data_type: [u8; 4],
}

impl DocumentHeader {
    /// Build a header announcing `data_size` bytes of records.
    pub fn new(length: HeaderLength, data_size: u32) -> Self {
        Self {
            header_size: length.size() as u8,
            protocol_version: PROTOCOL_VERSION,
            profile_version: U16::new(PROFILE_VERSION),
            data_size: U32::new(data_size),
            data_type: DATA_TYPE,
        }
    }

    /// The number of record bytes following the header.
    pub fn data_size(&self) -> u32 {
        self.data_size.get()
    }

    /// The declared header length.
    pub fn length(&self) -> Result<HeaderLength, DocumentHeaderError> {
        match self.header_size {
            12 => Ok(HeaderLength::Short),
            14 => Ok(HeaderLength::Extended),
            n => Err(DocumentHeaderError::UnknownHeaderLength(n)),
        }
    }

    /// Write the header into `w`, which must be exactly as long as the
    /// declared header length.
    ///
    /// Extended headers receive their check value here.
    pub fn encode(&self, w: &mut [u8]) {
        let (fixed, rest) = w.split_at_mut(12);
        fixed.copy_from_slice(self.as_bytes());

        if rest.len() == 2 {
            rest.copy_from_slice(&compute_crc(0, fixed).to_le_bytes());
        }
    }

    /// Decode the fixed part of a document header.
    ///
    /// Returns the header and its declared length. The caller reads the two
    /// trailing bytes of an extended header and checks them with
    /// [`DocumentHeader::check_extension`].
    pub fn decode(r: [u8; 12]) -> Result<(Self, HeaderLength), DocumentHeaderError> {
        let header: Self = zerocopy::transmute!(r);

        if header.data_type != DATA_TYPE {
            Err(DocumentHeaderError::NotFitData)?;
        }

        let length = header.length()?;

        Ok((header, length))
    }

    /// Check the trailing bytes of an extended header.
    ///
    /// A stored value of zero means the writer skipped the check.
    pub fn check_extension(&self, r: [u8; 2]) -> Result<(), DocumentHeaderError> {
        let found = u16::from_le_bytes(r);
        let calculated = compute_crc(0, self.as_bytes());

        if found != 0 && found != calculated {
            Err(DocumentHeaderError::CyclicRedundancyCheck { found, calculated })?;
        }

        Ok(())
    }
}

/// An error decoding a record header.
#[derive(Debug, Error)]
pub enum RecordHeaderError {
    /// Found developer data (not yet supported).
    #[error("Found developer data.")]
    DeveloperData,
}

bitfield! {
    struct NormalHeader(u8) {
        [0..4] local_message: u8,
        [5] is_developer,
        [6] is_definition,
        [7] is_compressed,
    }
}

bitfield! {
    struct CompressedHeader(u8) {
        [0..5] time_offset: u8,
        [5..7] local_message: u8,
    }
}

/// The single byte opening each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordHeader {
    /// A definition record for a local message number follows.
    Definition { local: u8 },
    /// A data record for a local message number follows, with the time offset
    /// of a compressed timestamp header if present.
    Data { local: u8, time_offset: Option<u8> },
}

impl RecordHeader {
    /// The local message number this record refers to.
    pub fn local(&self) -> u8 {
        match *self {
            Self::Definition { local } | Self::Data { local, .. } => local,
        }
    }

    /// Encode this header as a normal (uncompressed) record header.
    ///
    /// Local message numbers are truncated to their four available bits, and
    /// the time offset is dropped.
    pub fn encode(&self) -> u8 {
        let mut header = NormalHeader(0);
        header.set_local_message(self.local() & 0x0F);
        header.set_is_definition(matches!(self, Self::Definition { .. }));
        header.0
    }

    /// Decode a record header.
    pub fn decode(r: u8) -> Result<Self, RecordHeaderError> {
        let header = NormalHeader(r);

        if header.is_compressed() {
            let header = CompressedHeader(r);

            return Ok(Self::Data {
                local: header.local_message(),
                time_offset: Some(header.time_offset()),
            });
        }

        if header.is_developer() {
            Err(RecordHeaderError::DeveloperData)?;
        }

        let local = header.local_message();

        Ok(if header.is_definition() {
            Self::Definition { local }
        } else {
            Self::Data {
                local,
                time_offset: None,
            }
        })
    }
}
