//! In-memory document writer.

use alloc::{vec, vec::Vec};

use tracing::trace;

use crate::sans::{
    check::compute_crc,
    data::{Message, StringMode},
    definition::{Architecture, Definition},
    header::{DocumentHeader, HeaderLength, RecordHeader},
};

/// Number of local message numbers available in a normal record header.
const LOCAL_MESSAGES: usize = 16;

/// Writes messages into a document, defining each message type on first use.
///
/// Local message numbers are handed out in the order message types are first
/// written. A definition is repeated only when a message's field layout
/// changes, which happens when variable-width strings change length.
#[derive(Debug)]
pub struct Writer {
    buf: Vec<u8>,
    header: HeaderLength,
    strings: StringMode,
    definitions: Vec<Definition>,
    evict: usize,
}

impl Writer {
    /// Start a document, reserving room for its header.
    pub fn new(header: HeaderLength, strings: StringMode) -> Self {
        Self {
            buf: vec![0; header.size()],
            header,
            strings,
            definitions: Vec::new(),
            evict: 0,
        }
    }

    /// Write a data record for a message, preceded by a definition record if
    /// its type has no matching definition yet.
    pub fn write<M: Message>(&mut self, message: &M) {
        let mut fields = Vec::new();
        message.fields(|f| fields.push(f));

        let definition = Definition {
            global: M::NUMBER,
            architecture: Architecture::LittleEndian,
            fields: fields.iter().map(|f| f.definition(self.strings)).collect(),
        };

        let local = self.define(definition);

        self.buf.push(
            RecordHeader::Data {
                local,
                time_offset: None,
            }
            .encode(),
        );

        for field in &fields {
            field.value.encode(self.strings, &mut self.buf);
        }
    }

    /// Find or emit a definition, returning its local message number.
    fn define(&mut self, definition: Definition) -> u8 {
        let existing = self
            .definitions
            .iter()
            .position(|d| d.global == definition.global);

        let local = match existing {
            Some(local) if self.definitions[local] == definition => return local as u8,
            Some(local) => {
                trace!(global = definition.global, local, "Redefining message layout");
                local
            }
            None if self.definitions.len() < LOCAL_MESSAGES => {
                self.definitions.push(definition.clone());
                self.definitions.len() - 1
            }
            None => {
                let local = self.evict;
                self.evict = (self.evict + 1) % LOCAL_MESSAGES;
                local
            }
        };

        trace!(
            global = definition.global,
            local,
            fields = definition.fields.len(),
            "Writing definition record"
        );

        self.buf.push(
            RecordHeader::Definition {
                local: local as u8,
            }
            .encode(),
        );
        definition.encode(&mut self.buf);
        self.definitions[local] = definition;

        local as u8
    }

    /// Number of record bytes written so far.
    pub fn data_size(&self) -> usize {
        self.buf.len() - self.header.size()
    }

    /// Complete the document: fill in the header and append the check value.
    ///
    /// The record section length saturates at `u32::MAX`.
    pub fn finish(mut self) -> Vec<u8> {
        let data_size = u32::try_from(self.data_size()).unwrap_or(u32::MAX);
        let header = DocumentHeader::new(self.header, data_size);
        header.encode(&mut self.buf[..self.header.size()]);

        let crc = compute_crc(0, &self.buf);
        self.buf.extend_from_slice(&crc.to_le_bytes());

        self.buf
    }
}
