//! Protocol building blocks, free of any document-level state.
//!
//! This module holds the pieces both directions of the codec share: document
//! and record headers, definition records and base types, field values, and
//! the cyclic redundancy check. None of them track which definitions have been
//! written or read; that bookkeeping lives in [`crate::avec`].
//!
//! # Document Layout
//!
//! A document is a header, a run of records, and a trailing check value over
//! everything before it. Each record opens with a one-byte header naming a
//! local message number (0 to 15). A definition record binds that number to a
//! global message and lists the number, width and base type of each field.
//! Data records for the local number then carry only field values, in the
//! declared order.
//!
//! All multi-byte values written by this crate are little-endian.

pub mod check;
pub mod data;
pub mod definition;
pub mod header;
