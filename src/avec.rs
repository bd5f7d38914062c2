//! Convenience interfaces for writing and reading workout documents.
//!
//! [`encode`] and [`encode_with`] turn a [`Workout`](crate::workout::Workout)
//! into a complete document. [`decode_slice`] reads the data records of any
//! document, and [`decode_workout`] rebuilds a workout from them.
//!
//! Custom messages can be written with a [`Writer`](writer::Writer) once they
//! implement [`Message`](crate::sans::data::Message), usually through its
//! derive macro.
//!
//! ```
//! let parse = chainring::text::parse("warmup 10min\n3x 5min 95% FTP");
//! let workout = parse.workout.unwrap();
//!
//! let bytes = chainring::avec::encode(&workout);
//! let decoded = chainring::avec::decode_workout(&bytes).unwrap();
//!
//! assert_eq!(decoded.steps.len(), 4);
//! ```

pub mod slice;
pub mod workout;
pub mod writer;

pub use slice::decode as decode_slice;
pub use workout::{EncodeOptions, RepeatMode, decode_workout, encode, encode_with};
