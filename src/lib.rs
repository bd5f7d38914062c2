#![no_std]

//! A compiler from plain-text workout descriptions to Garmin FIT workout
//! files.
//!
//! Chainring reads lines such as `3x 5min 95% FTP "stay seated"` into a
//! structured [`Workout`](workout::Workout), and encodes that workout as a
//! document of the Flexible and Interoperable Data Transfer protocol, ready
//! for head-units and smart trainers.
//!
//! Most users should begin with [`text::parse`] and [`avec::encode`]. The
//! [`avec`] module can also read documents back, and the [`sans`] module
//! exposes the protocol building blocks for custom messages.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: random serial numbers and creation timestamps (default).
//! - `serde`: derive `Serialize` and `Deserialize` for option types.
//! - `cli`: build the `chainring` command-line tool.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

// Lets derived implementations name this crate from inside it.
extern crate self as chainring;

pub mod avec;
pub mod profile;
pub mod sans;
pub mod text;
pub mod workout;
