//! # dialbox-midi
//!
//! Turns the motion of up to eight dials into relative MIDI Control Change messages.
//!
//! Two input variants are supported:
//!
//! | Variant | Input | Flushed by |
//! | ------- | ----- | ---------- |
//! | Shift register | 2-bit quadrature phases clocked out of two parallel shift registers | a periodic timer |
//! | Serial | 3-byte absolute-position frames from an SGI-style dial box UART | each completed frame |
//!
//! The hardware is reached through the traits in [`port`] and [`emitter::MidiTransport`], so
//! everything in this crate runs (and is tested) on the host.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod accumulator;
pub mod channel;
pub mod chord;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod midi;
pub mod options;
pub mod parser;
pub mod port;
pub mod ring;
pub mod sampler;
pub mod trigger;

pub use crate::accumulator::*;
pub use crate::channel::*;
pub use crate::chord::*;
pub use crate::emitter::*;
pub use crate::engine::*;
pub use crate::error::*;
pub use crate::midi::*;
pub use crate::options::*;
pub use crate::parser::*;
pub use crate::port::*;
pub use crate::ring::*;
pub use crate::sampler::*;
pub use crate::trigger::*;
