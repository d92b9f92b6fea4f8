use core::fmt;


/// Configuration faults reported by this crate.
///
/// The runtime paths have no error conditions of their own: bad serial bytes are discarded and
/// accumulators saturate. Hardware failures are reported through each seam's own error type.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// A channel index outside `0..8`.
	InvalidChannel(u8),
	/// A per-message step outside `1..=63`.
	InvalidMaxStep(u8),
	/// The controller numbers `base..base + span` do not fit in a 7-bit controller number.
	ControllerOutOfRange { base: u8, span: u8 },
	/// A reload chord with no notes.
	EmptyChord,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::InvalidChannel(index) => write!(f, "channel {index} is out of range 0..8"),
			Error::InvalidMaxStep(step) => write!(f, "step {step} is out of range 1..=63"),
			Error::ControllerOutOfRange { base, span } => {
				write!(f, "controllers {base}..{} exceed 127", *base as u16 + *span as u16)
			}
			Error::EmptyChord => write!(f, "the reload chord needs at least one note"),
		}
	}
}


/// Failure of one of the two seams an engine call drives at once.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError<P, T> {
	/// The input port failed.
	Port(P),
	/// The MIDI transport failed.
	Transport(T),
}

impl<P: fmt::Debug, T: fmt::Debug> fmt::Display for IoError<P, T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IoError::Port(err) => write!(f, "input port error: {err:?}"),
			IoError::Transport(err) => write!(f, "MIDI transport error: {err:?}"),
		}
	}
}
