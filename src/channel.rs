use core::fmt;

use crate::Error;


/// The amount of independent dial channels.
pub const CHANNEL_COUNT: usize = 8;


/// Identifies one of the [`CHANNEL_COUNT`] dials. Always in `0..8`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
	/// Validates a raw channel index.
	pub const fn new(index: u8) -> Result<Self, Error> {
		if (index as usize) < CHANNEL_COUNT {
			Ok(Self(index))
		}
		else {
			Err(Error::InvalidChannel(index))
		}
	}

	/// Returns every channel in ascending order.
	pub fn all() -> impl Iterator<Item = Channel> + Clone {
		(0..CHANNEL_COUNT as u8).map(Channel)
	}

	/// The channel number, `0..8`.
	pub const fn number(self) -> u8 {
		self.0
	}

	/// The channel number as an array index.
	pub const fn index(self) -> usize {
		self.0 as usize
	}
}

impl TryFrom<u8> for Channel {
	type Error = Error;

	fn try_from(index: u8) -> Result<Self, Self::Error> {
		Channel::new(index)
	}
}

impl fmt::Display for Channel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "dial {}", self.0)
	}
}
