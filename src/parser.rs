//! Frame parser for the dial box serial protocol.
//!
//! Every position report is three bytes: the dial number as an ASCII digit (`'0'..='7'`), then the
//! dial's 16-bit absolute position, high byte first. There is no delimiter or checksum; the parser
//! resynchronizes by discarding bytes until it sees a valid dial number.

use crate::*;


/// The byte announcing dial 0. Dials 1..8 follow consecutively.
pub const DIAL_BASE: u8 = b'0';
/// The line speed of the dial box link (8 data bits, no parity, 1 stop bit).
pub const DIAL_BAUD_RATE: u32 = 9600;
/// The sequence that wakes the dial box up and starts position reports.
pub const DIAL_INITIALIZE: [u8; 4] = [0x20, 0x50, 0x00, 0xFF];


#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	AwaitingChannel,
	AwaitingHighByte { channel: Channel },
	AwaitingLowByte { channel: Channel, high: u8 },
}


/// What the two data bytes of a frame mean.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialModel {
	/// SGI dial boxes report the dial's absolute 16-bit position. The motion is the difference from
	/// the previous report.
	#[default] Sgi,
	/// Spectragraphics dial boxes report the motion itself, as the high byte minus the low byte.
	Spectragraphics,
}


/// A complete position report.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
	pub channel: Channel,
	pub value: u16,
}

impl Frame {
	/// The motion carried by a relative report: the high byte minus the low byte.
	pub fn relative_delta(&self) -> i32 {
		let [high, low] = self.value.to_be_bytes();
		high as i32 - low as i32
	}
}


pub struct FrameParser {
	state: State,
}

impl FrameParser {
	pub const fn new() -> Self {
		Self { state: State::AwaitingChannel }
	}

	/// Process a single incoming byte. Returns `Some(Frame)` if a complete frame is received.
	pub fn push(&mut self, byte: u8) -> Option<Frame> {
		match self.state {
			State::AwaitingChannel => {
				match byte.checked_sub(DIAL_BASE).map(Channel::new) {
					Some(Ok(channel)) => {
						self.state = State::AwaitingHighByte { channel };
					}
					_ => {
						trace!("discarding byte {=u8:#x} outside a frame", byte);
					}
				}
			}
			State::AwaitingHighByte { channel } => {
				self.state = State::AwaitingLowByte { channel, high: byte };
			}
			State::AwaitingLowByte { channel, high } => {
				self.state = State::AwaitingChannel;

				return Some(Frame {
					channel,
					value: u16::from_be_bytes([high, byte]),
				});
			}
		}

		None
	}

	/// Drops a partially received frame.
	pub fn reset(&mut self) {
		self.state = State::AwaitingChannel;
	}

	/// Whether the parser sits between frames.
	pub fn is_idle(&self) -> bool {
		self.state == State::AwaitingChannel
	}
}

impl Default for FrameParser {
	fn default() -> Self {
		Self::new()
	}
}


/// The last absolute position reported by each dial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialPositions {
	previous: [u16; CHANNEL_COUNT],
}

impl DialPositions {
	pub const fn new() -> Self {
		Self { previous: [0; CHANNEL_COUNT] }
	}

	/// Records a new position and returns the motion since the previous one.
	///
	/// Positions are free-running 16-bit counters, so the difference is taken the short way
	/// around the wrap point.
	pub fn update(&mut self, frame: Frame) -> i32 {
		let previous = &mut self.previous[frame.channel.index()];
		let delta = frame.value.wrapping_sub(*previous) as i16;

		*previous = frame.value;

		delta as i32
	}

	pub fn previous(&self, channel: Channel) -> u16 {
		self.previous[channel.index()]
	}
}
