//! MIDI wire formats: the 3-byte Control Change message and the 4-byte USB-MIDI event packet.

/// Status nibble of a Control Change message.
pub const MIDI_COMMAND_CC: u8 = 0xB0;
/// Status nibble of a Note-On message.
pub const MIDI_COMMAND_NOTE_ON: u8 = 0x90;
/// Status nibble of a Note-Off message.
pub const MIDI_COMMAND_NOTE_OFF: u8 = 0x80;
/// The size (in bytes) of a USB-MIDI event packet.
pub const USB_MIDI_PACKET_SIZE: usize = 4;


/// A Control Change message on MIDI channel 1 (status `0xB0`).
///
/// Both data bytes are masked to 7 bits on construction.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcMessage {
	controller: u8,
	value: u8,
}

impl CcMessage {
	pub const fn new(controller: u8, value: u8) -> Self {
		Self {
			controller: controller & 0x7F,
			value: value & 0x7F,
		}
	}

	pub const fn controller(&self) -> u8 {
		self.controller
	}

	pub const fn value(&self) -> u8 {
		self.value
	}

	/// Converts the message into its raw 3 bytes.
	pub const fn to_bytes(&self) -> [u8; 3] {
		[
			MIDI_COMMAND_CC,
			self.controller,
			self.value,
		]
	}

	/// Converts the message into a USB-MIDI event packet on virtual cable 0.
	/// The extra byte at the start holds the cable number and the code index.
	pub const fn to_usb_packet(&self) -> [u8; USB_MIDI_PACKET_SIZE] {
		[
			MIDI_COMMAND_CC >> 4,
			MIDI_COMMAND_CC,
			self.controller,
			self.value,
		]
	}
}


/// A message received from the host.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
	NoteOn { channel: u8, note: u8, velocity: u8 },
	NoteOff { channel: u8, note: u8, velocity: u8 },
	ControlChange { channel: u8, controller: u8, value: u8 },
	/// Anything else, including system messages.
	Other,
}

impl MidiEvent {
	/// Decodes a USB-MIDI event packet. The cable number is ignored.
	pub fn from_usb_packet(packet: &[u8; USB_MIDI_PACKET_SIZE]) -> Self {
		let [header, status, data1, data2] = *packet;
		let code_index = header & 0x0F;
		let channel = status & 0x0F;

		// The code index must agree with the status byte for channel voice messages.
		if code_index != status >> 4 {
			return MidiEvent::Other;
		}

		match status & 0xF0 {
			MIDI_COMMAND_NOTE_ON => MidiEvent::NoteOn { channel, note: data1, velocity: data2 },
			MIDI_COMMAND_NOTE_OFF => MidiEvent::NoteOff { channel, note: data1, velocity: data2 },
			MIDI_COMMAND_CC => MidiEvent::ControlChange { channel, controller: data1, value: data2 },
			_ => MidiEvent::Other,
		}
	}

	/// The note of a Note-On with non-zero velocity. A zero velocity Note-On is a Note-Off.
	pub fn struck_note(&self) -> Option<u8> {
		match *self {
			MidiEvent::NoteOn { note, velocity, .. } if velocity > 0 => Some(note),
			_ => None,
		}
	}
}
