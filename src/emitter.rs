use crate::*;


/// The largest magnitude a single message may carry.
pub const MAX_STEP_LIMIT: u8 = 63;


/// Determines how a signed step is expressed as a Control Change.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CcEncoding {
	/// One controller per channel; the value is the step in 7-bit two's complement
	/// (`1..=63` turning up, `65..=127` turning down).
	#[default] TwosComplement,
	/// Two controllers per channel, the odd one for turning up and the even one for turning down;
	/// the value is the step's magnitude.
	SplitPolarity,
}

impl CcEncoding {
	/// The amount of controllers each channel occupies.
	pub const fn controllers_per_channel(self) -> u8 {
		match self {
			CcEncoding::TwosComplement => 1,
			CcEncoding::SplitPolarity => 2,
		}
	}

	/// The amount of controllers all channels occupy.
	pub const fn span(self) -> u8 {
		self.controllers_per_channel() * CHANNEL_COUNT as u8
	}
}


/// Receives the messages produced by the emitter.
pub trait MidiTransport {
	type Error;

	/// Queues one message.
	fn send_event(&mut self, message: CcMessage) -> Result<(), Self::Error>;

	/// Pushes everything queued since the last flush to the host.
	fn flush(&mut self) -> Result<(), Self::Error>;
}


/// A transport failure part way through a channel, with the motion that was not sent.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitError<E> {
	pub error: E,
	pub remainder: i16,
}


/// Splits a signed value into steps of at most `max_step`, the remainder last.
///
/// Yields `ceil(|value| / max_step)` steps, each with the sign of `value`, summing to `value`.
#[derive(Debug, Clone)]
pub struct Chunks {
	remaining: i16,
	max_step: i16,
}

impl Iterator for Chunks {
	type Item = i16;

	fn next(&mut self) -> Option<i16> {
		if self.remaining == 0 {
			return None;
		}

		let step = self.remaining.clamp(-self.max_step, self.max_step);
		self.remaining -= step;

		Some(step)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let count = (self.remaining.unsigned_abs() as usize).div_ceil(self.max_step as usize);
		(count, Some(count))
	}
}

impl ExactSizeIterator for Chunks {}

/// See [`Chunks`]. A `max_step` of zero is treated as one.
pub fn chunks(value: i16, max_step: u8) -> Chunks {
	Chunks {
		remaining: value,
		max_step: max_step.max(1) as i16,
	}
}


/// Turns a channel's motion into Control Change messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcEmitter {
	base_cc: u8,
	encoding: CcEncoding,
	max_step: u8,
}

impl CcEmitter {
	pub fn new(options: &DialboxOptions) -> Result<Self, Error> {
		options.validate()?;

		Ok(Self {
			base_cc: options.base_cc(),
			encoding: options.encoding(),
			max_step: options.max_step(),
		})
	}

	/// The message carrying one step (`1..=max_step` in magnitude) of a channel.
	pub fn message(&self, channel: Channel, step: i16) -> CcMessage {
		match self.encoding {
			CcEncoding::TwosComplement => {
				CcMessage::new(self.base_cc + channel.number(), step as u8)
			}
			CcEncoding::SplitPolarity => {
				let polarity = (step > 0) as u8;
				let controller = self.base_cc + (channel.number() << 1) + polarity;

				CcMessage::new(controller, step.unsigned_abs() as u8)
			}
		}
	}

	/// Sends `value` as one or more messages. Does not flush the transport.
	///
	/// Returns the amount of messages sent. On failure, the error carries the part of `value`
	/// that did not reach the transport.
	pub fn emit<T: MidiTransport>(
		&self,
		transport: &mut T,
		channel: Channel,
		value: i16,
	) -> Result<usize, EmitError<T::Error>> {
		let mut remainder = value;
		let mut sent = 0;

		for step in chunks(value, self.max_step) {
			if let Err(error) = transport.send_event(self.message(channel, step)) {
				return Err(EmitError { error, remainder });
			}

			remainder -= step;
			sent += 1;
		}

		Ok(sent)
	}

	pub fn encoding(&self) -> CcEncoding {
		self.encoding
	}

	pub fn max_step(&self) -> u8 {
		self.max_step
	}
}


#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	/// Records everything sent to it. Fails the send after `fail_after` messages when set.
	#[derive(Default)]
	pub(crate) struct RecordingTransport {
		pub sent: Vec<CcMessage>,
		pub flushes: usize,
		pub fail_after: Option<usize>,
	}

	impl MidiTransport for RecordingTransport {
		type Error = &'static str;

		fn send_event(&mut self, message: CcMessage) -> Result<(), Self::Error> {
			if self.fail_after.is_some_and(|limit| self.sent.len() >= limit) {
				return Err("endpoint full");
			}

			self.sent.push(message);
			Ok(())
		}

		fn flush(&mut self) -> Result<(), Self::Error> {
			self.flushes += 1;
			Ok(())
		}
	}

	impl RecordingTransport {
		pub fn values(&self) -> Vec<u8> {
			self.sent.iter().map(CcMessage::value).collect()
		}
	}

	fn ch(index: u8) -> Channel {
		Channel::new(index).unwrap()
	}

	fn emitter(encoding: CcEncoding, base_cc: u8) -> CcEmitter {
		let mut options = DialboxOptions::default();
		options.with_encoding(encoding).with_base_cc(base_cc);

		CcEmitter::new(&options).unwrap()
	}

	/// Reads a two's complement value back.
	fn signed(value: u8) -> i16 {
		((value << 1) as i8 >> 1) as i16
	}

	#[test]
	fn chunking_law_holds() {
		for value in -127i16..=127 {
			for max_step in [1u8, 7, 63] {
				let steps: Vec<i16> = chunks(value, max_step).collect();
				let expected = (value.unsigned_abs() as usize).div_ceil(max_step as usize);

				assert_eq!(steps.len(), expected, "value {value} step {max_step}");
				assert_eq!(steps.iter().sum::<i16>(), value);
				assert!(steps.iter().all(|step| step.unsigned_abs() <= max_step as u16));
				assert!(steps.iter().all(|step| step.signum() == value.signum()));
			}
		}
	}

	#[test]
	fn saturated_value_splits_into_three_messages() {
		assert_eq!(chunks(127, 63).collect::<Vec<_>>(), [63, 63, 1]);
		assert_eq!(chunks(-127, 63).collect::<Vec<_>>(), [-63, -63, -1]);
		assert_eq!(chunks(0, 63).count(), 0);
	}

	#[test]
	fn twos_complement_encoding() {
		let emitter = emitter(CcEncoding::TwosComplement, 20);

		assert_eq!(emitter.message(ch(0), 10), CcMessage::new(20, 10));
		assert_eq!(emitter.message(ch(7), -5), CcMessage::new(27, 0x7B));
		assert_eq!(signed(emitter.message(ch(7), -63).value()), -63);
		assert_eq!(signed(emitter.message(ch(7), 63).value()), 63);
	}

	#[test]
	fn split_polarity_encoding() {
		let emitter = emitter(CcEncoding::SplitPolarity, 102);

		assert_eq!(emitter.message(ch(0), 5), CcMessage::new(103, 5));
		assert_eq!(emitter.message(ch(0), -5), CcMessage::new(102, 5));
		assert_eq!(emitter.message(ch(7), 63), CcMessage::new(117, 63));
		assert_eq!(emitter.message(ch(7), -1), CcMessage::new(116, 1));
	}

	#[test]
	fn emit_sends_every_chunk_without_flushing() {
		let emitter = emitter(CcEncoding::TwosComplement, 20);
		let mut transport = RecordingTransport::default();

		assert_eq!(emitter.emit(&mut transport, ch(3), 127), Ok(3));
		assert_eq!(transport.values(), [63, 63, 1]);
		assert!(transport.sent.iter().all(|message| message.controller() == 23));
		assert_eq!(transport.flushes, 0);
	}

	#[test]
	fn emit_reports_the_unsent_remainder() {
		let emitter = emitter(CcEncoding::TwosComplement, 20);
		let mut transport = RecordingTransport {
			fail_after: Some(1),
			..Default::default()
		};

		let result = emitter.emit(&mut transport, ch(0), -100);

		assert_eq!(result, Err(EmitError { error: "endpoint full", remainder: -37 }));
		assert_eq!(transport.sent.len(), 1);
	}
}
