use fugit::MicrosDurationU64;

use crate::*;


/// The default controller number of channel 0.
pub const DEFAULT_BASE_CC: u8 = 20;
/// The default interval (in microseconds) between timer-driven flushes.
/// This is the overflow period of an 8-bit timer prescaled by 1024 at 16 MHz.
pub const DEFAULT_FLUSH_PERIOD_US: u64 = 16_384;
/// The maximum amount of notes in a reload chord.
pub const MAX_CHORD_LENGTH: usize = 8;
/// The default reload chord.
pub const DEFAULT_RELOAD_CHORD: [u8; 3] = [0, 3, 5];


/// Provides various configurations as to how the dial box will operate.
///
/// Setters return the options so they can be chained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialboxOptions {
	base_cc: u8,
	encoding: CcEncoding,
	max_step: u8,
	edge_mode: EdgeMode,
	reverse_mask: u8,
	dial_model: DialModel,
	trigger: FlushTrigger,
	reload_chord: heapless::Vec<u8, MAX_CHORD_LENGTH>,
}

impl DialboxOptions {
	/// Sets the controller number of channel 0.
	///
	/// Default is [`DEFAULT_BASE_CC`].
	pub fn with_base_cc(&mut self, base_cc: u8) -> &mut Self {
		self.base_cc = base_cc;
		self
	}

	/// Sets how steps are encoded in messages.
	///
	/// Default is [`CcEncoding::TwosComplement`].
	pub fn with_encoding(&mut self, encoding: CcEncoding) -> &mut Self {
		self.encoding = encoding;
		self
	}

	/// Sets the largest magnitude a single message carries. Must be within `1..=63`.
	///
	/// Default is [`MAX_STEP_LIMIT`].
	pub fn with_max_step(&mut self, max_step: u8) -> &mut Self {
		self.max_step = max_step;
		self
	}

	/// Sets which phase edges count as motion.
	///
	/// Default is [`EdgeMode::Both`].
	pub fn with_edge_mode(&mut self, edge_mode: EdgeMode) -> &mut Self {
		self.edge_mode = edge_mode;
		self
	}

	/// Sets which channels reverse their direction, bit `i` for channel `i`.
	///
	/// Default is `0`.
	pub fn with_reverse_mask(&mut self, reverse_mask: u8) -> &mut Self {
		self.reverse_mask = reverse_mask;
		self
	}

	/// Sets what the serial dial box reports in its frames.
	///
	/// Default is [`DialModel::Sgi`].
	pub fn with_dial_model(&mut self, dial_model: DialModel) -> &mut Self {
		self.dial_model = dial_model;
		self
	}

	/// Sets what causes accumulated motion to be sent.
	///
	/// Default is [`FlushTrigger::Timer`] every [`DEFAULT_FLUSH_PERIOD_US`].
	pub fn with_trigger(&mut self, trigger: FlushTrigger) -> &mut Self {
		self.trigger = trigger;
		self
	}

	/// Sets the Note-On sequence that requests a firmware reload. Notes past
	/// [`MAX_CHORD_LENGTH`] are dropped.
	///
	/// Default is [`DEFAULT_RELOAD_CHORD`].
	pub fn with_reload_chord(&mut self, notes: &[u8]) -> &mut Self {
		self.reload_chord.clear();

		for &note in notes.iter().take(MAX_CHORD_LENGTH) {
			let _ = self.reload_chord.push(note);
		}

		self
	}

	/// Checks that every controller number fits in 7 bits and the step is legal.
	pub fn validate(&self) -> Result<(), Error> {
		if self.max_step == 0 || self.max_step > MAX_STEP_LIMIT {
			return Err(Error::InvalidMaxStep(self.max_step));
		}

		let span = self.encoding.span();

		if self.base_cc as u16 + span as u16 > 128 {
			return Err(Error::ControllerOutOfRange { base: self.base_cc, span });
		}

		if self.reload_chord.is_empty() {
			return Err(Error::EmptyChord);
		}

		Ok(())
	}

	pub fn base_cc(&self) -> u8 {
		self.base_cc
	}

	pub fn encoding(&self) -> CcEncoding {
		self.encoding
	}

	pub fn max_step(&self) -> u8 {
		self.max_step
	}

	pub fn edge_mode(&self) -> EdgeMode {
		self.edge_mode
	}

	pub fn reverse_mask(&self) -> u8 {
		self.reverse_mask
	}

	pub fn dial_model(&self) -> DialModel {
		self.dial_model
	}

	pub fn trigger(&self) -> FlushTrigger {
		self.trigger
	}

	pub fn reload_chord(&self) -> &[u8] {
		&self.reload_chord
	}
}

impl Default for DialboxOptions {
	fn default() -> Self {
		Self {
			base_cc: DEFAULT_BASE_CC,
			encoding: CcEncoding::default(),
			max_step: MAX_STEP_LIMIT,
			edge_mode: EdgeMode::default(),
			reverse_mask: 0,
			dial_model: DialModel::default(),
			trigger: FlushTrigger::Timer {
				period: MicrosDurationU64::micros(DEFAULT_FLUSH_PERIOD_US),
			},
			reload_chord: heapless::Vec::from_slice(&DEFAULT_RELOAD_CHORD).unwrap_or_default(),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let options = DialboxOptions::default();

		assert_eq!(options.validate(), Ok(()));
		assert_eq!(options.reload_chord(), &DEFAULT_RELOAD_CHORD);
		assert_eq!(options.dial_model(), DialModel::Sgi);
		assert_eq!(options.trigger(), FlushTrigger::Timer {
			period: MicrosDurationU64::micros(DEFAULT_FLUSH_PERIOD_US),
		});
	}

	#[test]
	fn rejects_illegal_steps() {
		let mut options = DialboxOptions::default();

		for step in [0, 64, 127] {
			options.with_max_step(step);
			assert_eq!(options.validate(), Err(Error::InvalidMaxStep(step)));
		}
	}

	#[test]
	fn controller_range_depends_on_encoding() {
		let mut options = DialboxOptions::default();

		options.with_base_cc(120);
		assert_eq!(options.validate(), Ok(()));

		options.with_encoding(CcEncoding::SplitPolarity);
		assert_eq!(options.validate(), Err(Error::ControllerOutOfRange { base: 120, span: 16 }));

		options.with_base_cc(112);
		assert_eq!(options.validate(), Ok(()));
	}

	#[test]
	fn setters_chain() {
		let mut options = DialboxOptions::default();
		options
			.with_edge_mode(EdgeMode::PhaseA)
			.with_reverse_mask(0b1000_0001)
			.with_dial_model(DialModel::Spectragraphics)
			.with_trigger(FlushTrigger::PerFrame);

		assert_eq!(options.edge_mode(), EdgeMode::PhaseA);
		assert_eq!(options.reverse_mask(), 0b1000_0001);
		assert_eq!(options.dial_model(), DialModel::Spectragraphics);
		assert_eq!(options.trigger(), FlushTrigger::PerFrame);
		assert_eq!(options.validate(), Ok(()));
	}

	#[test]
	fn chord_is_bounded_and_not_empty() {
		let mut options = DialboxOptions::default();

		options.with_reload_chord(&[]);
		assert_eq!(options.validate(), Err(Error::EmptyChord));

		options.with_reload_chord(&[1; 20]);
		assert_eq!(options.reload_chord().len(), MAX_CHORD_LENGTH);
	}
}
