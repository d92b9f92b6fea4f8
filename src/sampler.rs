use crate::*;


/// The 2-bit quadrature phase of one dial. Bit 0 is phase A, bit 1 is phase B.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Phase(u8);

impl Phase {
	/// Builds a phase from its two bits.
	pub const fn new(a: bool, b: bool) -> Self {
		Self((a as u8) | ((b as u8) << 1))
	}

	/// Builds a phase from the low two bits of `bits`.
	pub const fn from_bits(bits: u8) -> Self {
		Self(bits & 0b11)
	}

	pub const fn bits(self) -> u8 {
		self.0
	}

	pub const fn a(self) -> bool {
		self.0 & 0b01 != 0
	}

	pub const fn b(self) -> bool {
		self.0 & 0b10 != 0
	}
}


/// The phases of all channels captured in one scan, two bits per channel.
///
/// Channel `i` occupies bits `2i` (phase A) and `2i + 1` (phase B). The low byte is the first
/// shift register (dials 0 to 3), the high byte the second (dials 4 to 7).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadratureSnapshot(u16);

impl QuadratureSnapshot {
	pub const fn from_bits(bits: u16) -> Self {
		Self(bits)
	}

	pub const fn bits(self) -> u16 {
		self.0
	}

	/// Joins the bytes shifted out of the two registers into a snapshot.
	pub const fn from_registers(first: u8, second: u8) -> Self {
		Self(((second as u16) << 8) | first as u16)
	}

	/// The phase of the given channel.
	pub const fn phase(self, channel: Channel) -> Phase {
		Phase::from_bits((self.0 >> (2 * channel.index())) as u8)
	}

	/// Yields `(channel, previous, current)` for every channel whose phase differs from `previous`.
	pub fn changes_since(self, previous: QuadratureSnapshot) -> impl Iterator<Item = (Channel, Phase, Phase)> {
		Channel::all()
			.filter(move |&channel| previous.phase(channel) != self.phase(channel))
			.map(move |channel| (channel, previous.phase(channel), self.phase(channel)))
	}
}


/// Reads every channel's phase from the shift registers in one pass.
pub struct QuadratureSampler<P> {
	port: P,
}

impl<P: ShiftRegisterPort> QuadratureSampler<P> {
	pub fn new(port: P) -> Self {
		Self { port }
	}

	/// Latches and shifts in both registers.
	pub fn sample(&mut self) -> Result<QuadratureSnapshot, P::Error> {
		self.port.pulse_load()?;
		let (first, second) = self.port.read_parallel_bits()?;

		Ok(QuadratureSnapshot::from_registers(first, second))
	}

	pub fn port(&mut self) -> &mut P {
		&mut self.port
	}

	/// Releases the port.
	pub fn free(self) -> P {
		self.port
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::port::tests::{fake_port, Shared};

	fn ch(index: u8) -> Channel {
		Channel::new(index).unwrap()
	}

	#[test]
	fn each_register_carries_four_dials() {
		// Dial 0: A only, dial 1: B only, dial 4: both, dial 7: B only.
		let snapshot = QuadratureSnapshot::from_registers(0b0000_1001, 0b1000_0011);

		assert_eq!(snapshot.phase(ch(0)), Phase::new(true, false));
		assert_eq!(snapshot.phase(ch(1)), Phase::new(false, true));
		assert_eq!(snapshot.phase(ch(4)), Phase::new(true, true));
		assert_eq!(snapshot.phase(ch(7)), Phase::new(false, true));
		assert_eq!(snapshot.phase(ch(2)), Phase::default());
		assert_eq!(snapshot.bits(), 0x8309);
	}

	#[test]
	fn bit_one_of_the_first_register_is_dial_0_phase_b() {
		let snapshot = QuadratureSnapshot::from_registers(0b10, 0);

		assert_eq!(snapshot.phase(ch(0)).bits(), 0b10);
		assert_eq!(snapshot.phase(ch(1)).bits(), 0b00);
	}

	#[test]
	fn reports_only_changed_channels() {
		let before = QuadratureSnapshot::from_registers(0b0000_0000, 0b0000_0000);
		let after = QuadratureSnapshot::from_registers(0b0001_0000, 0b0010_0000);

		let changes: Vec<_> = after.changes_since(before).collect();

		assert_eq!(changes, [
			(ch(2), Phase::new(false, false), Phase::new(true, false)),
			(ch(6), Phase::new(false, false), Phase::new(false, true)),
		]);
		assert_eq!(after.changes_since(after).count(), 0);
	}

	#[test]
	fn sample_latches_then_shifts() {
		let regs = Shared::default();
		regs.borrow_mut().parallel_first = 0b0000_1100;
		regs.borrow_mut().parallel_second = 0b0100_0000;

		let mut sampler = QuadratureSampler::new(fake_port(&regs));
		let snapshot = sampler.sample().unwrap();

		assert_eq!(snapshot.phase(ch(1)), Phase::new(true, true));
		assert_eq!(snapshot.phase(ch(7)), Phase::new(true, false));
		assert_eq!(regs.borrow().loads, 1);
	}
}
