//! Hardware seams consumed by the engine.
//!
//! Boards implement these traits on top of their HAL. [`ShiftRegisterPins`] covers the common
//! wiring of two parallel-in/serial-out shift registers sharing a load and a clock line, using
//! nothing but `embedded-hal` digital pins.

/// These are traits for handling digital pin states.
use embedded_hal::digital::{InputPin, OutputPin};


/// The amount of bits shifted out of each register per scan.
pub const SHIFT_REGISTER_WIDTH: usize = 8;


/// Raw access to the pair of shift registers carrying the quadrature phases.
pub trait ShiftRegisterPort {
	type Error;

	/// Latches the parallel inputs of both registers.
	fn pulse_load(&mut self) -> Result<(), Self::Error>;

	/// Shifts out both registers in parallel, returning `(first, second)`. Bit `i` of each byte is
	/// parallel input `i` of that register.
	fn read_parallel_bits(&mut self) -> Result<(u8, u8), Self::Error>;
}

/// A byte-oriented serial line. Reads are non-blocking; writes are buffered and may block while
/// the transmit buffer is full.
pub trait SerialPort {
	type Error;

	/// Whether [`SerialPort::read_byte`] has a byte to return.
	fn byte_available(&mut self) -> bool;

	/// Takes the oldest received byte. Only called after [`SerialPort::byte_available`] returned `true`.
	fn read_byte(&mut self) -> Result<u8, Self::Error>;

	/// Queues a byte for transmission.
	fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;
}


/// Two 74HC165-style shift registers: a shared active-low load line, a shared clock line and one
/// serial data input per register. The first register carries dials 0 to 3, the second dials 4 to 7.
pub struct ShiftRegisterPins<LOAD, CLK, D1, D2> {
	load: LOAD,
	clock: CLK,
	data_first: D1,
	data_second: D2,
}

impl<LOAD, CLK, D1, D2, E> ShiftRegisterPins<LOAD, CLK, D1, D2>
where
	LOAD: OutputPin<Error = E>,
	CLK: OutputPin<Error = E>,
	D1: InputPin<Error = E>,
	D2: InputPin<Error = E>,
{
	/// Associates the given pins. Both control lines idle high.
	pub fn new(mut load: LOAD, mut clock: CLK, data_first: D1, data_second: D2) -> Result<Self, E> {
		load.set_high()?;
		clock.set_high()?;

		Ok(Self { load, clock, data_first, data_second })
	}

	/// Releases the pins.
	pub fn free(self) -> (LOAD, CLK, D1, D2) {
		(self.load, self.clock, self.data_first, self.data_second)
	}
}

impl<LOAD, CLK, D1, D2, E> ShiftRegisterPort for ShiftRegisterPins<LOAD, CLK, D1, D2>
where
	LOAD: OutputPin<Error = E>,
	CLK: OutputPin<Error = E>,
	D1: InputPin<Error = E>,
	D2: InputPin<Error = E>,
{
	type Error = E;

	fn pulse_load(&mut self) -> Result<(), E> {
		self.load.set_low()?;
		self.load.set_high()
	}

	fn read_parallel_bits(&mut self) -> Result<(u8, u8), E> {
		let mut accu_first = 0u8;
		let mut accu_second = 0u8;

		// The register presents its highest input first.
		for _ in 0..SHIFT_REGISTER_WIDTH {
			accu_first = (accu_first << 1) | self.data_first.is_high()? as u8;
			accu_second = (accu_second << 1) | self.data_second.is_high()? as u8;

			self.clock.set_low()?;
			self.clock.set_high()?;
		}

		Ok((accu_first, accu_second))
	}
}
