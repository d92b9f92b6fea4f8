use rp_pico as bsp;

use bsp::hal;
use hal::gpio;

use dialbox_midi::*;


/// The interval between flushes of the quadrature channels, in microseconds.
pub const FLUSH_PERIOD_US: u64 = DEFAULT_FLUSH_PERIOD_US;
/// The controller number of dial 0.
pub const BASE_CC: u8 = DEFAULT_BASE_CC;
/// The USB vendor ID (pid.codes test VID).
pub const USB_VID: u16 = 0x1209;
/// The USB product ID.
pub const USB_PID: u16 = 0x0001;
/// The product string. Host-side tools look the device up by this name.
pub const USB_PRODUCT: &str = "SGI Dial Box";


// The GPIO pin order for the quadrature shift registers is as follows:
// [LOAD] -> [CLOCK] -> [DIALS 0-3 DATA] -> [DIALS 4-7 DATA]

// The serial dial box uses UART0:
// [TX] -> [RX]


/// Where the dial positions come from.
pub enum DialInput {
	/// Two 74HC165s, four encoders each, with both phases of an encoder on adjacent inputs.
	ShiftRegisters(QuadratureSampler<PicoShiftRegisters>),
	/// An SGI-style dial box reporting absolute positions over UART0.
	Serial(UartPort),
}


/// Dial box controller.
pub struct DialboxController {
	input: DialInput,
	dialbox: Dialbox,
	timer: hal::Timer,
}

impl DialboxController {
	/// Builds a controller reading the quadrature shift registers, flushed by the timer.
	pub fn with_shift_registers(registers: PicoShiftRegisters, timer: hal::Timer) -> Result<Self, Error> {
		let mut options = DialboxOptions::default();
		options
			.with_base_cc(BASE_CC)
			.with_trigger(FlushTrigger::Timer {
				period: hal::fugit::MicrosDurationU64::micros(FLUSH_PERIOD_US),
			});

		Ok(Self {
			input: DialInput::ShiftRegisters(QuadratureSampler::new(registers)),
			dialbox: Dialbox::new(&options)?,
			timer,
		})
	}

	/// Builds a controller reading a serial dial box, flushed per frame.
	pub fn with_serial(port: UartPort, timer: hal::Timer) -> Result<Self, Error> {
		let mut options = DialboxOptions::default();
		options
			.with_base_cc(BASE_CC)
			.with_trigger(FlushTrigger::PerFrame);

		Ok(Self {
			input: DialInput::Serial(port),
			dialbox: Dialbox::new(&options)?,
			timer,
		})
	}

	/// Prepares the input. The serial dial box has to be told to start reporting.
	pub fn start(&mut self) {
		if let DialInput::Serial(port) = &mut self.input {
			if let Err(err) = self.dialbox.start_serial(port) {
				defmt::warn!("dialbox: could not wake the dial box: {}", err);
			}
		}
	}

	/// Runs one iteration of the input side: a scan and a timer check, or whatever the serial
	/// line delivered since the last call.
	pub fn update<T>(&mut self, transport: &mut T)
	where
		T: MidiTransport,
		T::Error: defmt::Format,
	{
		match &mut self.input {
			DialInput::ShiftRegisters(sampler) => {
				// Pin errors are infallible on the RP2040.
				if let Err(never) = self.dialbox.scan(sampler) {
					match never {}
				}

				if let Err(err) = self.dialbox.poll_timer(self.timer.get_counter(), transport) {
					defmt::warn!("dialbox: flush failed: {}", err);
				}
			}

			DialInput::Serial(port) => {
				if let Err(err) = self.dialbox.service_serial(port, transport) {
					defmt::warn!("dialbox: serial service failed: {}", err);
				}
			}
		}
	}

	/// Passes a packet from the host to the reload chord detector.
	/// Returns `true` if the host asked for a firmware reload.
	pub fn handle_midi_packet(&mut self, packet: &[u8; USB_MIDI_PACKET_SIZE]) -> bool {
		self.dialbox.handle_midi_packet(packet)
	}
}


/// Type alias for a non-ID pin with a pull-up input configuration.
pub type DynInputPin = gpio::Pin<gpio::DynPinId, gpio::FunctionSioInput, gpio::PullUp>;
/// Type alias for a non-ID pin with a pull-down output configuration.
pub type DynOutputPin = gpio::Pin<gpio::DynPinId, gpio::FunctionSioOutput, gpio::PullDown>;
/// Type alias for the shift registers wired to plain GPIOs.
pub type PicoShiftRegisters = ShiftRegisterPins<DynOutputPin, DynOutputPin, DynInputPin, DynInputPin>;
