//! Interrupt-driven UART0 link to a serial dial box.
//!
//! The `UART0_IRQ` handler moves received bytes into `RX_RING` and drains `TX_RING` into the
//! hardware FIFO. The main loop holds the opposite ends of both rings through [`UartPort`].

use core::cell::RefCell;

use critical_section::Mutex;

use core::ptr::addr_of_mut;

use dialbox_midi::{ByteConsumer, ByteProducer, ByteRing, EnqueueBlocking, SerialPort, DIAL_BAUD_RATE};

use rp_pico as bsp;

use bsp::hal;
use hal::gpio;
use hal::pac;
use hal::pac::interrupt;
use hal::uart::{DataBits, Enabled, StopBits, UartConfig, UartPeripheral};

/// Provides the `.Hz()` suffix for baud rates.
use hal::fugit::{HertzU32, RateExtU32};


/// The amount of slots in each direction's ring.
pub const UART_RING_SIZE: usize = 64;


static mut RX_RING: ByteRing<UART_RING_SIZE> = ByteRing::<UART_RING_SIZE>::new();
static mut TX_RING: ByteRing<UART_RING_SIZE> = ByteRing::<UART_RING_SIZE>::new();

static IRQ_SIDE: Mutex<RefCell<Option<IrqSide>>> = Mutex::new(RefCell::new(None));


/// Type alias for the UART0 TX (GPIO0) and RX (GPIO1) pins.
pub type DialUartPins = (
	gpio::Pin<gpio::bank0::Gpio0, gpio::FunctionUart, gpio::PullDown>,
	gpio::Pin<gpio::bank0::Gpio1, gpio::FunctionUart, gpio::PullDown>,
);
/// Type alias for the enabled UART0 peripheral.
pub type DialUart = UartPeripheral<Enabled, pac::UART0, DialUartPins>;


#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum UartError {
	/// [`UartPort::init`] was called a second time.
	AlreadyInitialized,
	/// The peripheral rejected the line configuration.
	Config,
	/// A read was attempted with nothing received.
	Empty,
}


/// The interrupt handler's ends of the rings, together with the peripheral.
struct IrqSide {
	uart: DialUart,
	rx: ByteProducer<'static, UART_RING_SIZE>,
	tx: ByteConsumer<'static, UART_RING_SIZE>,
}

impl IrqSide {
	fn pump_rx(&mut self) {
		let mut buffer = [0u8; 32];

		while let Ok(bytes) = self.uart.read_raw(&mut buffer) {
			for &byte in bytes.iter() {
				if self.rx.enqueue(byte).is_err() {
					defmt::warn!("uart: receive ring full, dropping {=u8:#x}", byte);
				}
			}
		}
	}

	fn pump_tx(&mut self) {
		while self.uart.uart_is_writable() {
			match self.tx.dequeue() {
				Some(byte) => {
					let _ = self.uart.write_raw(&[byte]);
				}
				None => {
					self.uart.disable_tx_interrupt();
					return;
				}
			}
		}
	}
}


/// The main loop's side of the dial box link.
pub struct UartPort {
	rx: ByteConsumer<'static, UART_RING_SIZE>,
	tx: ByteProducer<'static, UART_RING_SIZE>,
}

impl UartPort {
	/// Configures UART0 for the dial box (9600 baud, 8N1) and starts servicing it from its
	/// interrupt. Only the first call succeeds.
	pub fn init(
		uart: pac::UART0,
		pins: DialUartPins,
		resets: &mut pac::RESETS,
		peripheral_freq: HertzU32,
	) -> Result<Self, UartError> {
		let config = UartConfig::new(DIAL_BAUD_RATE.Hz(), DataBits::Eight, None, StopBits::One);

		let mut uart = UartPeripheral::new(uart, pins, resets)
			.enable(config, peripheral_freq)
			.map_err(|_| UartError::Config)?;

		uart.enable_rx_interrupt();

		let port = critical_section::with(|cs| {
			let mut irq_side = IRQ_SIDE.borrow_ref_mut(cs);

			if irq_side.is_some() {
				return Err(UartError::AlreadyInitialized);
			}

			// SAFETY: guarded by `IRQ_SIDE` being empty, so the rings are split exactly once.
			let (rx_producer, rx_consumer) = unsafe { (*addr_of_mut!(RX_RING)).split() };
			let (tx_producer, tx_consumer) = unsafe { (*addr_of_mut!(TX_RING)).split() };

			*irq_side = Some(IrqSide {
				uart,
				rx: rx_producer,
				tx: tx_consumer,
			});

			Ok(Self {
				rx: rx_consumer,
				tx: tx_producer,
			})
		})?;

		// SAFETY: the handler only touches state behind `IRQ_SIDE`.
		unsafe { pac::NVIC::unmask(pac::Interrupt::UART0_IRQ) };

		Ok(port)
	}

	/// Moves queued bytes into the FIFO and lets the interrupt handler take over the rest.
	fn kick_tx(&self) {
		critical_section::with(|cs| {
			if let Some(irq_side) = IRQ_SIDE.borrow_ref_mut(cs).as_mut() {
				irq_side.pump_tx();

				if irq_side.tx.ready() {
					irq_side.uart.enable_tx_interrupt();
				}
			}
		});
	}
}

impl SerialPort for UartPort {
	type Error = UartError;

	fn byte_available(&mut self) -> bool {
		self.rx.ready()
	}

	fn read_byte(&mut self) -> Result<u8, UartError> {
		self.rx.dequeue().ok_or(UartError::Empty)
	}

	fn write_byte(&mut self, byte: u8) -> Result<(), UartError> {
		// A full ring means the transmit interrupt is already running and will make room.
		self.tx.enqueue_blocking(byte);
		self.kick_tx();

		Ok(())
	}
}


#[interrupt]
fn UART0_IRQ() {
	critical_section::with(|cs| {
		if let Some(irq_side) = IRQ_SIDE.borrow_ref_mut(cs).as_mut() {
			irq_side.pump_rx();
			irq_side.pump_tx();
		}
	});
}
