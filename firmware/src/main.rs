#![no_std]
#![no_main]

// Ensures that the program is halted on panic.
extern crate panic_halt;

// Routes `defmt` logs over RTT.
use defmt_rtt as _;

use dialbox_midi_pico::*;

// The "rp_pico" crate is a Board Support Package for the RP2040 Hardware Abstraction Layer.
// Whenever the "bsp" alias is used, it is directly referencing the rp_pico crate.
use rp_pico as bsp;

// The macro for the start-up function.
use bsp::entry;

// Shorter alias for the Peripheral Access Crate.
use bsp::hal::pac;

// Shorter alias for the Hardware Abstraction Layer.
use bsp::hal;

// These are traits for handling digital pin states.
use embedded_hal::digital::OutputPin;

// USB Device support.
use usb_device::{class_prelude::*, prelude::*};

// USB MIDI class.
use usbd_midi::UsbMidiClass;


#[entry]
fn main() -> ! {
	// Get access to the RP2040 peripherals.
	let mut pac = pac::Peripherals::take().unwrap();

	// Set up the watchdog driver - needed by the clock setup code.
	let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

	// Configure the clocks.
	let clocks = hal::clocks::init_clocks_and_plls(
		bsp::XOSC_CRYSTAL_FREQ,
		pac.XOSC,
		pac.CLOCKS,
		pac.PLL_SYS,
		pac.PLL_USB,
		&mut pac.RESETS,
		&mut watchdog,
	)
		.ok()
		.unwrap();

	// Set up the pins.
	let sio = hal::Sio::new(pac.SIO);
	let pins = bsp::Pins::new(
		pac.IO_BANK0,
		pac.PADS_BANK0,
		sio.gpio_bank0,
		&mut pac.RESETS,
	);

	let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

	// Set up the USB driver.
	let usb_bus = UsbBusAllocator::new(hal::usb::UsbBus::new(
		pac.USBCTRL_REGS,
		pac.USBCTRL_DPRAM,
		clocks.usb_clock,
		true,
		&mut pac.RESETS,
	));

	// One IN jack for the dials, one OUT jack for the reload chord.
	let mut midi = UsbMidiTransport::new(UsbMidiClass::new(&usb_bus, 1, 1).unwrap());

	let mut usb_dev = UsbDeviceBuilder::new(&usb_bus, UsbVidPid(USB_VID, USB_PID))
		.strings(&[StringDescriptors::default()
			.manufacturer("dialbox-midi")
			.product(USB_PRODUCT)
			.serial_number("0000")
		])
		.unwrap()
		.device_class(0x00)
		.build();

	/* ~~ GPIO/PINOUT CONFIGURATION START ~~ */

	#[cfg(not(feature = "serial-dialbox"))]
	let mut controller = {
		let load = pins.gpio2.into_push_pull_output().into_dyn_pin();
		let clock = pins.gpio3.into_push_pull_output().into_dyn_pin();
		let data_first = pins.gpio4.into_pull_up_input().into_dyn_pin();
		let data_second = pins.gpio5.into_pull_up_input().into_dyn_pin();

		let registers = match dialbox_midi::ShiftRegisterPins::new(load, clock, data_first, data_second) {
			Ok(registers) => registers,
			Err(never) => match never {},
		};

		DialboxController::with_shift_registers(registers, timer).unwrap()
	};

	#[cfg(feature = "serial-dialbox")]
	let mut controller = {
		let uart_pins = (
			pins.gpio0.into_function::<hal::gpio::FunctionUart>(),
			pins.gpio1.into_function::<hal::gpio::FunctionUart>(),
		);

		let port = UartPort::init(
			pac.UART0,
			uart_pins,
			&mut pac.RESETS,
			hal::Clock::freq(&clocks.peripheral_clock),
		)
			.unwrap();

		DialboxController::with_serial(port, timer).unwrap()
	};

	/* ~~ GPIO/PINOUT CONFIGURATION END ~~ */

	let mut pico_led_pin = pins.led.into_push_pull_output();
	pico_led_pin.set_high().unwrap();

	controller.start();
	defmt::info!("dialbox: running");

	loop {
		usb_dev.poll(&mut [midi.class()]);

		if let Err(err) = midi.service() {
			defmt::warn!("usb: {}", err);
		}

		controller.update(&mut midi);

		let mut reload = false;
		midi.read_packets(|packet| reload |= controller.handle_midi_packet(packet));

		if reload {
			reset_to_bootloader();
		}
	}
}
