#![no_std]

pub mod controller;
pub mod uart;
pub mod usb;

pub use crate::controller::*;
pub use crate::uart::*;
pub use crate::usb::*;

use rp_pico as bsp;

use bsp::hal;


/// Leaves the firmware and re-enters the RP2040 USB boot loader, so a new image can be copied
/// onto the mass storage drive it presents.
pub fn reset_to_bootloader() -> ! {
	defmt::info!("entering the USB boot loader");

	// No activity LED, both the mass storage and the PICOBOOT interfaces enabled.
	#[allow(unused_unsafe)]
	unsafe {
		hal::rom_data::reset_to_usb_boot(0, 0);
	}

	loop {
		cortex_m::asm::wfi();
	}
}
