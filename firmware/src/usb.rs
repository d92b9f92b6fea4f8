use dialbox_midi::{CcMessage, MidiTransport, USB_MIDI_PACKET_SIZE};

use heapless::Deque;

use usb_device::bus::UsbBus;
use usb_device::UsbError;

use usbd_midi::{CableNumber, UsbMidiClass, UsbMidiEventPacket};


/// The amount of messages that can wait for the IN endpoint.
/// Eight saturated channels need 24 messages.
pub const MIDI_QUEUE_SIZE: usize = 32;
/// The size (in bytes) of the buffer used to read packets from the host.
pub const MIDI_READ_BUFFER_SIZE: usize = 64;


#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum TransportError {
	/// The outgoing queue is full. Nothing was queued.
	QueueFull,
	/// The USB stack reported an error other than a busy endpoint.
	Usb,
}


/// Sends Control Change messages to the host through a USB-MIDI class.
///
/// Messages are queued by [`MidiTransport::send_event`] and written by [`MidiTransport::flush`].
/// Whatever the endpoint does not accept stays queued for the next flush.
pub struct UsbMidiTransport<'a, B: UsbBus> {
	class: UsbMidiClass<'a, B>,
	queue: Deque<CcMessage, MIDI_QUEUE_SIZE>,
}

impl<'a, B: UsbBus> UsbMidiTransport<'a, B> {
	pub fn new(class: UsbMidiClass<'a, B>) -> Self {
		Self {
			class,
			queue: Deque::new(),
		}
	}

	/// The class, to be handed to `UsbDevice::poll`.
	pub fn class(&mut self) -> &mut UsbMidiClass<'a, B> {
		&mut self.class
	}

	/// Retries whatever an earlier flush left behind. Call after each `UsbDevice::poll`.
	pub fn service(&mut self) -> Result<(), TransportError> {
		if self.queue.is_empty() {
			return Ok(());
		}

		self.flush()
	}

	/// Reads the packets the host sent, passing each to `handler`.
	pub fn read_packets(&mut self, mut handler: impl FnMut(&[u8; USB_MIDI_PACKET_SIZE])) {
		let mut buffer = [0u8; MIDI_READ_BUFFER_SIZE];

		while let Ok(size) = self.class.read(&mut buffer) {
			if size == 0 {
				break;
			}

			for chunk in buffer[..size].chunks_exact(USB_MIDI_PACKET_SIZE) {
				if let Ok(packet) = <&[u8; USB_MIDI_PACKET_SIZE]>::try_from(chunk) {
					handler(packet);
				}
			}
		}
	}

	pub fn pending(&self) -> usize {
		self.queue.len()
	}
}

impl<B: UsbBus> MidiTransport for UsbMidiTransport<'_, B> {
	type Error = TransportError;

	fn send_event(&mut self, message: CcMessage) -> Result<(), TransportError> {
		self.queue.push_back(message).map_err(|_| TransportError::QueueFull)
	}

	fn flush(&mut self) -> Result<(), TransportError> {
		while let Some(message) = self.queue.front() {
			let packet = UsbMidiEventPacket::try_from_payload_bytes(CableNumber::Cable0, &message.to_bytes())
				.map_err(|_| TransportError::Usb)?;

			match self.class.send_packet(packet) {
				Ok(_) => {
					self.queue.pop_front();
				}
				// The endpoint is busy; the rest goes out on a later flush.
				Err(UsbError::WouldBlock) => break,
				Err(err) => {
					defmt::warn!("usb: dropping CC after {}", defmt::Debug2Format(&err));
					self.queue.pop_front();
					return Err(TransportError::Usb);
				}
			}
		}

		Ok(())
	}
}
