//! The engine tying the components together.
//!
//! ```text
//! shift registers -> QuadratureSampler -> DeltaAccumulator -(timer)-> CcEmitter -> MidiTransport
//! serial line     -> FrameParser       -> DeltaAccumulator -(frame)-> CcEmitter -> MidiTransport
//! ```
//!
//! Every call is synchronous and bounded. The main loop owns the [`Dialbox`] and calls into it once
//! per iteration, so motion recorded by a scan is always visible to a flush later in that iteration.

use crate::*;


/// Everything the engine knows about the dials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialState {
	accumulator: DeltaAccumulator,
	positions: DialPositions,
	dial_model: DialModel,
	/// The last scan, or `None` before the first one.
	snapshot: Option<QuadratureSnapshot>,
}

impl DialState {
	pub fn new(edge_mode: EdgeMode, reverse_mask: u8, dial_model: DialModel) -> Self {
		Self {
			accumulator: DeltaAccumulator::new(edge_mode, reverse_mask),
			positions: DialPositions::new(),
			dial_model,
			snapshot: None,
		}
	}

	/// Records a scan, accumulating the motion of every channel whose phase changed since the
	/// previous one. The first scan only sets the reference.
	pub fn record_snapshot(&mut self, snapshot: QuadratureSnapshot) {
		if let Some(previous) = self.snapshot {
			for (channel, before, after) in snapshot.changes_since(previous) {
				self.accumulator.on_edge(channel, before, after);
			}
		}

		self.snapshot = Some(snapshot);
	}

	/// Records a serial report. Absolute positions are measured against the previous report of
	/// the same dial.
	pub fn record_frame(&mut self, frame: Frame) {
		let delta = match self.dial_model {
			DialModel::Sgi => self.positions.update(frame),
			DialModel::Spectragraphics => frame.relative_delta(),
		};

		self.accumulator.apply_delta(frame.channel, delta);
	}

	pub fn accumulator(&self) -> &DeltaAccumulator {
		&self.accumulator
	}

	pub fn accumulator_mut(&mut self) -> &mut DeltaAccumulator {
		&mut self.accumulator
	}

	pub fn positions(&self) -> &DialPositions {
		&self.positions
	}

	pub fn snapshot(&self) -> Option<QuadratureSnapshot> {
		self.snapshot
	}
}


/// A dial box: accumulates dial motion and turns it into Control Change messages.
pub struct Dialbox<R = ChordDetector> {
	state: DialState,
	parser: FrameParser,
	emitter: CcEmitter,
	timer: Option<PeriodicTimer>,
	reload: R,
}

impl Dialbox<ChordDetector> {
	/// Builds a dial box that requests a reload on the configured chord.
	pub fn new(options: &DialboxOptions) -> Result<Self, Error> {
		let reload = ChordDetector::new(options.reload_chord())?;
		Self::with_reload_policy(options, reload)
	}
}

impl<R: ReloadPolicy> Dialbox<R> {
	/// Builds a dial box with a custom reload policy.
	pub fn with_reload_policy(options: &DialboxOptions, reload: R) -> Result<Self, Error> {
		let emitter = CcEmitter::new(options).inspect_err(|err| {
			warn!("rejecting dial box options: {}", err);
		})?;

		let timer = match options.trigger() {
			FlushTrigger::Timer { period } => Some(PeriodicTimer::new(period)),
			FlushTrigger::PerFrame => None,
		};

		Ok(Self {
			state: DialState::new(options.edge_mode(), options.reverse_mask(), options.dial_model()),
			parser: FrameParser::new(),
			emitter,
			timer,
			reload,
		})
	}

	/// Samples the shift registers and accumulates the motion since the previous scan.
	pub fn scan<P: ShiftRegisterPort>(&mut self, sampler: &mut QuadratureSampler<P>) -> Result<(), P::Error> {
		let snapshot = sampler.sample()?;
		self.state.record_snapshot(snapshot);

		Ok(())
	}

	/// Drains every channel if the flush period has elapsed. Does nothing with a per-frame trigger.
	///
	/// Returns the amount of messages sent.
	pub fn poll_timer<T: MidiTransport>(&mut self, now: Instant, transport: &mut T) -> Result<usize, T::Error> {
		let fired = self.timer.as_mut().is_some_and(|timer| timer.poll(now));

		if fired {
			self.flush_all(transport)
		}
		else {
			Ok(0)
		}
	}

	/// Drains every channel with motion, in ascending order, then flushes the transport once if
	/// anything was sent.
	///
	/// On a transport failure, whatever was not sent goes back into the accumulators.
	pub fn flush_all<T: MidiTransport>(&mut self, transport: &mut T) -> Result<usize, T::Error> {
		let drained = self.state.accumulator.drain_all();
		let mut sent = 0;

		for (i, &(channel, value)) in drained.iter().enumerate() {
			match self.emitter.emit(transport, channel, value) {
				Ok(count) => sent += count,
				Err(EmitError { error, remainder }) => {
					warn!("transport failed, keeping {} on {}", remainder, channel);

					self.state.accumulator.apply_delta(channel, remainder as i32);
					for &(channel, value) in &drained[i + 1..] {
						self.state.accumulator.apply_delta(channel, value as i32);
					}

					return Err(error);
				}
			}
		}

		if sent > 0 {
			transport.flush()?;
		}

		Ok(sent)
	}

	/// Drains one channel, then flushes the transport if anything was sent.
	pub fn flush_channel<T: MidiTransport>(&mut self, transport: &mut T, channel: Channel) -> Result<usize, T::Error> {
		let value = self.state.accumulator.drain(channel);

		let sent = self.emitter.emit(transport, channel, value).map_err(|EmitError { error, remainder }| {
			warn!("transport failed, keeping {} on {}", remainder, channel);
			self.state.accumulator.apply_delta(channel, remainder as i32);
			error
		})?;

		if sent > 0 {
			transport.flush()?;
		}

		Ok(sent)
	}

	/// Feeds one byte from the dial box. When it completes a frame, the motion is accumulated
	/// and, with a per-frame trigger, sent straight away.
	///
	/// Returns the channel of the completed frame.
	pub fn on_serial_byte<T: MidiTransport>(&mut self, byte: u8, transport: &mut T) -> Result<Option<Channel>, T::Error> {
		let Some(frame) = self.parser.push(byte) else {
			return Ok(None);
		};

		trace!("frame {}", frame);
		self.state.record_frame(frame);

		if self.timer.is_none() {
			self.flush_channel(transport, frame.channel)?;
		}

		Ok(Some(frame.channel))
	}

	/// Feeds every byte the serial port has received so far.
	///
	/// With a per-frame trigger, motion left over by an earlier failed send goes out first.
	///
	/// Returns the amount of frames completed.
	pub fn service_serial<S, T>(&mut self, port: &mut S, transport: &mut T) -> Result<usize, IoError<S::Error, T::Error>>
	where
		S: SerialPort,
		T: MidiTransport,
	{
		if self.timer.is_none() && !self.state.accumulator.is_idle() {
			self.flush_all(transport).map_err(IoError::Transport)?;
		}

		let mut frames = 0;

		while port.byte_available() {
			let byte = port.read_byte().map_err(IoError::Port)?;

			if self.on_serial_byte(byte, transport).map_err(IoError::Transport)?.is_some() {
				frames += 1;
			}
		}

		Ok(frames)
	}

	/// Wakes the dial box up so it starts reporting positions.
	pub fn start_serial<S: SerialPort>(&mut self, port: &mut S) -> Result<(), S::Error> {
		self.parser.reset();

		for byte in DIAL_INITIALIZE {
			port.write_byte(byte)?;
		}

		Ok(())
	}

	/// Handles a USB-MIDI packet from the host. Returns `true` if a firmware reload was requested.
	pub fn handle_midi_packet(&mut self, packet: &[u8; USB_MIDI_PACKET_SIZE]) -> bool {
		let Some(note) = MidiEvent::from_usb_packet(packet).struck_note() else {
			return false;
		};

		let reload = self.reload.on_note_on(note);

		if reload {
			debug!("reload chord completed");
		}

		reload
	}

	pub fn state(&self) -> &DialState {
		&self.state
	}

	pub fn state_mut(&mut self) -> &mut DialState {
		&mut self.state
	}

	pub fn emitter(&self) -> &CcEmitter {
		&self.emitter
	}
}
