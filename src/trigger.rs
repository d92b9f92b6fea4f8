use fugit::{MicrosDurationU64, TimerInstantU64};


/// A timestamp from a free-running 1 MHz counter, as returned by the RP2040 timer.
pub type Instant = TimerInstantU64<1_000_000>;


/// Determines what causes accumulated motion to be sent.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushTrigger {
	/// Every channel is drained whenever the period elapses. Used with the shift registers.
	Timer { period: MicrosDurationU64 },
	/// The channel named by each serial frame is drained as soon as the frame completes.
	PerFrame,
}


/// A periodic deadline polled from the main loop, behaving like a timer overflow flag: it fires
/// at most once per poll, however many periods were missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTimer {
	period: MicrosDurationU64,
	deadline: Option<Instant>,
}

impl PeriodicTimer {
	pub const fn new(period: MicrosDurationU64) -> Self {
		Self { period, deadline: None }
	}

	/// Returns `true` once the period has elapsed since the previous firing. The first poll
	/// starts the timer.
	pub fn poll(&mut self, now: Instant) -> bool {
		let Some(deadline) = self.deadline else {
			self.deadline = Some(now + self.period);
			return false;
		};

		if now < deadline {
			return false;
		}

		let next = deadline + self.period;

		// Missed periods are dropped rather than fired back to back.
		self.deadline = Some(if next <= now { now + self.period } else { next });

		true
	}

	pub fn period(&self) -> MicrosDurationU64 {
		self.period
	}
}
