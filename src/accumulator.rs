use heapless::Vec;

use crate::*;


/// The bound, in either direction, of a channel's unreported motion.
pub const ACCUMULATOR_LIMIT: i16 = 127;


/// Determines which phase edges count as motion.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeMode {
	/// Counts edges on both phase bits (four counts per quadrature cycle).
	#[default] Both,
	/// Counts edges on phase A only (two counts per quadrature cycle).
	PhaseA,
}


/// Per-channel signed motion that has not been reported yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaAccumulator {
	counters: [i16; CHANNEL_COUNT],
	edge_mode: EdgeMode,
	reverse_mask: u8,
}

impl DeltaAccumulator {
	pub const fn new(edge_mode: EdgeMode, reverse_mask: u8) -> Self {
		Self {
			counters: [0; CHANNEL_COUNT],
			edge_mode,
			reverse_mask,
		}
	}

	/// Applies the motion implied by a phase change on one channel.
	///
	/// Returns the step that was applied before saturation (`-1`, `0` or `1`).
	pub fn on_edge(&mut self, channel: Channel, previous: Phase, current: Phase) -> i8 {
		let mut step = edge_step(previous, current, self.edge_mode);

		if self.reverse_mask & (1 << channel.number()) != 0 {
			step = -step;
		}

		if step != 0 {
			self.apply_delta(channel, step as i32);
		}

		step
	}

	/// Adds a signed delta to a channel, saturating at ±[`ACCUMULATOR_LIMIT`].
	pub fn apply_delta(&mut self, channel: Channel, delta: i32) {
		let limit = ACCUMULATOR_LIMIT as i32;
		let counter = &mut self.counters[channel.index()];

		*counter = (*counter as i32).saturating_add(delta).clamp(-limit, limit) as i16;
	}

	/// The unreported motion of a channel.
	pub fn value(&self, channel: Channel) -> i16 {
		self.counters[channel.index()]
	}

	/// Takes a channel's motion, leaving it at zero.
	pub fn drain(&mut self, channel: Channel) -> i16 {
		core::mem::take(&mut self.counters[channel.index()])
	}

	/// Takes the motion of every channel that has any, in ascending channel order.
	pub fn drain_all(&mut self) -> Vec<(Channel, i16), CHANNEL_COUNT> {
		let mut drained = Vec::new();

		for channel in Channel::all() {
			let value = self.drain(channel);

			if value != 0 {
				// Never full: at most one entry per channel.
				let _ = drained.push((channel, value));
			}
		}

		drained
	}

	/// Whether any channel has unreported motion.
	pub fn is_idle(&self) -> bool {
		self.counters.iter().all(|&counter| counter == 0)
	}
}


/// Direction of one phase transition.
///
/// An edge on A counts up when the new A equals B, an edge on B counts up when the new B differs
/// from A. A transition that flips both bits skipped a phase, and the two rules cancel out.
pub fn edge_step(previous: Phase, current: Phase, edge_mode: EdgeMode) -> i8 {
	let mut step = 0;

	if previous.a() != current.a() {
		step += if current.a() == current.b() { 1 } else { -1 };
	}

	if edge_mode == EdgeMode::Both && previous.b() != current.b() {
		step += if current.b() != current.a() { 1 } else { -1 };
	}

	step
}


#[cfg(test)]
mod tests {
	use super::*;

	fn ch(index: u8) -> Channel {
		Channel::new(index).unwrap()
	}

	/// One forward quadrature cycle, A being bit 0: 00 -> 10 -> 11 -> 01 -> 00 in (B, A) order.
	const FORWARD: [u8; 5] = [0b00, 0b10, 0b11, 0b01, 0b00];

	fn turn(acc: &mut DeltaAccumulator, channel: Channel, sequence: &[u8]) {
		for pair in sequence.windows(2) {
			acc.on_edge(channel, Phase::from_bits(pair[0]), Phase::from_bits(pair[1]));
		}
	}

	#[test]
	fn forward_cycle_counts_four_steps() {
		let mut acc = DeltaAccumulator::default();
		turn(&mut acc, ch(0), &FORWARD);
		assert_eq!(acc.value(ch(0)), 4);
	}

	#[test]
	fn backward_cycle_counts_down() {
		let mut acc = DeltaAccumulator::default();
		let mut backward = FORWARD;
		backward.reverse();

		turn(&mut acc, ch(0), &backward);

		assert_eq!(acc.value(ch(0)), -4);
	}

	#[test]
	fn phase_a_mode_ignores_b_edges() {
		let mut acc = DeltaAccumulator::new(EdgeMode::PhaseA, 0);
		turn(&mut acc, ch(2), &FORWARD);
		assert_eq!(acc.value(ch(2)), 2);
	}

	#[test]
	fn each_rule_matches_its_table_entry() {
		let both = EdgeMode::Both;
		// A rising with B high, A falling with B low.
		assert_eq!(edge_step(Phase::new(false, true), Phase::new(true, true), both), 1);
		assert_eq!(edge_step(Phase::new(true, false), Phase::new(false, false), both), 1);
		// A rising with B low, A falling with B high.
		assert_eq!(edge_step(Phase::new(false, false), Phase::new(true, false), both), -1);
		assert_eq!(edge_step(Phase::new(true, true), Phase::new(false, true), both), -1);
		// B rising with A low, B falling with A high.
		assert_eq!(edge_step(Phase::new(false, false), Phase::new(false, true), both), 1);
		assert_eq!(edge_step(Phase::new(true, true), Phase::new(true, false), both), 1);
	}

	#[test]
	fn skipped_phase_cancels_out() {
		assert_eq!(edge_step(Phase::new(false, false), Phase::new(true, true), EdgeMode::Both), 0);
		assert_eq!(edge_step(Phase::new(true, false), Phase::new(false, true), EdgeMode::Both), 0);
	}

	#[test]
	fn reverse_mask_flips_only_selected_channels() {
		let mut acc = DeltaAccumulator::new(EdgeMode::Both, 0b0000_0010);
		turn(&mut acc, ch(0), &FORWARD);
		turn(&mut acc, ch(1), &FORWARD);

		assert_eq!(acc.value(ch(0)), 4);
		assert_eq!(acc.value(ch(1)), -4);
	}

	#[test]
	fn saturates_instead_of_wrapping() {
		let mut acc = DeltaAccumulator::default();

		for _ in 0..200 {
			acc.apply_delta(ch(4), 1);
		}
		assert_eq!(acc.value(ch(4)), ACCUMULATOR_LIMIT);

		acc.apply_delta(ch(4), -1000);
		assert_eq!(acc.value(ch(4)), -ACCUMULATOR_LIMIT);

		acc.apply_delta(ch(4), i32::MIN);
		assert_eq!(acc.value(ch(4)), -ACCUMULATOR_LIMIT);
	}

	#[test]
	fn drain_all_is_ordered_and_idempotent() {
		let mut acc = DeltaAccumulator::default();
		acc.apply_delta(ch(6), -3);
		acc.apply_delta(ch(1), 5);

		assert_eq!(acc.drain_all().as_slice(), &[(ch(1), 5), (ch(6), -3)]);
		assert!(acc.is_idle());
		assert!(acc.drain_all().is_empty());
	}
}
