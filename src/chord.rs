use heapless::Vec;

use crate::*;


/// Decides from the notes struck by the host whether the firmware should be reloaded.
pub trait ReloadPolicy {
	/// Called for every Note-On with a non-zero velocity. Returns `true` to request a reload.
	fn on_note_on(&mut self, note: u8) -> bool;
}

/// Never requests a reload.
impl ReloadPolicy for () {
	fn on_note_on(&mut self, _note: u8) -> bool {
		false
	}
}


/// Requests a reload once a fixed sequence of notes is struck in order. Any other note starts the
/// sequence over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordDetector {
	chord: Vec<u8, MAX_CHORD_LENGTH>,
	matched: usize,
}

impl ChordDetector {
	/// Notes past [`MAX_CHORD_LENGTH`] are dropped.
	pub fn new(notes: &[u8]) -> Result<Self, Error> {
		if notes.is_empty() {
			return Err(Error::EmptyChord);
		}

		let chord = notes.iter().copied().take(MAX_CHORD_LENGTH).collect();

		Ok(Self { chord, matched: 0 })
	}

	/// The amount of notes matched so far.
	pub fn progress(&self) -> usize {
		self.matched
	}

	pub fn reset(&mut self) {
		self.matched = 0;
	}
}

impl ReloadPolicy for ChordDetector {
	fn on_note_on(&mut self, note: u8) -> bool {
		if note == self.chord[self.matched] {
			self.matched += 1;
		}
		else {
			self.matched = 0;
		}

		if self.matched == self.chord.len() {
			self.matched = 0;
			return true;
		}

		false
	}
}

impl Default for ChordDetector {
	fn default() -> Self {
		Self {
			chord: Vec::from_slice(&DEFAULT_RELOAD_CHORD).unwrap_or_default(),
			matched: 0,
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn strike(policy: &mut impl ReloadPolicy, notes: &[u8]) -> Vec<bool, 16> {
		notes.iter().map(|&note| policy.on_note_on(note)).collect()
	}

	#[test]
	fn fires_on_the_complete_chord() {
		let mut detector = ChordDetector::default();

		assert_eq!(strike(&mut detector, &[0, 3, 5]).as_slice(), &[false, false, true]);
		assert_eq!(detector.progress(), 0);
	}

	#[test]
	fn wrong_note_restarts() {
		let mut detector = ChordDetector::default();

		assert_eq!(strike(&mut detector, &[0, 3, 4, 5]).as_slice(), &[false; 4]);
		assert_eq!(detector.progress(), 0);
	}

	#[test]
	fn repeated_first_note_counts_as_a_wrong_note() {
		let mut detector = ChordDetector::default();

		assert_eq!(strike(&mut detector, &[0, 0, 3, 5]).as_slice(), &[false; 4]);
		assert_eq!(detector.progress(), 0);

		assert_eq!(strike(&mut detector, &[0, 3, 5]).as_slice(), &[false, false, true]);
	}

	#[test]
	fn single_note_chord() {
		let mut detector = ChordDetector::new(&[127]).unwrap();

		assert_eq!(strike(&mut detector, &[1, 127, 127]).as_slice(), &[false, true, true]);
	}

	#[test]
	fn rejects_empty_chords() {
		assert_eq!(ChordDetector::new(&[]), Err(Error::EmptyChord));
	}

	#[test]
	fn unit_policy_never_reloads() {
		assert_eq!(strike(&mut (), &[0, 3, 5]).as_slice(), &[false; 3]);
	}
}
