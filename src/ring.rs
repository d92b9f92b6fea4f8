//! Single-producer/single-consumer byte ring shared between the main loop and an interrupt handler.
//!
//! The ring is a [`heapless::spsc::Queue`] of bytes. Each end's index is written by exactly one side:
//!
//! - The producer writes the free slot, then publishes its index with `Release`.
//! - The consumer loads the producer's index with `Acquire`, reads the slot, then publishes its own
//!   index with `Release`.
//! - The producer loads the consumer's index with `Acquire` before reusing a slot.
//!
//! Only atomic loads and stores are involved, so the ring works on cores without compare-and-swap,
//! such as the Cortex-M0+. A ring of `N` slots holds at most `N - 1` bytes.

use heapless::spsc::{Consumer, Producer, Queue};


/// A ring of `N` byte slots. Split it once with [`Queue::split`] and hand each end to its context.
pub type ByteRing<const N: usize> = Queue<u8, N>;
/// The writing end of a [`ByteRing`].
pub type ByteProducer<'a, const N: usize> = Producer<'a, u8, N>;
/// The reading end of a [`ByteRing`].
pub type ByteConsumer<'a, const N: usize> = Consumer<'a, u8, N>;


/// Enqueueing that waits for room instead of handing the item back.
pub trait EnqueueBlocking<T> {
	/// Appends `item`, spinning until the consumer makes room.
	///
	/// The consumer must run concurrently (e.g. in an interrupt handler), otherwise this never
	/// returns once the ring is full.
	fn enqueue_blocking(&mut self, item: T);
}

impl<T, const N: usize> EnqueueBlocking<T> for Producer<'_, T, N> {
	fn enqueue_blocking(&mut self, mut item: T) {
		loop {
			match self.enqueue(item) {
				Ok(()) => return,
				Err(rejected) => {
					item = rejected;
					core::hint::spin_loop();
				}
			}
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn holds_one_less_than_its_slots() {
		let mut ring = ByteRing::<4>::new();

		{
			let (mut producer, _) = ring.split();

			assert_eq!(producer.enqueue(1), Ok(()));
			assert_eq!(producer.enqueue(2), Ok(()));
			assert_eq!(producer.enqueue(3), Ok(()));
			assert!(!producer.ready());
			assert_eq!(producer.enqueue(4), Err(4));
		}

		assert_eq!(ring.len(), 3);
		assert_eq!(ring.capacity(), 3);
	}

	#[test]
	fn preserves_order_across_the_wrap() {
		let mut ring = ByteRing::<4>::new();
		let (mut producer, mut consumer) = ring.split();
		let mut received = Vec::new();

		for byte in 0..10u8 {
			producer.enqueue(byte).unwrap();
			if byte % 2 == 1 {
				received.extend(core::iter::from_fn(|| consumer.dequeue()));
			}
		}

		assert_eq!(received, (0..10).collect::<Vec<u8>>());
		assert!(!consumer.ready());
		assert_eq!(consumer.dequeue(), None);
	}

	#[test]
	fn blocking_enqueue_waits_for_a_concurrent_consumer() {
		let mut ring = ByteRing::<8>::new();
		let (mut producer, mut consumer) = ring.split();

		std::thread::scope(|scope| {
			scope.spawn(move || {
				for byte in 0..200u8 {
					producer.enqueue_blocking(byte);
				}
			});

			let mut expected = 0u8;
			while expected < 200 {
				if let Some(byte) = consumer.dequeue() {
					assert_eq!(byte, expected);
					expected += 1;
				}
			}
		});
	}
}
