//! Sources of die rolls. Evaluation never touches randomness directly; it always goes through a [`Roller`], so any
//! source can be swapped in (e.g. a fixed one for tests).

use core::iter::Peekable;

#[cfg(feature = "fastrand")]
use fastrand::Rng;

/// Source of die rolls for formula evaluation and skill checks
pub trait Roller {
	/// Rolls a single die, producing a value in `1..=sides`.
	#[must_use]
	fn roll_die(&mut self, sides: u32) -> u32;

	/// Rolls `count` independent dice with the same number of sides, in roll order.
	#[must_use]
	fn roll_dice(&mut self, count: u32, sides: u32) -> Vec<u32> {
		(0..count).map(|_| self.roll_die(sides)).collect()
	}
}

impl<R: Roller + ?Sized> Roller for &mut R {
	#[inline]
	fn roll_die(&mut self, sides: u32) -> u32 {
		(**self).roll_die(sides)
	}
}

/// Generates uniformly random rolls using [fastrand]. Requires the `fastrand` feature (enabled by default).
///
/// # Examples
///
/// ## Default fastrand roller
/// ```
/// use charsheet::roller::{FastRand as FastRandRoller, Roller};
///
/// let mut roller = FastRandRoller::default();
/// let roll = roller.roll_die(20);
/// assert!((1..=20).contains(&roll));
/// ```
///
/// ## Manually seeded fastrand roller
/// ```
/// use charsheet::roller::{FastRand as FastRandRoller, Roller};
///
/// let mut first = FastRandRoller::with_seed(0x750c38d574400);
/// let mut second = FastRandRoller::with_seed(0x750c38d574400);
/// assert_eq!(first.roll_dice(4, 6), second.roll_dice(4, 6));
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone, Default)]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	/// Rolls a single die using the [`fastrand::Rng`] the roller was created with.
	/// Dice with zero sides always roll 0.
	#[inline]
	fn roll_die(&mut self, sides: u32) -> u32 {
		if sides > 0 {
			self.0.u32(1..=sides)
		} else {
			0
		}
	}
}

/// Generates rolls that always have a specific value, regardless of the number of sides.
///
/// # Examples
/// ```
/// use charsheet::roller::{Fixed as FixedRoller, Roller};
///
/// let mut roller = FixedRoller(3);
/// assert_eq!(roller.roll_dice(4, 6), vec![3, 3, 3, 3]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
#[allow(clippy::exhaustive_structs)]
pub struct Fixed(pub u32);

impl Roller for Fixed {
	#[inline]
	fn roll_die(&mut self, _sides: u32) -> u32 {
		self.0
	}
}

/// Generates rolls that always have their max value.
///
/// # Examples
/// ```
/// use charsheet::roller::{Max as MaxRoller, Roller};
///
/// let mut roller = MaxRoller;
/// assert_eq!(roller.roll_dice(2, 20), vec![20, 20]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
#[allow(clippy::exhaustive_structs)]
pub struct Max;

impl Roller for Max {
	#[inline]
	fn roll_die(&mut self, sides: u32) -> u32 {
		sides
	}
}

/// Generates rolls from a sequence of values, in order. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use charsheet::roller::{Roller, Sequence as SequenceRoller};
///
/// let mut roller = SequenceRoller::new([1, 2, 6]);
/// assert_eq!(roller.roll_dice(3, 6), vec![1, 2, 6]);
/// assert!(!roller.can_roll());
/// ```
#[derive(Debug, Clone)]
pub struct Sequence<I: Iterator<Item = u32>>(Peekable<I>);

impl<I: Iterator<Item = u32>> Sequence<I> {
	/// Creates a new roller that uses the given values as rolls.
	#[must_use]
	#[inline]
	pub fn new(values: impl IntoIterator<IntoIter = I>) -> Self {
		Self(values.into_iter().peekable())
	}

	/// Checks whether the sequence still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}
}

impl<I: Iterator<Item = u32>> Roller for Sequence<I> {
	/// Rolls a die with the next value from the sequence.
	///
	/// # Panics
	/// If the sequence has run out of values, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn roll_die(&mut self, _sides: u32) -> u32 {
		self.0.next().expect("roll sequence is exhausted")
	}
}
