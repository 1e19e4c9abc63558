use crate::{u64_leading_zero_bytes, u64_sum_all_bytes, NUM_FACES};
use claim::{debug_assert_le, debug_assert_lt};
use rand::{
    distributions::{Distribution, Uniform},
    Rng, SeedableRng,
};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Serialize, Serializer};
use std::{fmt, iter::FusedIterator};

/////////////
// DiceVec //
/////////////

/// A list of up to 8 die faces packed into a `u64`. The layout is
/// `0xd7d6_d5d4_d3d2_d1d0`, where `di` is the i'th face, in the order the dice
/// were rolled or kept.
///
/// The packed `u64` works somewhat like a C-string, with upper bytes in
/// byte-indexes >= `len(dice)` set to `0x00`, which is never a valid face.
///
/// A hand only ever holds 5 dice, but the last-round re-check of some
/// strategies tests the updated kept dice together with the whole last roll,
/// which can be up to 3 + 5 dice.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct DiceVec(u64);

impl DiceVec {
    pub const CAPACITY: u8 = 8;

    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// `count` copies of `face`.
    pub fn repeated(face: u8, count: u8) -> Self {
        let mut dice = Self::new();
        dice.push_n(face, count);
        dice
    }

    pub fn from_faces(faces: &[u8]) -> Self {
        faces.iter().copied().collect()
    }

    fn invariant(&self) -> bool {
        let len = self.len();
        self.0
            .to_le_bytes()
            .into_iter()
            .enumerate()
            .all(|(idx, face)| {
                if (idx as u8) < len {
                    (1..=NUM_FACES).contains(&face)
                } else {
                    face == 0
                }
            })
    }

    #[inline]
    pub fn len(self) -> u8 {
        (8 - u64_leading_zero_bytes(self.0)) as u8
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn get(self, idx: u8) -> Option<u8> {
        if idx < self.len() {
            Some((self.0 >> (8 * idx as u32)) as u8)
        } else {
            None
        }
    }

    #[inline]
    pub fn push(&mut self, face: u8) {
        debug_assert!((1..=NUM_FACES).contains(&face));
        let len = self.len();
        debug_assert_lt!(len, Self::CAPACITY);

        self.0 |= (face as u64) << (8 * len as u32);
    }

    pub fn push_n(&mut self, face: u8, n: u8) {
        for _ in 0..n {
            self.push(face);
        }
    }

    /// Concatenate `other` after `self`.
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        debug_assert_le!(self.len() + other.len(), Self::CAPACITY);

        // shifting by a full 64 bits only happens when `self` is full, in which
        // case `other` must be empty.
        match other.0.checked_shl(8 * self.len() as u32) {
            Some(shifted) => Self(self.0 | shifted),
            None => self,
        }
    }

    /// The sum of all faces.
    #[inline]
    pub fn sum(self) -> u16 {
        // at most 8 * 6 = 48, so the byte sum never carries.
        u64_sum_all_bytes(self.0) as u16
    }

    #[inline]
    pub fn iter(self) -> DiceVecIter {
        DiceVecIter(self.0)
    }

    pub fn value_counts(self) -> ValueCounts {
        self.iter().collect()
    }

    pub fn to_vec(self) -> Vec<u8> {
        self.iter().collect()
    }
}

impl FromIterator<u8> for DiceVec {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = u8>,
    {
        let mut dice = Self::new();
        for face in iter {
            dice.push(face);
        }
        debug_assert!(dice.invariant());
        dice
    }
}

impl fmt::Debug for DiceVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for DiceVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, face) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{face}")?;
        }
        f.write_str("]")
    }
}

impl Serialize for DiceVec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// An `Iterator` over the faces in a `DiceVec`, in order.
pub struct DiceVecIter(u64);

impl Iterator for DiceVecIter {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let face = (self.0 & 0xff) as u8;
            self.0 >>= 8;
            Some(face)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = DiceVec(self.0).len() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for DiceVecIter {}

impl FusedIterator for DiceVecIter {}

cfg_test! {
    /// An `Iterator` over every ordered sequence of `ndice` faces, i.e., all
    /// `6^ndice` possible rolls.
    pub struct AllRollsIter {
        /// the _next_ roll we'll output, as base-6 digits (unless we're done).
        digits: Vec<u8>,
        done: bool,
    }

    impl AllRollsIter {
        pub fn new(ndice: u8) -> Self {
            debug_assert_le!(ndice, DiceVec::CAPACITY);
            Self {
                digits: vec![0; ndice as usize],
                done: false,
            }
        }
    }

    impl Iterator for AllRollsIter {
        type Item = DiceVec;

        fn next(&mut self) -> Option<Self::Item> {
            if self.done {
                return None;
            }

            let roll = self.digits.iter().map(|digit| digit + 1).collect();

            // increment, carrying into the next digit
            self.done = true;
            for digit in self.digits.iter_mut() {
                if *digit + 1 < NUM_FACES {
                    *digit += 1;
                    self.done = false;
                    break;
                }
                *digit = 0;
            }

            Some(roll)
        }
    }
}

/////////////////
// ValueCounts //
/////////////////

/// How many times each face occurs in a set of dice.
///
/// Counts are packed one nibble per face into a `u32`, where nibble `i` holds
/// the count of face `i` (nibbles 0 and 7 are unused). The faces are also
/// remembered in the order they first appeared, so "the first pair" or "the
/// first triple" means the first one encountered while scanning the dice.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct ValueCounts {
    counts: u32,
    order: DiceVec,
}

impl ValueCounts {
    #[inline]
    pub const fn new() -> Self {
        Self {
            counts: 0,
            order: DiceVec::new(),
        }
    }

    #[inline]
    pub fn get(self, face: u8) -> u8 {
        ((self.counts >> (4 * face as u32)) & 0x0f) as u8
    }

    #[inline]
    fn add(&mut self, face: u8) {
        if self.get(face) == 0 {
            self.order.push(face);
        }
        debug_assert_lt!(self.get(face), 15);
        self.counts += 1 << (4 * face as u32);
    }

    /// The number of distinct faces.
    #[inline]
    pub fn num_distinct(self) -> u8 {
        self.order.len()
    }

    /// Returns an `Iterator` of `(face, count)` tuples, in first-encounter
    /// order. Only faces with a non-zero count are yielded.
    pub fn iter(self) -> impl Iterator<Item = (u8, u8)> {
        self.order.iter().map(move |face| (face, self.get(face)))
    }

    /// The first-encountered face with at least `min_count` copies, skipping
    /// `except` if given.
    pub fn first_with_count(self, min_count: u8, except: Option<u8>) -> Option<u8> {
        self.iter()
            .find(|&(face, count)| count >= min_count && Some(face) != except)
            .map(|(face, _)| face)
    }

    pub fn is_superset_of(self, other: Self) -> bool {
        (1..=NUM_FACES).all(|face| self.get(face) >= other.get(face))
    }
}

impl FromIterator<u8> for ValueCounts {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = u8>,
    {
        let mut counts = Self::new();
        for face in iter {
            counts.add(face);
        }
        counts
    }
}

impl fmt::Debug for ValueCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

///////////////
// DieSource //
///////////////

/// Where die rolls come from. All of the randomness in a trial goes through
/// this trait, so a trial is fully determined by the faces its source yields.
pub trait DieSource {
    /// Roll a single die, returning a face in `1..=6`.
    fn roll_die(&mut self) -> u8;

    /// Roll `ndice` dice, keeping them in roll order.
    fn roll_dice(&mut self, ndice: u8) -> DiceVec {
        debug_assert_le!(ndice, DiceVec::CAPACITY);
        (0..ndice).map(|_| self.roll_die()).collect()
    }
}

impl<D: DieSource + ?Sized> DieSource for &mut D {
    #[inline]
    fn roll_die(&mut self) -> u8 {
        (**self).roll_die()
    }
}

/// Fair dice rolled from a PRNG.
#[derive(Clone, Debug)]
pub struct RandomDice<R> {
    rng: R,
    die: Uniform<u8>,
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            die: Uniform::new_inclusive(1, NUM_FACES),
        }
    }
}

impl RandomDice<Xoshiro256PlusPlus> {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self::new(Xoshiro256PlusPlus::seed_from_u64(seed))
    }
}

impl<R: Rng> DieSource for RandomDice<R> {
    #[inline]
    fn roll_die(&mut self) -> u8 {
        self.die.sample(&mut self.rng)
    }
}

/// Replays a fixed script of faces in order. Once the script runs out, rolls
/// are drawn from `fallback` instead.
#[derive(Clone, Debug)]
pub struct ScriptedDice<S> {
    script: Vec<u8>,
    next: usize,
    fallback: S,
    overdrawn: usize,
}

impl<S: DieSource> ScriptedDice<S> {
    pub fn new(script: Vec<u8>, fallback: S) -> Self {
        debug_assert!(script.iter().all(|face| (1..=NUM_FACES).contains(face)));
        Self {
            script,
            next: 0,
            fallback,
            overdrawn: 0,
        }
    }

    /// The number of scripted faces rolled so far.
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// The number of scripted faces not yet rolled.
    pub fn remaining(&self) -> usize {
        self.script.len() - self.next
    }

    /// The number of faces drawn from the fallback after the script ran out.
    pub fn overdrawn(&self) -> usize {
        self.overdrawn
    }
}

impl<S: DieSource> DieSource for ScriptedDice<S> {
    fn roll_die(&mut self) -> u8 {
        match self.script.get(self.next) {
            Some(&face) => {
                self.next += 1;
                face
            }
            None => {
                self.overdrawn += 1;
                self.fallback.roll_die()
            }
        }
    }
}


///////////
// Tests //
///////////
