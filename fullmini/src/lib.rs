//! # fullmini
//!
//! Monte Carlo estimates for two five-dice outcomes reachable within three
//! roll-and-keep rounds:
//!
//! * a **full**: three of a kind plus a pair of a different value.
//! * a **mini**: the five dice sum to less than [`MINI_THRESHOLD`].
//!
//! ## Explanation
//!
//! Each trial starts with no dice kept. Every round rolls the dice that aren't
//! kept, optionally tests the target outcome, then asks a retention
//! [`strategy::Strategy`] which dice to carry into the next round. After the
//! third round the outcome is tested one last time. The estimate is simply the
//! number of successful trials divided by the number of trials.
//!
//! Every die roll goes through an injected [`dice::DieSource`], so a trial can
//! be replayed bit-for-bit from a fixed sequence of faces.

#[macro_use]
mod macros;

pub mod cli;
pub mod dice;
pub mod engine;
pub mod outcome;
pub mod parse;
pub mod stats;
pub mod strategy;

/// The number of dice in a hand.
pub const NUM_DICE: u8 = 5;

/// The number of roll-and-keep rounds in a trial.
pub const NUM_ROUNDS: u8 = 3;

/// A hand is a "mini" iff its sum is strictly below this.
pub const MINI_THRESHOLD: u16 = 8;

/// The number of faces on each (fair) die. Faces are numbered `1..=NUM_FACES`.
pub const NUM_FACES: u8 = 6;

pub(crate) const DEFAULT_TRIALS: u64 = 1_000_000;

///////////////
// Bit Hacks //
///////////////

/// Return the number of leading bytes == 0x00
#[inline]
pub(crate) fn u64_leading_zero_bytes(x: u64) -> u32 {
    x.leading_zeros() >> 3
}

/// Sum all bytes in `x`. Only correct when the total fits in a byte, i.e.,
/// the sum of all bytes is `< 256`.
#[inline]
pub(crate) fn u64_sum_all_bytes(x: u64) -> u32 {
    // multiplying by 0x0101_0101_0101_0101 accumulates every byte into the
    // most-significant byte, so long as no partial sum carries.
    (x.wrapping_mul(0x0101_0101_0101_0101) >> 56) as u32
}

// `x / y`, rounded up
pub(crate) const fn u64_div_ceil(x: u64, y: u64) -> u64 {
    let d = x / y;
    let r = x % y;
    if r > 0 && y > 0 {
        d + 1
    } else {
        d
    }
}

///////////
// Tests //
///////////
