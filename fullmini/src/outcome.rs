use crate::{dice::DiceVec, MINI_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome a strategy is trying to reach.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Three of a kind plus a pair of a different value.
    Full,
    /// The dice sum to less than [`MINI_THRESHOLD`].
    Mini,
}

impl Outcome {
    #[inline]
    pub fn is_satisfied(self, hand: DiceVec) -> bool {
        match self {
            Self::Full => is_full(hand),
            Self::Mini => is_mini(hand),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Mini => "mini",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` iff some face occurs at least 3 times and a _different_ face
/// occurs at least twice. Four of a kind plus a pair qualifies.
pub fn is_full(hand: DiceVec) -> bool {
    let counts = hand.value_counts();
    counts.iter().any(|(face, count)| {
        count >= 3 && counts.first_with_count(2, Some(face)).is_some()
    })
}

/// Returns `true` iff the faces sum to strictly less than [`MINI_THRESHOLD`].
#[inline]
pub fn is_mini(hand: DiceVec) -> bool {
    hand.sum() < MINI_THRESHOLD
}
