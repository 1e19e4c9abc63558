//! Dice retention heuristics.
//!
//! A [`Strategy`] is a pure decision function: given the round, the dice kept
//! going into the round, and the dice just rolled, it returns the dice to keep
//! for the next round. The [`engine`](crate::engine) does all of the rolling
//! and outcome testing.

use crate::{
    dice::{DiceVec, ValueCounts},
    engine::Round,
    outcome::Outcome,
    MINI_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The largest running sum the mini strategies will keep.
const MAX_KEPT_SUM: u16 = MINI_THRESHOLD - 1;

pub trait Strategy {
    /// A short, stable name for this strategy.
    fn name(&self) -> &'static str;

    /// The outcome this strategy plays for.
    fn goal(&self) -> Outcome;

    /// If `true`, the outcome is tested after every roll and the trial ends on
    /// the first success. Otherwise it's only tested after the last roll.
    fn checks_every_round(&self) -> bool;

    /// If `true`, the strategy also picks kept dice after the last roll, and
    /// the updated kept dice plus that last roll are tested once more.
    fn retains_after_last_roll(&self) -> bool {
        false
    }

    /// Choose the dice to keep for the next round. The returned dice must be a
    /// sub-multiset of `kept ++ rolled`.
    fn retain(&self, round: Round, kept: DiceVec, rolled: DiceVec) -> DiceVec;
}

/////////////
// Helpers //
/////////////

/// Keep 2 copies each of the first two faces with a pair, else 2 copies of the
/// only face with a pair, else nothing.
fn keep_pairs(counts: ValueCounts) -> DiceVec {
    let pairs = counts
        .iter()
        .filter(|&(_, count)| count >= 2)
        .map(|(face, _)| face);

    let mut kept = DiceVec::new();
    for face in pairs.take(2) {
        kept.push_n(face, 2);
    }
    kept
}

/// Keep 3 copies of the first face with a triple (if any), plus 2 copies of
/// the first _other_ face with a pair (if any).
fn keep_triple_and_pair(counts: ValueCounts) -> DiceVec {
    let mut kept = DiceVec::new();

    let triple = counts.first_with_count(3, None);
    if let Some(face) = triple {
        kept.push_n(face, 3);
    }
    if let Some(face) = counts.first_with_count(2, triple) {
        kept.push_n(face, 2);
    }

    kept
}

/// Keep up to 3 copies of the most frequent face with at least 2 copies. Ties
/// go to the first face encountered.
fn keep_most_frequent(counts: ValueCounts) -> DiceVec {
    let mut candidate = None;
    let mut freq = 0;
    for (face, count) in counts.iter() {
        if count >= 2 && count > freq {
            candidate = Some(face);
            freq = count;
        }
    }

    match candidate {
        Some(face) => DiceVec::repeated(face, freq.min(3)),
        None => DiceVec::new(),
    }
}

////////////////
// Strategies //
////////////////

/// "Paires multiples": hold two pairs (or one) after the first roll, then
/// chase a triple and a pair after the second.
#[derive(Copy, Clone, Debug, Default)]
pub struct MultiPair;

impl Strategy for MultiPair {
    fn name(&self) -> &'static str {
        "pairs"
    }

    fn goal(&self) -> Outcome {
        Outcome::Full
    }

    fn checks_every_round(&self) -> bool {
        true
    }

    fn retain(&self, round: Round, kept: DiceVec, rolled: DiceVec) -> DiceVec {
        let counts = kept.merge(rolled).value_counts();
        match round {
            Round::First => keep_pairs(counts),
            Round::Second | Round::Third => {
                let new_kept = keep_triple_and_pair(counts);
                if new_kept.is_empty() {
                    keep_pairs(counts)
                } else {
                    new_kept
                }
            }
        }
    }
}

/// "Priorité brelan": always hold up to three copies of the most frequent face.
#[derive(Copy, Clone, Debug, Default)]
pub struct TriplePriority;

impl Strategy for TriplePriority {
    fn name(&self) -> &'static str {
        "triple"
    }

    fn goal(&self) -> Outcome {
        Outcome::Full
    }

    fn checks_every_round(&self) -> bool {
        true
    }

    fn retains_after_last_roll(&self) -> bool {
        true
    }

    fn retain(&self, _round: Round, kept: DiceVec, rolled: DiceVec) -> DiceVec {
        keep_most_frequent(kept.merge(rolled).value_counts())
    }
}

/// "Basse valeur conservée": hold newly rolled 1s and 2s while the kept sum
/// stays at most 7.
#[derive(Copy, Clone, Debug, Default)]
pub struct LowValue;

impl Strategy for LowValue {
    fn name(&self) -> &'static str {
        "low"
    }

    fn goal(&self) -> Outcome {
        Outcome::Mini
    }

    fn checks_every_round(&self) -> bool {
        false
    }

    fn retain(&self, _round: Round, mut kept: DiceVec, rolled: DiceVec) -> DiceVec {
        for face in rolled.iter() {
            if face <= 2 && kept.sum() + face as u16 <= MAX_KEPT_SUM {
                kept.push(face);
            }
        }
        kept
    }
}

/// "Minimisation progressive": hold every newly rolled 1 and 2, and a 3 while
/// the kept sum stays at most 7.
#[derive(Copy, Clone, Debug, Default)]
pub struct ProgressiveMin;

impl Strategy for ProgressiveMin {
    fn name(&self) -> &'static str {
        "minimize"
    }

    fn goal(&self) -> Outcome {
        Outcome::Mini
    }

    fn checks_every_round(&self) -> bool {
        false
    }

    fn retain(&self, _round: Round, mut kept: DiceVec, rolled: DiceVec) -> DiceVec {
        for face in rolled.iter() {
            if face <= 2 || (face == 3 && kept.sum() + 3 <= MAX_KEPT_SUM) {
                kept.push(face);
            }
        }
        kept
    }
}

/// The reference full strategy: hold a triple and a different pair where
/// present, else the first pair.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimpleFull;

impl Strategy for SimpleFull {
    fn name(&self) -> &'static str {
        "simple-full"
    }

    fn goal(&self) -> Outcome {
        Outcome::Full
    }

    fn checks_every_round(&self) -> bool {
        true
    }

    fn retains_after_last_roll(&self) -> bool {
        true
    }

    fn retain(&self, _round: Round, kept: DiceVec, rolled: DiceVec) -> DiceVec {
        let counts = kept.merge(rolled).value_counts();
        let new_kept = keep_triple_and_pair(counts);
        if !new_kept.is_empty() {
            return new_kept;
        }

        match counts.first_with_count(2, None) {
            Some(face) => DiceVec::repeated(face, 2),
            None => DiceVec::new(),
        }
    }
}

/// The reference mini strategy: hold every newly rolled 1.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimpleMini;

impl Strategy for SimpleMini {
    fn name(&self) -> &'static str {
        "simple-mini"
    }

    fn goal(&self) -> Outcome {
        Outcome::Mini
    }

    fn checks_every_round(&self) -> bool {
        false
    }

    fn retain(&self, _round: Round, kept: DiceVec, rolled: DiceVec) -> DiceVec {
        kept.merge(rolled.iter().filter(|&face| face == 1).collect())
    }
}

//////////////////
// StrategyKind //
//////////////////

/// Every available strategy, for picking one by name at runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    MultiPair,
    TriplePriority,
    LowValue,
    ProgressiveMin,
    SimpleFull,
    SimpleMini,
}

impl StrategyKind {
    pub const fn all() -> &'static [StrategyKind; 6] {
        &[
            Self::MultiPair,
            Self::TriplePriority,
            Self::LowValue,
            Self::ProgressiveMin,
            Self::SimpleFull,
            Self::SimpleMini,
        ]
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == s)
    }

    pub fn as_human_readable(self) -> &'static str {
        match self {
            Self::MultiPair => "Multi-pair retention",
            Self::TriplePriority => "Triple priority",
            Self::LowValue => "Low-value retention",
            Self::ProgressiveMin => "Progressive minimization",
            Self::SimpleFull => "Simple full",
            Self::SimpleMini => "Simple mini",
        }
    }

    fn as_strategy(self) -> &'static dyn Strategy {
        match self {
            Self::MultiPair => &MultiPair,
            Self::TriplePriority => &TriplePriority,
            Self::LowValue => &LowValue,
            Self::ProgressiveMin => &ProgressiveMin,
            Self::SimpleFull => &SimpleFull,
            Self::SimpleMini => &SimpleMini,
        }
    }
}

impl Strategy for StrategyKind {
    fn name(&self) -> &'static str {
        self.as_strategy().name()
    }

    fn goal(&self) -> Outcome {
        self.as_strategy().goal()
    }

    fn checks_every_round(&self) -> bool {
        self.as_strategy().checks_every_round()
    }

    fn retains_after_last_roll(&self) -> bool {
        self.as_strategy().retains_after_last_roll()
    }

    #[inline]
    fn retain(&self, round: Round, kept: DiceVec, rolled: DiceVec) -> DiceVec {
        self.as_strategy().retain(round, kept, rolled)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///////////
// Tests //
///////////
