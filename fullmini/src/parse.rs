use crate::{strategy::StrategyKind, NUM_FACES};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

//////////////////
// parse::Rolls //
//////////////////

/// A scripted sequence of die faces, in the order they're rolled. Unlike a
/// hand, a script can be any length.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rolls(Vec<u8>);

impl Rolls {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_faces(self) -> Vec<u8> {
        self.0
    }
}

fn parse_face(s: &str) -> Result<u8, String> {
    let face = s
        .parse::<u8>()
        .map_err(|err| format!("failed to parse die face: '{}', error: {}", s, err))?;

    if !(1..=NUM_FACES).contains(&face) {
        return Err(format!(
            "die face needs to be in the range [1,{}]: '{}'",
            NUM_FACES, face
        ));
    }

    Ok(face)
}

impl FromStr for Rolls {
    type Err = String;

    // [1, 1, 2, 5, 6, 3]

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.trim_start_matches('[');
        let s = s.trim_end_matches(']');

        let splitters = &[',', ' ', '\n', '\t'];

        s.split(splitters)
            .filter(|s| !s.is_empty())
            .map(parse_face)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl FromIterator<u8> for Rolls {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = u8>,
    {
        Self(Vec::from_iter(iter))
    }
}

impl fmt::Display for Rolls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, face) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", face)?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for Rolls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/////////////////////////
// parse::StrategyKind //
/////////////////////////

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| {
            let names = Self::all()
                .iter()
                .map(|kind| kind.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("didn't recognize strategy: '{}', expected one of: {}", s, names)
        })
    }
}
