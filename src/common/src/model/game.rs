use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Result of a round from the point of view of whoever played `own`.
    pub fn of(own: Move, opponent: Move) -> Self {
        match own.beats(&opponent) {
            Some(true) => Outcome::Win,
            Some(false) => Outcome::Loss,
            None => Outcome::Draw,
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        }
    }
}

/// Declaration order is the canonical enumeration order used by every
/// tie-break on counts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    pub fn beats(&self, other: &Move) -> Option<bool> {
        if self == other {
            None
        } else {
            Some(matches!(
                (self, other),
                (Move::Rock, Move::Scissors)
                    | (Move::Scissors, Move::Paper)
                    | (Move::Paper, Move::Rock)
            ))
        }
    }

    /// The unique move that beats this one.
    pub fn counter(&self) -> Move {
        match self {
            Move::Rock => Move::Paper,
            Move::Paper => Move::Scissors,
            Move::Scissors => Move::Rock,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Move::Rock => 0,
            Move::Paper => 1,
            Move::Scissors => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Move::Rock => "ROCK",
            Move::Paper => "PAPER",
            Move::Scissors => "SCISSORS",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown move '{}'", s))
    }
}

/// One completed round as reported by the game server. Either move is
/// missing when a player timed out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    #[serde(rename = "you", default, skip_serializing_if = "Option::is_none")]
    pub own_move: Option<Move>,
    #[serde(rename = "opponent", default, skip_serializing_if = "Option::is_none")]
    pub opponent_move: Option<Move>,
    pub result: Outcome,
}

impl RoundOutcome {
    pub fn played(own: Move, opponent: Move) -> Self {
        RoundOutcome {
            own_move: Some(own),
            opponent_move: Some(opponent),
            result: Outcome::of(own, opponent),
        }
    }
}
