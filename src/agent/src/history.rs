use common::model::game::{Move, Outcome, RoundOutcome};
use serde::Serialize;

/// Append-only log of completed rounds for one session.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    rounds: Vec<RoundOutcome>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl HistoryLog {
    pub fn new() -> Self {
        HistoryLog { rounds: Vec::new() }
    }

    pub fn append(&mut self, outcome: RoundOutcome) {
        self.rounds.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&RoundOutcome> {
        self.rounds.get(index)
    }

    /// The most recent `n` rounds, oldest first. Shorter when the log is.
    pub fn last_n(&self, n: usize) -> &[RoundOutcome] {
        &self.rounds[self.rounds.len().saturating_sub(n)..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundOutcome> {
        self.rounds.iter()
    }

    pub fn last_opponent_move(&self) -> Option<Move> {
        self.rounds.last().and_then(|round| round.opponent_move)
    }

    /// Opponent moves of exactly the last `n` rounds, oldest first.
    /// None if fewer than `n` rounds exist or any of them lacks a move.
    pub fn opponent_context(&self, n: usize) -> Option<Vec<Move>> {
        if n > self.rounds.len() {
            return None;
        }
        self.last_n(n)
            .iter()
            .map(|round| round.opponent_move)
            .collect()
    }

    pub fn tally(&self) -> Tally {
        self.rounds
            .iter()
            .fold(Tally::default(), |mut tally, round| {
                match round.result {
                    Outcome::Win => tally.wins += 1,
                    Outcome::Loss => tally.losses += 1,
                    Outcome::Draw => tally.draws += 1,
                }
                tally
            })
    }
}
